use anyhow::{Result, ensure};
use std::env::var;

const DEFAULT_TARGET: &str = "verdi";

fn main() -> Result<()> {
    println!("cargo::rerun-if-env-changed=VERDI_SHIM_TARGET");
    let target = var("VERDI_SHIM_TARGET").unwrap_or_else(|_| DEFAULT_TARGET.to_owned());
    ensure!(
        !target.is_empty() && !target.contains('\n'),
        "`VERDI_SHIM_TARGET` must be a non-empty, single-line program name: {target:?}"
    );
    println!("cargo::rustc-env=VERDI_SHIM_TARGET={target}");
    Ok(())
}
