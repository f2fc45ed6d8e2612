//! Stand-in target used by the `verdi-shim` tests.
//!
//! Prints what it received as one line of JSON on stdout, then exits with `RUNNER_EXIT_CODE`
//! (default 0). If `RUNNER_READ_STDIN` is set, standard input is read to the end and reported too.

use anyhow::{Context, Result};
use serde::Serialize;
use std::{
    collections::BTreeMap,
    env::{args_os, var, vars_os},
    io::{Read, Write, stdin, stdout},
    process::exit,
};

#[derive(Serialize)]
struct Report {
    argv0: String,
    args: Vec<Vec<u8>>,
    env: BTreeMap<String, String>,
    stdin: Option<String>,
}

fn main() -> Result<()> {
    let mut args = args_os();
    let argv0 = args
        .next()
        .map(|arg| arg.to_string_lossy().into_owned())
        .unwrap_or_default();
    let args = args.map(|arg| arg.into_encoded_bytes()).collect();
    let env = vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect();
    let stdin = if var("RUNNER_READ_STDIN").is_ok() {
        let mut buf = String::new();
        stdin().read_to_string(&mut buf)?;
        Some(buf)
    } else {
        None
    };

    let report = Report {
        argv0,
        args,
        env,
        stdin,
    };
    let mut stdout = stdout().lock();
    serde_json::to_writer(&mut stdout, &report)?;
    writeln!(stdout)?;
    stdout.flush()?;

    let code = match var("RUNNER_EXIT_CODE") {
        Ok(code) => code
            .parse::<i32>()
            .with_context(|| format!("invalid `RUNNER_EXIT_CODE`: {code:?}"))?,
        Err(_) => 0,
    };
    exit(code);
}
