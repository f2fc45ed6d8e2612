use std::{env::args_os, process::exit};
use verdi_shim::{TARGET, forward, report};

fn main() {
    env_logger::try_init().unwrap_or_default();

    // Every argument after our own name belongs to the target, `--help` and `--` included.
    let code = match forward(TARGET).args(args_os().skip(1)).hand_off() {
        Ok(code) => code,
        Err(error) => {
            report(&error);
            error.exit_code()
        }
    };
    exit(code);
}
