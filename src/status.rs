pub use os_specific::exit_code;

// `wait` does not report stopped children, so this is not expected to be used.
const FALLBACK_CODE: i32 = 1;

#[cfg(unix)]
mod os_specific {
    use std::{os::unix::process::ExitStatusExt, process::ExitStatus};

    /// Exit code a shell would report for a child that finished with `status`
    ///
    /// A child killed by signal `n` is reported as `128 + n`.
    #[must_use]
    pub fn exit_code(status: ExitStatus) -> i32 {
        match (status.code(), status.signal()) {
            (Some(code), _) => code,
            (None, Some(signal)) => 128 + signal,
            (None, None) => super::FALLBACK_CODE,
        }
    }
}

#[cfg(not(unix))]
mod os_specific {
    use std::process::ExitStatus;

    #[must_use]
    pub fn exit_code(status: ExitStatus) -> i32 {
        status.code().unwrap_or(super::FALLBACK_CODE)
    }
}
