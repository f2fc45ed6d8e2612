use std::{
    ffi::{OsStr, OsString},
    io,
    path::{Path, PathBuf},
};

/// Exit code when the target cannot be found, as reported by POSIX shells
pub const EXIT_NOT_FOUND: i32 = 127;

/// Exit code when the target was found but could not be executed
pub const EXIT_CANNOT_EXECUTE: i32 = 126;

#[derive(Debug)]
pub enum Error {
    /// No candidate for the program exists on the search path
    ExecutableNotFound { program: OsString },
    /// A candidate exists but is not executable
    PermissionDenied { path: PathBuf },
    /// The program resolves to the running executable
    SelfInvocation { path: PathBuf },
    /// The operating system refused to start the resolved program
    ///
    /// A file that is neither a binary nor a script with an interpreter line is retried with
    /// `/bin/sh` first, so this is only reported if that fails too.
    Launch { path: PathBuf, source: io::Error },
}

impl Error {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::ExecutableNotFound { .. } => EXIT_NOT_FOUND,
            Error::PermissionDenied { .. }
            | Error::SelfInvocation { .. }
            | Error::Launch { .. } => EXIT_CANNOT_EXECUTE,
        }
    }

    // The program can disappear or lose its mode bits between resolution and launch.
    pub(crate) fn from_launch(program: &OsStr, path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Error::ExecutableNotFound {
                program: program.to_owned(),
            },
            io::ErrorKind::PermissionDenied => Error::PermissionDenied {
                path: path.to_owned(),
            },
            _ => Error::Launch {
                path: path.to_owned(),
                source,
            },
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::ExecutableNotFound { program } => {
                write!(f, "`{}` not found in PATH", OneLine(&program.to_string_lossy()))
            }
            Error::PermissionDenied { path } => write!(
                f,
                "permission denied: cannot execute `{}`",
                OneLine(&path.to_string_lossy())
            ),
            Error::SelfInvocation { path } => write!(
                f,
                "`{}` is this wrapper; refusing to forward to itself",
                OneLine(&path.to_string_lossy())
            ),
            Error::Launch { path, source } => write!(
                f,
                "failed to execute `{}`: {}",
                OneLine(&path.to_string_lossy()),
                OneLine(&source.to_string())
            ),
        }
    }
}

// Paths come from `PATH`, which may contain line breaks and other control characters.
struct OneLine<'a>(&'a str);

impl std::fmt::Display for OneLine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for c in self.0.chars() {
            if c.is_control() {
                write!(f, "{}", c.escape_default())?;
            } else {
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Launch { source, .. } => Some(source),
            _ => None,
        }
    }
}
