use log::debug;
use std::{
    env::{current_exe, var_os},
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::Command,
};

mod diagnostic;
pub use diagnostic::report;

mod error;
pub use error::{EXIT_CANNOT_EXECUTE, EXIT_NOT_FOUND, Error};

mod search;
pub use search::resolve;

mod status;
pub use status::exit_code;

/// Program the `verdi-shim` binary forwards to, fixed when the crate is built
pub const TARGET: &str = env!("VERDI_SHIM_TARGET");

#[must_use]
pub fn forward<S: AsRef<OsStr>>(program: S) -> Forwarder {
    Forwarder {
        program: program.as_ref().to_owned(),
        args: Vec::new(),
        search_path: None,
    }
}

pub struct Forwarder {
    program: OsString,
    args: Vec<OsString>,
    search_path: Option<OsString>,
}

impl Forwarder {
    /// Pass `arg` to the program
    #[must_use]
    pub fn arg<S>(mut self, arg: S) -> Forwarder
    where
        S: AsRef<OsStr>,
    {
        self.args.push(arg.as_ref().to_owned());
        self
    }

    /// Pass `args` to the program, in order
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Forwarder
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|arg| arg.as_ref().to_owned()));
        self
    }

    /// Search `paths` rather than the inherited `PATH`
    ///
    /// Only resolution is affected. The program still inherits this process's environment.
    #[must_use]
    pub fn search_path<S>(mut self, paths: S) -> Forwarder
    where
        S: AsRef<OsStr>,
    {
        self.search_path = Some(paths.as_ref().to_owned());
        self
    }

    /// Locate the program, refusing to resolve to the running executable
    pub fn resolve(&self) -> Result<PathBuf, Error> {
        let search_path = self.search_path.clone().or_else(|| var_os("PATH"));
        let path = resolve(&self.program, search_path.as_deref())?;
        if is_current_exe(&path) {
            return Err(Error::SelfInvocation { path });
        }
        Ok(path)
    }

    fn command(&self) -> Result<(PathBuf, Command), Error> {
        let path = self.resolve()?;
        let mut command = Command::new(&path);
        #[cfg(unix)]
        std::os::unix::process::CommandExt::arg0(&mut command, &self.program);
        command.args(&self.args);
        debug!("forwarding to `{}`: {:?}", path.display(), &command);
        Ok((path, command))
    }

    /// Replace the current process with the program
    ///
    /// Returns only if the program could not be started.
    #[cfg(unix)]
    #[must_use]
    pub fn exec(self) -> Error {
        use std::os::unix::process::CommandExt;

        let (path, mut command) = match self.command() {
            Ok(pair) => pair,
            Err(error) => return error,
        };
        let mut source = command.exec();
        if is_unrecognized_format(&source) {
            source = self.shell_command(&path).exec();
        }
        Error::from_launch(&self.program, &path, source)
    }

    /// Run the program as a child and wait for it
    ///
    /// Returns the code this process should exit with to mirror the child's status.
    pub fn spawn(self) -> Result<i32, Error> {
        let (path, mut command) = self.command()?;
        let status = match command.status() {
            Ok(status) => status,
            #[cfg(unix)]
            Err(source) if is_unrecognized_format(&source) => self
                .shell_command(&path)
                .status()
                .map_err(|source| Error::from_launch(&self.program, &path, source))?,
            Err(source) => return Err(Error::from_launch(&self.program, &path, source)),
        };
        debug!("`{}` finished: {status}", path.display());
        Ok(exit_code(status))
    }

    // A file with no interpreter line is run by the shell, as `execvp` and POSIX shells do.
    #[cfg(unix)]
    fn shell_command(&self, path: &Path) -> Command {
        let mut command = Command::new(SHELL);
        command.arg(path);
        command.args(&self.args);
        debug!("`{}` is not a binary or script, retrying: {:?}", path.display(), &command);
        command
    }

    /// Hand control to the program in the way the platform supports best
    ///
    /// On unix the current process image is replaced, so this returns only on failure. Elsewhere
    /// the program is spawned and waited for.
    pub fn hand_off(self) -> Result<i32, Error> {
        #[cfg(unix)]
        {
            Err(self.exec())
        }
        #[cfg(not(unix))]
        {
            self.spawn()
        }
    }
}

#[cfg(unix)]
const SHELL: &str = "/bin/sh";

#[cfg(unix)]
fn is_unrecognized_format(error: &std::io::Error) -> bool {
    error.raw_os_error() == Some(libc::ENOEXEC)
}

fn is_current_exe(path: &Path) -> bool {
    let Ok(current_exe) = current_exe().and_then(|exe| exe.canonicalize()) else {
        return false;
    };
    path.canonicalize()
        .is_ok_and(|resolved| resolved == current_exe)
}
