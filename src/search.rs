use crate::Error;
use std::{
    env::split_paths,
    ffi::OsStr,
    path::PathBuf,
};

enum Probe {
    Executable,
    NotExecutable,
    Missing,
}

/// Locate `program` the way `execvp` would
///
/// A `program` containing a path separator is probed as is. Otherwise each entry of `search_path`
/// is tried in order, an empty entry standing for the current directory. If only non-executable
/// candidates exist, the first of them is reported as [`Error::PermissionDenied`].
pub fn resolve(program: &OsStr, search_path: Option<&OsStr>) -> Result<PathBuf, Error> {
    if os_specific::has_separator(program) {
        let path = PathBuf::from(program);
        return match os_specific::probe(&path) {
            Probe::Executable => Ok(path),
            Probe::NotExecutable => Err(Error::PermissionDenied { path }),
            Probe::Missing => Err(Error::ExecutableNotFound {
                program: program.to_owned(),
            }),
        };
    }

    let mut denied = None;
    for dir in search_path.map(split_paths).into_iter().flatten() {
        let dir = if dir.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            dir
        };
        for candidate in os_specific::candidates(&dir, program) {
            match os_specific::probe(&candidate) {
                Probe::Executable => return Ok(candidate),
                Probe::NotExecutable => {
                    denied.get_or_insert(candidate);
                }
                Probe::Missing => {}
            }
        }
    }

    match denied {
        Some(path) => Err(Error::PermissionDenied { path }),
        None => Err(Error::ExecutableNotFound {
            program: program.to_owned(),
        }),
    }
}

#[cfg(unix)]
mod os_specific {
    use super::Probe;
    use std::{
        ffi::OsStr,
        os::unix::fs::PermissionsExt,
        path::{Path, PathBuf},
    };

    pub fn has_separator(program: &OsStr) -> bool {
        program.as_encoded_bytes().contains(&b'/')
    }

    pub fn candidates(dir: &Path, program: &OsStr) -> Vec<PathBuf> {
        vec![dir.join(program)]
    }

    // Directories are reported as not executable, matching the `EACCES` that `execve` returns.
    pub fn probe(path: &Path) -> Probe {
        let Ok(metadata) = path.metadata() else {
            return Probe::Missing;
        };
        if metadata.is_file() && metadata.permissions().mode() & 0o111 != 0 {
            Probe::Executable
        } else {
            Probe::NotExecutable
        }
    }
}

#[cfg(windows)]
mod os_specific {
    use super::Probe;
    use std::{
        env::var_os,
        ffi::{OsStr, OsString},
        path::{Path, PathBuf},
    };

    const DEFAULT_PATHEXT: &str = ".COM;.EXE;.BAT;.CMD";

    pub fn has_separator(program: &OsStr) -> bool {
        program
            .as_encoded_bytes()
            .iter()
            .any(|&byte| byte == b'/' || byte == b'\\')
    }

    pub fn candidates(dir: &Path, program: &OsStr) -> Vec<PathBuf> {
        let path = dir.join(program);
        let pathext = var_os("PATHEXT").unwrap_or_else(|| OsString::from(DEFAULT_PATHEXT));
        let mut candidates = Vec::new();
        if Path::new(program).extension().is_some() {
            candidates.push(path.clone());
        }
        for extension in pathext
            .to_string_lossy()
            .split(';')
            .filter(|extension| !extension.is_empty())
        {
            let mut candidate = path.clone().into_os_string();
            candidate.push(extension);
            candidates.push(PathBuf::from(candidate));
        }
        candidates
    }

    pub fn probe(path: &Path) -> Probe {
        match path.metadata() {
            Ok(metadata) if metadata.is_file() => Probe::Executable,
            Ok(_) => Probe::NotExecutable,
            Err(_) => Probe::Missing,
        }
    }
}
