use crate::error::Error;
use log::debug;
use nix::errno::Errno;
use nix::sys::stat::{stat, FileStat};
use std::path::{Path, PathBuf};

/// Filesystem identity of a file, two paths are the same file when their identities match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileId {
    dev: u64,
    ino: u64,
}

impl From<FileStat> for FileId {
    fn from(st: FileStat) -> Self {
        Self {
            dev: st.st_dev as u64,
            ino: st.st_ino as u64,
        }
    }
}

fn identity(path: &Path) -> Result<Option<FileId>, Error> {
    match stat(path) {
        Ok(st) => Ok(Some(FileId::from(st))),
        Err(Errno::ENOENT) => Ok(None),
        Err(e) => Err(Error::Stat(path.to_path_buf(), e)),
    }
}

/// Find the real program shadowed by the wrapper.
///
/// When `program` exists as a file it is the wrapper itself and the first executable with the
/// same base name in `path` that is a different file wins. Shells leave a bare command name in
/// `argv[0]` for programs resolved through `PATH`; in that case the first match is presumed to
/// be the wrapper and the next distinct match wins.
///
/// # Arguments
///
/// * `program`: the name the wrapper was invoked as
/// * `path`: `PATH`-style directory list
pub fn real_program(program: &str, path: Option<&str>) -> Result<PathBuf, Error> {
    let mut wrapper = identity(Path::new(program))?;

    let base = Path::new(program)
        .file_name()
        .ok_or_else(|| Error::ProgramNotFound(program.to_string()))?;
    let not_found = || Error::ProgramNotFound(base.to_string_lossy().to_string());

    let cwd = std::env::current_dir()?;
    let Ok(candidates) = which::which_in_all(base, path, cwd) else {
        return Err(not_found());
    };

    for candidate in candidates {
        let Some(id) = identity(&candidate)? else {
            continue;
        };
        match wrapper {
            None => {
                debug!(target: "wrapper", "unwrap: presumed wrapper at {}", candidate.display());
                wrapper = Some(id);
            }
            Some(wrapper_id) if wrapper_id != id => {
                debug!(target: "wrapper", "unwrap: replacing {program} -> {}", candidate.display());
                return Ok(candidate);
            }
            Some(_) => {}
        }
    }

    Err(not_found())
}
