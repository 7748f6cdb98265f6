//! Launcher scripts (`gunicorn`, `flask`, anything installed by `pip`) hard-code their
//! interpreter in a shebang line. Backends do not search `PATH` for a script, so such a command
//! line is expanded into the equivalent interpreter invocation before it is wrapped.

use crate::env::Env;
use crate::error::Error;
use log::{debug, trace, warn};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

const SHEBANG: &[u8] = b"#!";
const HEADER_LEN: usize = 1024;

/// True if the base name of `program` looks like a python interpreter (`python`, `python3.9`).
pub fn is_python(program: &str) -> bool {
    Path::new(program)
        .file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with("python"))
}

fn locate(program: &str, env: &Env) -> Result<PathBuf, Error> {
    let path = PathBuf::from(program);
    match std::fs::metadata(&path) {
        Ok(_) => Ok(path),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            let cwd = std::env::current_dir()?;
            which::which_in(program, env.get("PATH"), cwd)
                .map_err(|e| Error::LauncherNotFound(program.to_string(), e))
        }
        Err(e) => Err(Error::LauncherAccess(path, e)),
    }
}

fn read_header(path: &Path) -> Result<Vec<u8>, Error> {
    let file = File::open(path).map_err(|e| Error::LauncherAccess(path.to_path_buf(), e))?;
    let mut header = Vec::with_capacity(HEADER_LEN);
    file.take(HEADER_LEN as u64)
        .read_to_end(&mut header)
        .map_err(|e| Error::LauncherAccess(path.to_path_buf(), e))?;
    Ok(header)
}

/// Split an interpreter directive, `/usr/bin/env` indirection is dropped so the first token is
/// the interpreter itself.
fn interpreter_command(directive: &str) -> Vec<String> {
    let mut tokens = match shell_words::split(directive) {
        Ok(tokens) => tokens,
        Err(e) => {
            warn!(target: "python", "shebang {directive:?} seems odd: {e}");
            vec![directive.to_string()]
        }
    };

    let is_env = tokens
        .first()
        .and_then(|t| Path::new(t).file_name())
        .is_some_and(|name| name == "env");
    if is_env && tokens.len() > 1 {
        tokens.remove(0);
        if tokens.len() > 1 && tokens[0] == "-S" {
            tokens.remove(0);
        }
    }
    tokens
}

/// Expand a launcher script at `args[0]` into its interpreter command line.
///
/// A program that looks like python, a binary or a file without a shebang leaves `args`
/// unchanged. The expansion is a single pass: an interpreter directive that itself names a
/// launcher script is not expanded further.
pub fn unwrap_launcher(args: &mut Vec<String>, env: &Env) -> Result<(), Error> {
    let Some(program) = args.first() else {
        return Err(Error::NoCommandLine);
    };
    if is_python(program) {
        debug!(
            target: "python",
            "no unwrapping required: launcher appears to be python: {program:?}"
        );
        return Ok(());
    }

    let path = locate(program, env)?;
    let path_str = path.to_string_lossy().to_string();
    if is_python(&path_str) {
        debug!(
            target: "python",
            "no further unwrapping required: {program:?} resolves to {path_str:?}"
        );
        return Ok(());
    }

    let header = read_header(&path)?;
    if header.len() < SHEBANG.len() {
        debug!(target: "python", "{path_str:?} has no shebang");
        return Ok(());
    }
    if !header.starts_with(SHEBANG) {
        debug!(target: "python", "{path_str:?} appears to be a binary");
        return Ok(());
    }

    let directive = &header[SHEBANG.len()..];
    let line = directive.split(|&b| b == b'\n').next().unwrap_or_default();
    let line = String::from_utf8_lossy(line);
    let line = line.trim_end_matches('\r');
    trace!(target: "python", "{path_str:?} has shebang {line:?}");

    let mut expanded = interpreter_command(line);
    // a launcher found through PATH is passed on by its full path
    args[0] = path_str;
    expanded.append(args);
    *args = expanded;
    debug!(target: "python", "expanded command-line: {args:?}");

    Ok(())
}
