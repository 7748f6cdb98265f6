use crate::error::Error;
use crate::python::mode::Mode;
use log::{debug, warn};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::PathBuf;
use uuid::Uuid;

/// Name of the generated module launcher, distinct enough to never shadow a user import.
pub const SHIM_NAME: &str = "dbg_pydevd_launch.py";

const MODULE_FLAG: &str = "-m";

/// Debugging backend invocation settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackendPlan {
    pub mode: Mode,
    pub port: u16,
    pub wait: bool,
    /// Ask the backend for its own debug output.
    pub verbose: bool,
}

impl BackendPlan {
    /// Build the backend command line wrapping `args`, an interpreter followed by its
    /// arguments.
    pub fn command_line(&self, args: &[String]) -> Result<Vec<String>, Error> {
        let (interpreter, app_args) = args.split_first().ok_or(Error::NoCommandLine)?;
        let port = self.port.to_string();

        let mut cmdline = vec![
            interpreter.clone(),
            MODULE_FLAG.to_string(),
            self.mode.module().to_string(),
        ];
        match self.mode {
            Mode::Ptvsd => {
                cmdline.extend(
                    ["--host", "localhost", "--port", port.as_str()].map(String::from),
                );
                if self.wait {
                    cmdline.push("--wait".to_string());
                }
                cmdline.extend_from_slice(app_args);
            }
            Mode::Debugpy => {
                cmdline.extend(["--listen", port.as_str()].map(String::from));
                if self.wait {
                    cmdline.push("--wait-for-client".to_string());
                }
                // debugpy wants `-m` and the module as separate tokens
                let fused_module = app_args
                    .split_first()
                    .and_then(|(first, rest)| Some((first.strip_prefix(MODULE_FLAG)?, rest)))
                    .filter(|(module, _)| !module.is_empty());
                match fused_module {
                    Some((module, rest)) => {
                        cmdline.push(MODULE_FLAG.to_string());
                        cmdline.push(module.to_string());
                        cmdline.extend_from_slice(rest);
                    }
                    None => cmdline.extend_from_slice(app_args),
                }
            }
            Mode::Pydevd | Mode::PydevdPycharm => {
                cmdline.extend(["--server", "--port", port.as_str()].map(String::from));
                if self.verbose {
                    cmdline.push("--DEBUG".to_string());
                }
                if self.wait {
                    warn!(target: "python", "pydevd does not support wait-for-client");
                } else {
                    cmdline.push("--continue".to_string());
                }

                // --file must be the last pydevd argument
                let (file, remaining) = pydevd_target(app_args)?;
                cmdline.push("--file".to_string());
                cmdline.push(file);
                cmdline.extend(remaining);
            }
        }

        debug!(target: "python", "{} command-line: {cmdline:?}", self.mode);
        Ok(cmdline)
    }
}

/// Return the file pydevd should run and the arguments that follow it. pydevd cannot run a
/// module (`-m name`, `-mname`), for a module a launcher script is generated instead.
pub fn pydevd_target(args: &[String]) -> Result<(String, Vec<String>), Error> {
    let Some(first) = args.first() else {
        return Err(Error::NoCommandLine);
    };
    if !first.starts_with('-') {
        return Ok((first.clone(), args[1..].to_vec()));
    }
    let Some(module) = first.strip_prefix(MODULE_FLAG) else {
        return Err(Error::ExpectedModule(args.to_vec()));
    };

    let (module, remaining) = if module.is_empty() {
        match args.get(1) {
            Some(module) => (module.as_str(), &args[2..]),
            None => return Err(Error::MissingModule(args.to_vec())),
        }
    } else {
        (module, &args[1..])
    };

    let shim = write_module_shim(module)?;
    Ok((shim.to_string_lossy().to_string(), remaining.to_vec()))
}

/// Python source that runs `module` as `__main__`.
pub fn module_shim_source(module: &str) -> String {
    format!(
        "import sys\nimport runpy\nrunpy.run_module('{module}', run_name=\"__main__\",alter_sys=True)\n"
    )
}

/// Write the module launcher into a fresh directory under the system temp dir, other
/// locations may not be writable. The directory is left behind.
fn write_module_shim(module: &str) -> Result<PathBuf, Error> {
    let dir = std::env::temp_dir().join(format!("pydevd{}", Uuid::new_v4().simple()));
    fs::create_dir(&dir).map_err(|e| Error::ModuleShim(dir.clone(), e))?;

    let path = dir.join(SHIM_NAME);
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o755)
        .open(&path)
        .and_then(|mut f| f.write_all(module_shim_source(module).as_bytes()))
        .map_err(|e| Error::ModuleShim(path.clone(), e))?;

    debug!(target: "python", "module {module:?} launched through {path:?}");
    Ok(path)
}
