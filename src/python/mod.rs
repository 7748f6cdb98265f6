//! A launcher for python command lines that starts the application under a debugging backend.
//!
//! The python executable cannot be wrapped the way `node` is: `pip install` hard-codes the
//! interpreter location into launcher scripts and an image may carry several interpreters. The
//! launcher is placed in front of the original command line instead:
//!
//! ```text
//! launcher --mode <debugpy|ptvsd|pydevd|pydevd-pycharm> --port p [--wait] -- python app.py
//! ```
//!
//! Launcher scripts are expanded through their shebang, `PYTHONPATH` is pointed at the backend
//! build matching the interpreter version and the command line is rewritten to run the backend.

pub mod mode;
pub mod plan;
pub mod shebang;
pub mod version;

use crate::config::WrapperConfig;
use crate::env::Env;
use crate::error::Error;
use crate::exec::{CommandLine, Executor};
use log::{debug, info, warn};
use mode::Mode;
use plan::BackendPlan;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Module search path of the interpreter.
pub const PYTHONPATH: &str = "PYTHONPATH";

/// Default location of the bundled debugging helpers.
pub const DEFAULT_HELPERS: &str = "/dbg";

/// Default port of the debugging backend.
pub const DEFAULT_PORT: u16 = 9999;

/// Launch context of one python command line.
#[derive(Debug, Clone, PartialEq)]
pub struct PythonContext {
    pub mode: Mode,
    pub port: u16,
    pub wait: bool,
    /// Root of the bundled backends, the python ones live in `<helpers>/python`.
    pub helpers: PathBuf,
    /// Original command line, the interpreter (or a launcher script) first.
    pub args: Vec<String>,
    pub env: Env,
}

impl PythonContext {
    pub fn new(mode: Mode, args: Vec<String>, env: Env) -> Self {
        Self {
            mode,
            port: DEFAULT_PORT,
            wait: false,
            helpers: PathBuf::from(DEFAULT_HELPERS),
            args,
            env,
        }
    }

    /// True if the command line already starts a debugging backend. Only simple command lines
    /// are recognized, `WRAPPER_ENABLED=false` is the way out for anything else.
    pub fn already_configured(&self) -> bool {
        let Some(program) = self.args.first() else {
            return false;
        };
        let base = std::path::Path::new(program)
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();

        if base == "pydevd" {
            debug!(target: "python", "already configured to use pydevd");
            return true;
        }
        if !base.starts_with("python") {
            return false;
        }

        let module = match self.args.get(1).map(String::as_str) {
            Some("-m") => self.args.get(2).map(String::as_str),
            Some(arg) => arg.strip_prefix("-m"),
            None => None,
        };
        match module {
            Some(backend @ ("debugpy" | "ptvsd" | "pydevd")) => {
                debug!(target: "python", "already configured to use {backend}");
                true
            }
            _ => false,
        }
    }

    /// Append the backend library matching the interpreter to `PYTHONPATH`. Entries the user
    /// configured stay first.
    pub fn update_env(
        &mut self,
        config: &WrapperConfig,
        executor: &dyn Executor,
    ) -> Result<(), Error> {
        if config.skip_env {
            debug!(target: "python", "skipping environment configuration by request");
            return Ok(());
        }

        if let Err(e) = std::fs::metadata(&self.helpers) {
            if e.kind() == ErrorKind::NotFound {
                warn!(target: "python", "debugging helpers not found at {:?}", self.helpers);
                return Ok(());
            }
            return Err(Error::HelpersInaccessible(self.helpers.clone(), e));
        }

        let interpreter = self.args.first().ok_or(Error::NoCommandLine)?;
        let version = version::detect(interpreter, config, &self.env, executor)?;

        let library = self.mode.library_path(&self.helpers, version);
        if !library.exists() {
            warn!(
                target: "python",
                "debugging support for Python {version} not found: may require manually installing {:?}",
                self.mode.to_string()
            );
        }
        self.env.append_path(PYTHONPATH, &library.to_string_lossy());
        debug!(target: "python", "{PYTHONPATH}={:?}", self.env.get(PYTHONPATH));
        Ok(())
    }

    /// Replace the command line with the backend invocation.
    pub fn update_command_line(&mut self, config: &WrapperConfig) -> Result<(), Error> {
        let plan = BackendPlan {
            mode: self.mode,
            port: self.port,
            wait: self.wait,
            verbose: config.is_verbose(),
        };
        self.args = plan.command_line(&self.args)?;
        Ok(())
    }

    fn instrument(
        &mut self,
        config: &WrapperConfig,
        executor: &dyn Executor,
    ) -> Result<(), Error> {
        shebang::unwrap_launcher(&mut self.args, &self.env)?;
        self.update_env(config, executor)?;
        self.update_command_line(config)
    }

    /// Rewrite the command line for debugging. Returns false if the command line is to be run
    /// unmodified: the wrapper is disabled, the command line is already configured or
    /// instrumentation failed in a way that still allows running the application.
    pub fn prepare(
        &mut self,
        config: &WrapperConfig,
        executor: &dyn Executor,
    ) -> Result<bool, Error> {
        if !config.enabled {
            info!(target: "python", "wrapper disabled, launching {:?}", self.args);
            return Ok(false);
        }
        if self.already_configured() {
            info!(target: "python", "already configured for debugging");
            return Ok(false);
        }

        let (args, env) = (self.args.clone(), self.env.clone());
        match self.instrument(config, executor) {
            Ok(()) => Ok(true),
            Err(e) if !e.is_fatal() => {
                warn!(target: "python", "launching without debugging support: {e}");
                self.args = args;
                self.env = env;
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Prepare and run the command line, returning its exit status.
    pub fn launch(mut self, config: &WrapperConfig, executor: &dyn Executor) -> Result<i32, Error> {
        self.prepare(config, executor)?;
        let cmd = CommandLine::from_argv(&self.args, self.env)?;
        executor.run(&cmd)
    }
}
