//! Python debug launcher.
//!
//! Runs a python command line under a debugging backend:
//!
//! ```text
//! launcher --mode <debugpy|ptvsd|pydevd|pydevd-pycharm> [--port p] [--wait] -- python app.py
//! ```

use anyhow::Context;
use clap::Parser;
use dbg_wrappers::config::{WrapperConfig, HELPERS_VAR};
use dbg_wrappers::env::Env;
use dbg_wrappers::exec::{process_exit_code, ConsoleExecutor};
use dbg_wrappers::python::mode::Mode;
use dbg_wrappers::python::{PythonContext, DEFAULT_HELPERS, DEFAULT_PORT};
use log::{debug, trace};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base location of the debugging helpers
    #[clap(long, env = HELPERS_VAR, default_value = DEFAULT_HELPERS)]
    helpers: PathBuf,

    /// Debugger mode: debugpy, ptvsd, pydevd, pydevd-pycharm
    #[clap(long, value_parser = Mode::parse)]
    mode: Mode,

    /// Port to listen for remote debug connections
    #[clap(
        long,
        default_value_t = DEFAULT_PORT,
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    port: u16,

    /// Wait for debugger connection on start
    #[clap(long)]
    wait: bool,

    /// Python command line
    #[clap(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

fn launch(args: Args, env: Env, config: &WrapperConfig) -> anyhow::Result<i32> {
    trace!(target: "python", "command-line: {:?}", args.command);
    let pc = PythonContext {
        port: args.port,
        wait: args.wait,
        helpers: args.helpers,
        ..PythonContext::new(args.mode, args.command, env)
    };
    pc.launch(config, &ConsoleExecutor)
        .context("error launching python debugging")
}

fn main() -> ExitCode {
    let env = Env::from_process();
    let config = WrapperConfig::from_env(&env);
    dbg_wrappers::log::init(config.verbose.as_deref());

    let args = Args::parse();
    debug!(target: "python", "launcher args: {args:?}");

    match launch(args, env, &config) {
        Ok(status) => process_exit_code(status),
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
