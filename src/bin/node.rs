//! Wrapper installed in place of the `node` executable.
//!
//! Every argument belongs to the real node, the wrapper has no options of its own and is
//! configured through `WRAPPER_*` environment variables only.

use anyhow::Context;
use dbg_wrappers::config::WrapperConfig;
use dbg_wrappers::env::Env;
use dbg_wrappers::exec::{process_exit_code, ConsoleExecutor};
use dbg_wrappers::node::{self, NodeContext};
use log::debug;
use std::process::ExitCode;

/// Keeps npm quiet about the node on `PATH` differing from the one running npm.
const NPM_PREPEND_NODE_PATH: &str = "npm_config_scripts_prepend_node_path";

fn wrap(argv: Vec<String>, mut env: Env, config: &WrapperConfig) -> anyhow::Result<i32> {
    let (program, args) = argv
        .split_first()
        .context("no program name in command line")?;
    env.set(NPM_PREPEND_NODE_PATH, "false");

    let nc = NodeContext::new(program, args, env);
    node::run(nc, config, &ConsoleExecutor).context("error launching node")
}

fn main() -> ExitCode {
    let env = Env::from_process();
    let config = WrapperConfig::from_env(&env);
    dbg_wrappers::log::init(config.verbose.as_deref());

    let argv: Vec<String> = std::env::args_os()
        .map(|arg| arg.to_string_lossy().to_string())
        .collect();
    debug!(target: "node", "wrapper args: {argv:?}");

    match wrap(argv, env, &config) {
        Ok(status) => process_exit_code(status),
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
