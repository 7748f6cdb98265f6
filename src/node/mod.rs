//! A wrapper for the node executable that lets application scripts be debugged.
//!
//! Node applications are often started through node-based launch tools (`npm`, `nodemon`,
//! `next`), frequently several of them in combination, and these tools swallow `--inspect`
//! flags meant for the application. When a `node_modules` script is executed the wrapper
//! strips `--inspect*` flags and propagates them via `NODE_DEBUG`; when an application script
//! is executed the wrapper installs the propagated flag.

pub mod args;
pub mod mailbox;
pub mod script;

use crate::config::WrapperConfig;
use crate::env::Env;
use crate::error::Error;
use crate::exec::{CommandLine, Executor};
use crate::resolve;
use crate::weak_error;
use args::{
    install_after_script, install_node_arg, join_options, strip_inspect_arg, strip_inspect_options,
};
use log::{debug, info, warn};
use script::ScriptKind;

/// Secondary, shell-quoted, node options.
pub const NODE_OPTIONS: &str = "NODE_OPTIONS";

/// Entry script of nodemon, the supervisor that forks its child instead of spawning node.
const NODEMON_SCRIPT: &str = "/nodemon";

/// Launch context of one node invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeContext {
    /// Program to run, the wrapper until resolved to the real node.
    pub program: String,
    pub args: Vec<String>,
    pub env: Env,
}

impl NodeContext {
    pub fn new<ARGS: IntoIterator<Item = I>, I: Into<String>>(
        program: impl Into<String>,
        args: ARGS,
        env: Env,
    ) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            env,
        }
    }

    /// Replace the program with the real node executable (not this wrapper).
    pub fn unwrap(&mut self) -> Result<(), Error> {
        let real = resolve::real_program(&self.program, self.env.get("PATH"))?;
        self.program = real.to_string_lossy().to_string();
        Ok(())
    }

    /// Remove all `--inspect*` flags from both the command line and `NODE_OPTIONS`. Returns the
    /// last flag found; the command line wins over `NODE_OPTIONS`.
    pub fn strip_inspect_args(&mut self) -> Option<String> {
        let mut found = None;

        if let Some(options) = self.env.get(NODE_OPTIONS) {
            let split = shell_words::split(options);
            if let Some(options) = weak_error!(split, "NODE_OPTIONS cannot be split:") {
                let (options, inspect) = strip_inspect_options(&options);
                if let Some(inspect) = inspect {
                    debug!(target: "node", "found {inspect:?} in {NODE_OPTIONS}");
                    if options.is_empty() {
                        self.env.remove(NODE_OPTIONS);
                    } else {
                        self.env.set(NODE_OPTIONS, join_options(&options));
                    }
                    found = Some(inspect);
                }
            }
        }

        let (args, inspect) = strip_inspect_arg(&self.args);
        if let Some(inspect) = inspect {
            debug!(target: "node", "found {inspect:?} in command-line");
            self.args = args;
            found = Some(inspect);
        }

        found
    }

    /// Insert a node option before the script.
    pub fn add_node_arg(&mut self, node_arg: &str) {
        install_node_arg(&mut self.args, node_arg);
        debug!(target: "node", "added node arg: {:?}", self.args);
    }

    /// `nodemon --inspect` spawns node for its child, which goes through this wrapper, but
    /// otherwise nodemon forks the application script directly and the wrapper is never
    /// reached. Hand a propagated flag to nodemon itself and close the mailbox.
    pub fn handle_nodemon(&mut self) {
        let Some(node_debug) = mailbox::peek(&self.env).map(ToOwned::to_owned) else {
            return;
        };
        if install_after_script(&mut self.args, NODEMON_SCRIPT, &node_debug) {
            mailbox::take(&mut self.env);
            debug!(target: "node", "special handling for nodemon: {:?}", self.args);
        }
    }

    pub fn command_line(&self) -> CommandLine {
        CommandLine::new(&self.program, &self.args, self.env.clone())
    }
}

/// Rewrite the context so that the debug flags end up at the application script.
pub fn prepare(nc: &mut NodeContext, config: &WrapperConfig) -> Result<(), Error> {
    nc.unwrap()?;
    debug!(target: "node", "unwrapped: {}", nc.program);

    if !config.enabled {
        info!(target: "node", "wrapper disabled");
        return Ok(());
    }

    let script = match args::find_script(&nc.args) {
        None => None,
        // an absolute path classifies correctly when run from inside node_modules
        Some(script) => match std::path::absolute(script) {
            Ok(path) => Some(path.to_string_lossy().to_string()),
            Err(e) => {
                warn!(target: "node", "could not access script: {e}");
                return Ok(());
            }
        },
    };
    debug!(target: "node", "script: {script:?}");

    let allowed = &config.allowed;
    if script::classify(script.as_deref(), allowed) == ScriptKind::Application {
        if let Some(node_debug) = mailbox::take(&mut nc.env) {
            debug!(target: "node", "found {}={node_debug}", mailbox::NODE_DEBUG);
            // the flag pinned by an ancestor wins over local ones
            nc.strip_inspect_args();
            nc.add_node_arg(&node_debug);
        }
        return Ok(());
    }

    if let Some(inspect) = nc.strip_inspect_args() {
        debug!(target: "node", "stripped {inspect:?} as not an app script");
        mailbox::arm(&mut nc.env, &inspect);
    }
    nc.handle_nodemon();

    Ok(())
}

/// Prepare the context and hand it off to the real node, returning its exit status.
pub fn run(
    mut nc: NodeContext,
    config: &WrapperConfig,
    executor: &dyn Executor,
) -> Result<i32, Error> {
    prepare(&mut nc, config)?;
    let cmd = nc.command_line();
    debug!(target: "node", "exec: {cmd} (env: {})", cmd.env);
    executor.run(&cmd)
}
