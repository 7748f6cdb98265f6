use crate::env::Env;
use crate::error::Error;
use log::debug;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt::{Display, Formatter};
use std::process::{Command, ExitCode, ExitStatus, Stdio};

/// A fully specified process invocation: program, arguments and the complete environment.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
    pub env: Env,
}

impl CommandLine {
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

    /// Create a command from an argv vector, the first token is the program.
    pub fn from_argv(argv: &[String], env: Env) -> Result<Self, Error> {
        let (program, args) = argv.split_first().ok_or(Error::NoCommandLine)?;
        Ok(Self::new(program, args, env))
    }

    /// Return the program followed by its arguments.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.args.len() + 1);
        argv.push(self.program.clone());
        argv.extend(self.args.iter().cloned());
        argv
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).env_clear().envs(self.env.iter());
        cmd
    }
}

impl Display for CommandLine {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&shell_words::join(self.argv()))
    }
}

/// Process execution primitive used by the wrappers.
pub trait Executor {
    /// Run the command connected to the standard streams of the current process, wait for it
    /// and return its exit status.
    fn run(&self, cmd: &CommandLine) -> Result<i32, Error>;

    /// Run the command and return its combined stdout and stderr. A non-zero exit status is an
    /// error.
    fn output(&self, cmd: &CommandLine) -> Result<String, Error>;
}

/// Executor that spawns real processes.
pub struct ConsoleExecutor;

impl Executor for ConsoleExecutor {
    fn run(&self, cmd: &CommandLine) -> Result<i32, Error> {
        debug!(target: "wrapper", "command(stdin/out/err): {cmd} (env: {})", cmd.env);
        let status = cmd
            .command()
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| Error::Launch(cmd.program.clone(), e))?;
        Ok(exit_code(status))
    }

    fn output(&self, cmd: &CommandLine) -> Result<String, Error> {
        debug!(target: "wrapper", "command: {cmd} (env: {})", cmd.env);
        let output = cmd
            .command()
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Error::Launch(cmd.program.clone(), e))?;
        if !output.status.success() {
            return Err(Error::CommandFailed(
                cmd.program.clone(),
                exit_code(output.status),
            ));
        }

        let mut combined = output.stdout;
        combined.extend(output.stderr);
        Ok(String::from_utf8(combined)?)
    }
}

/// Translate an exit status into a shell-style exit code, `128 + signo` for a signaled process.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signo) = status.signal() {
            if let Ok(signal) = nix::sys::signal::Signal::try_from(signo) {
                debug!(target: "wrapper", "child terminated by {signal}");
            }
            return 128 + signo;
        }
    }

    1
}

/// Process exit code of a wrapper that handed off to a child with exit status `status`.
pub fn process_exit_code(status: i32) -> ExitCode {
    match u8::try_from(status) {
        Ok(code) => ExitCode::from(code),
        Err(_) => ExitCode::FAILURE,
    }
}

/// Executor that never spawns anything: records every command and replays scripted outputs.
/// Lets the rewriting engine run end to end in tests and dry runs.
#[derive(Default)]
pub struct ScriptedExecutor {
    outputs: RefCell<VecDeque<Result<String, i32>>>,
    status: i32,
    runs: RefCell<Vec<CommandLine>>,
    queries: RefCell<Vec<CommandLine>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exit status returned by every [`Executor::run`] call.
    pub fn with_status(mut self, status: i32) -> Self {
        self.status = status;
        self
    }

    /// Queue a successful [`Executor::output`] result.
    pub fn with_output(self, out: impl Into<String>) -> Self {
        self.outputs.borrow_mut().push_back(Ok(out.into()));
        self
    }

    /// Queue a failed [`Executor::output`] result with the given exit status.
    pub fn with_failure(self, status: i32) -> Self {
        self.outputs.borrow_mut().push_back(Err(status));
        self
    }

    /// Commands passed to [`Executor::run`].
    pub fn runs(&self) -> Vec<CommandLine> {
        self.runs.borrow().clone()
    }

    /// Commands passed to [`Executor::output`].
    pub fn queries(&self) -> Vec<CommandLine> {
        self.queries.borrow().clone()
    }
}

impl Executor for ScriptedExecutor {
    fn run(&self, cmd: &CommandLine) -> Result<i32, Error> {
        self.runs.borrow_mut().push(cmd.clone());
        Ok(self.status)
    }

    fn output(&self, cmd: &CommandLine) -> Result<String, Error> {
        self.queries.borrow_mut().push(cmd.clone());
        match self.outputs.borrow_mut().pop_front() {
            Some(Ok(out)) => Ok(out),
            Some(Err(status)) => Err(Error::CommandFailed(cmd.program.clone(), status)),
            None => Err(Error::Launch(
                cmd.program.clone(),
                std::io::Error::from(std::io::ErrorKind::NotFound),
            )),
        }
    }
}
