use std::path::PathBuf;
use std::string::FromUtf8Error;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // --------------------------------- generic errors --------------------------------------------
    #[error(transparent)]
    IO(#[from] std::io::Error),
    #[error(transparent)]
    FromUtf8(#[from] FromUtf8Error),
    #[error("unable to stat {0:?}: {1}")]
    Stat(PathBuf, nix::Error),

    // --------------------------------- configuration errors --------------------------------------
    #[error("unknown debugger mode {0:?}; expecting one of {1:?}")]
    UnknownMode(String, &'static [&'static str]),
    #[error("no command line specified")]
    NoCommandLine,
    #[error("debug helpers are inaccessible at {0:?}: {1}")]
    HelpersInaccessible(PathBuf, std::io::Error),

    // --------------------------------- resolution errors -----------------------------------------
    #[error("could not find {0:?} in PATH")]
    ProgramNotFound(String),

    // --------------------------------- launcher unwrapping errors --------------------------------
    #[error("could not find launcher {0:?}: {1}")]
    LauncherNotFound(String, which::Error),
    #[error("could not access launcher {0:?}: {1}")]
    LauncherAccess(PathBuf, std::io::Error),

    // --------------------------------- version detection errors ----------------------------------
    #[error("unable to determine python version from {0:?}: {1}")]
    VersionQuery(String, Box<Error>),
    #[error("launcher is not a python interpreter: {0:?}")]
    NotPython(String),
    #[error("unrecognized python version {0:?}")]
    VersionFormat(String),

    // --------------------------------- planning errors -------------------------------------------
    #[error("expected python module: {0:?}")]
    ExpectedModule(Vec<String>),
    #[error("missing python module: {0:?}")]
    MissingModule(Vec<String>),
    #[error("write module launcher {0:?}: {1}")]
    ModuleShim(PathBuf, std::io::Error),

    // --------------------------------- process errors --------------------------------------------
    #[error("cannot execute {0:?}: {1}")]
    Launch(String, std::io::Error),
    #[error("{0:?} exited with status {1}")]
    CommandFailed(String, i32),
}

impl Error {
    /// Return a hint to a launcher - abort the invocation, or give up on debug instrumentation
    /// and run the original command line unchanged.
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::LauncherNotFound(_, _) => false,
            Error::LauncherAccess(_, _) => false,
            Error::VersionQuery(_, _) => false,
            Error::NotPython(_) => false,
            Error::VersionFormat(_) => false,
            Error::HelpersInaccessible(_, _) => false,

            Error::IO(_) => true,
            Error::FromUtf8(_) => true,
            Error::Stat(_, _) => true,
            Error::UnknownMode(_, _) => true,
            Error::NoCommandLine => true,
            Error::ProgramNotFound(_) => true,
            Error::ExpectedModule(_) => true,
            Error::MissingModule(_) => true,
            Error::ModuleShim(_, _) => true,
            Error::Launch(_, _) => true,
            Error::CommandFailed(_, _) => true,
        }
    }
}

#[macro_export]
macro_rules! _error {
    ($log_fn: path, $res: expr) => {
        match $res {
            Ok(value) => Some(value),
            Err(e) => {
                $log_fn!(target: "wrapper", "{:#}", e);
                None
            }
        }
    };
    ($log_fn: path, $res: expr, $msg: tt) => {
        match $res {
            Ok(value) => Some(value),
            Err(e) => {
                $log_fn!(target: "wrapper", concat!($msg, " {:#}"), e);
                None
            }
        }
    };
}

/// Transforms `Result` into `Option` and logs an error if it occurs.
#[macro_export]
macro_rules! weak_error {
    ($res: expr) => {
        $crate::_error!(::log::warn, $res)
    };
    ($res: expr, $msg: tt) => {
        $crate::_error!(::log::warn, $res, $msg)
    };
}
