//! Debug-launch wrappers.
//!
//! The binaries of this crate are installed in place of a real interpreter (`node`) or in
//! front of a python command line (`launcher`). They compute one corrected command line and
//! environment so that a remote debugger attaches to the application process instead of an
//! intermediate tool (package managers, reloaders, WSGI runners), then hand off to the real
//! interpreter.

pub mod config;
pub mod env;
pub mod error;
pub mod exec;
pub mod log;
pub mod node;
pub mod python;
pub mod resolve;

pub use error::Error;
