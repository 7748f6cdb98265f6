use crate::error::Error;
use crate::python::version::PythonVersion;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use strum::VariantNames;
use strum_macros::{Display, EnumString, IntoStaticStr, VariantNames};

/// Python debugging backend.
#[derive(Copy, Clone, PartialEq, Eq, Debug, EnumString, Display, IntoStaticStr, VariantNames)]
pub enum Mode {
    /// Debug adapter protocol backend, successor of ptvsd.
    #[strum(serialize = "debugpy")]
    Debugpy,
    /// Obsolete debug adapter protocol backend.
    #[strum(serialize = "ptvsd")]
    Ptvsd,
    /// Stock PyDev backend.
    #[strum(serialize = "pydevd")]
    Pydevd,
    /// PyDev with IntelliJ/PyCharm modifications.
    #[strum(serialize = "pydevd-pycharm")]
    PydevdPycharm,
}

impl Mode {
    /// Parse a mode name, rejecting anything but the supported backends.
    pub fn parse(name: &str) -> Result<Self, Error> {
        Mode::from_str(name).map_err(|_| Error::UnknownMode(name.to_string(), Mode::VARIANTS))
    }

    /// Python module that starts the backend.
    pub fn module(self) -> &'static str {
        match self {
            Mode::Debugpy => "debugpy",
            Mode::Ptvsd => "ptvsd",
            Mode::Pydevd | Mode::PydevdPycharm => "pydevd",
        }
    }

    /// True for backends that accept only a file (`--file`) as a debuggee.
    pub fn is_pydevd(self) -> bool {
        matches!(self, Mode::Pydevd | Mode::PydevdPycharm)
    }

    /// Location of the backend library for the given interpreter version under the helpers root.
    /// ptvsd and debugpy share one tree, the pydevd flavours are kept apart.
    pub fn library_path(self, root: &Path, version: PythonVersion) -> PathBuf {
        let python = format!("python{}.{}", version.major, version.minor);
        let python_root = root.join("python");
        let tree = match self {
            Mode::Debugpy | Mode::Ptvsd => python_root,
            Mode::Pydevd | Mode::PydevdPycharm => {
                let flavour: &'static str = self.into();
                python_root.join(flavour).join(&python)
            }
        };
        tree.join("lib").join(python).join("site-packages")
    }
}
