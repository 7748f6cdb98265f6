use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Fake interpreter: answers a version query, otherwise prints its arguments and the
/// variables the wrappers manage, then exits with `$FAKE_STATUS`.
const FAKE_INTERPRETER: &str = r#"#!/bin/sh
if [ "$1" = "-V" ]; then
    echo "Python 3.8.1"
    exit 0
fi
echo "args: $*"
echo "NODE_DEBUG=$NODE_DEBUG"
echo "NODE_OPTIONS=$NODE_OPTIONS"
echo "PYTHONPATH=$PYTHONPATH"
exit ${FAKE_STATUS:-0}
"#;

pub fn write_executable(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

/// A scratch installation: `wrapper/` holds the wrapper under the interpreter name, `real/`
/// holds a fake interpreter of the same name.
pub struct Sandbox {
    pub root: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn wrapper_dir(&self) -> PathBuf {
        self.path().join("wrapper")
    }

    pub fn real_dir(&self) -> PathBuf {
        self.path().join("real")
    }

    /// Install a fake interpreter named `name` into `real/`.
    pub fn install_interpreter(&self, name: &str) -> PathBuf {
        let path = self.real_dir().join(name);
        write_executable(&path, FAKE_INTERPRETER);
        path
    }

    /// Link the wrapper binary as `wrapper/<name>`.
    pub fn install_wrapper(&self, binary: &str, name: &str) -> PathBuf {
        fs::create_dir_all(self.wrapper_dir()).unwrap();
        let path = self.wrapper_dir().join(name);
        std::os::unix::fs::symlink(binary, &path).unwrap();
        path
    }

    /// `PATH` that finds the wrapper first and the fake interpreter second.
    pub fn path_var(&self) -> String {
        std::env::join_paths([self.wrapper_dir(), self.real_dir()])
            .unwrap()
            .to_string_lossy()
            .to_string()
    }

    pub fn command(&self, program: &Path) -> Command {
        let mut cmd = Command::new(program);
        cmd.env_clear()
            .env("PATH", self.path_var())
            .current_dir(self.path());
        cmd
    }
}

/// Lines printed by the fake interpreter.
pub struct Report {
    pub args: String,
    pub node_debug: String,
    pub node_options: String,
    pub pythonpath: String,
    pub status: Option<i32>,
}

impl From<Output> for Report {
    fn from(output: Output) -> Self {
        let stdout = String::from_utf8(output.stdout).unwrap();
        let field = |prefix: &str| {
            stdout
                .lines()
                .find_map(|line| line.strip_prefix(prefix))
                .unwrap_or_else(|| panic!("no {prefix:?} in {stdout:?}"))
                .to_string()
        };
        Self {
            args: field("args: "),
            node_debug: field("NODE_DEBUG="),
            node_options: field("NODE_OPTIONS="),
            pythonpath: field("PYTHONPATH="),
            status: output.status.code(),
        }
    }
}
