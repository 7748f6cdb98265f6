use crate::common::{write_executable, Report, Sandbox};
use crate::NODE_WRAPPER;
use dbg_wrappers::config::WrapperConfig;
use dbg_wrappers::env::Env;
use dbg_wrappers::exec::{CommandLine, ScriptedExecutor};
use dbg_wrappers::node::{self, NodeContext};
use dbg_wrappers::Error;
use serial_test::serial;
use std::path::{Path, PathBuf};

/// A sandbox with a stand-in wrapper file and a fake real node.
fn node_sandbox() -> (Sandbox, PathBuf, PathBuf) {
    let sandbox = Sandbox::new();
    let wrapper = sandbox.wrapper_dir().join("node");
    write_executable(&wrapper, "#!/bin/sh\nexit 99\n");
    let real = sandbox.install_interpreter("node");
    (sandbox, wrapper, real)
}

fn invoke(
    wrapper: &Path,
    args: &[&str],
    env: Env,
    config: &WrapperConfig,
) -> Result<CommandLine, Error> {
    let executor = ScriptedExecutor::new();
    let nc = NodeContext::new(wrapper.to_string_lossy(), args.iter().copied(), env);
    node::run(nc, config, &executor)?;
    let mut runs = executor.runs();
    assert_eq!(runs.len(), 1);
    Ok(runs.remove(0))
}

#[test]
#[serial]
fn test_mailbox_handoff() {
    let (sandbox, wrapper, real) = node_sandbox();
    let env = Env::from_iter([("PATH", sandbox.path_var())]);
    let config = WrapperConfig::default();

    // npm receives the flag and must not be debugged itself
    let npm = invoke(
        &wrapper,
        &["--inspect", "/usr/lib/node_modules/npm/bin/npm-cli.js", "run", "start"],
        env,
        &config,
    )
    .unwrap();
    assert_eq!(npm.program, real.to_string_lossy());
    assert_eq!(
        npm.args,
        vec!["/usr/lib/node_modules/npm/bin/npm-cli.js", "run", "start"]
    );
    assert_eq!(npm.env.get("NODE_DEBUG"), Some("--inspect"));

    // npm runs `node server.js` with the inherited environment
    let app = invoke(&wrapper, &["server.js"], npm.env, &config).unwrap();
    assert_eq!(app.program, real.to_string_lossy());
    assert_eq!(app.args, vec!["--inspect", "server.js"]);
    assert!(!app.env.contains("NODE_DEBUG"));
}

#[test]
#[serial]
fn test_flag_from_node_options_is_propagated() {
    let (sandbox, wrapper, _) = node_sandbox();
    let env = Env::from_iter([
        ("PATH", sandbox.path_var().as_str()),
        ("NODE_OPTIONS", "--max-old-space-size=4096 --inspect-brk=0.0.0.0:9229"),
    ]);
    let config = WrapperConfig::default();

    let tool = invoke(&wrapper, &["/app/node_modules/.bin/ts-node", "src/index.ts"], env, &config)
        .unwrap();
    assert_eq!(tool.env.get("NODE_OPTIONS"), Some("--max-old-space-size=4096"));
    assert_eq!(tool.env.get("NODE_DEBUG"), Some("--inspect-brk=0.0.0.0:9229"));

    let app = invoke(&wrapper, &["--no-warnings", "dist/index.js"], tool.env, &config).unwrap();
    assert_eq!(
        app.args,
        vec!["--no-warnings", "--inspect-brk=0.0.0.0:9229", "dist/index.js"]
    );
}

#[test]
#[serial]
fn test_supervisor_fork() {
    let (sandbox, wrapper, _) = node_sandbox();
    let env = Env::from_iter([
        ("PATH", sandbox.path_var().as_str()),
        ("NODE_DEBUG", "--inspect-brk"),
    ]);

    let nodemon = invoke(
        &wrapper,
        &["/app/node_modules/nodemon/bin/nodemon.js", "--watch", "src", "server.js"],
        env,
        &WrapperConfig::default(),
    )
    .unwrap();
    assert_eq!(
        nodemon.args,
        vec![
            "/app/node_modules/nodemon/bin/nodemon.js",
            "--inspect-brk",
            "--watch",
            "src",
            "server.js"
        ]
    );
    assert!(!nodemon.env.contains("NODE_DEBUG"));
}

#[test]
#[serial]
fn test_ancestor_flag_wins() {
    let (sandbox, wrapper, _) = node_sandbox();
    let env = Env::from_iter([
        ("PATH", sandbox.path_var().as_str()),
        ("NODE_DEBUG", "--inspect=1111"),
    ]);
    let config = WrapperConfig::default();

    let tool = invoke(
        &wrapper,
        &["--inspect=2222", "/app/node_modules/.bin/concurrently", "node app.js"],
        env,
        &config,
    )
    .unwrap();
    assert_eq!(tool.args, vec!["/app/node_modules/.bin/concurrently", "node app.js"]);
    assert_eq!(tool.env.get("NODE_DEBUG"), Some("--inspect=1111"));

    let app = invoke(&wrapper, &["--inspect=3333", "app.js"], tool.env, &config).unwrap();
    assert_eq!(app.args, vec!["--inspect=1111", "app.js"]);
}

#[test]
#[serial]
fn test_application_flags_pass_through() {
    let (sandbox, wrapper, _) = node_sandbox();
    let env = Env::from_iter([("PATH", sandbox.path_var())]);

    let app = invoke(
        &wrapper,
        &["--inspect=9230", "app.js", "--inspect"],
        env,
        &WrapperConfig::default(),
    )
    .unwrap();
    assert_eq!(app.args, vec!["--inspect=9230", "app.js", "--inspect"]);
    assert!(!app.env.contains("NODE_DEBUG"));
}

#[test]
#[serial]
fn test_allowed_node_modules() {
    let (sandbox, wrapper, _) = node_sandbox();
    let env = Env::from_iter([
        ("PATH", sandbox.path_var().as_str()),
        ("NODE_DEBUG", "--inspect"),
        ("WRAPPER_ALLOWED", "node_modules/.bin/vite"),
    ]);
    let config = WrapperConfig::from_env(&env);

    let next = invoke(&wrapper, &["/app/node_modules/.bin/next", "dev"], env.clone(), &config)
        .unwrap();
    assert_eq!(next.args, vec!["--inspect", "/app/node_modules/.bin/next", "dev"]);

    let vite = invoke(&wrapper, &["/app/node_modules/.bin/vite"], env, &config).unwrap();
    assert_eq!(vite.args, vec!["--inspect", "/app/node_modules/.bin/vite"]);
    assert!(!vite.env.contains("NODE_DEBUG"));
}

#[test]
#[serial]
fn test_disabled_wrapper_only_unwraps() {
    let (sandbox, wrapper, real) = node_sandbox();
    let env = Env::from_iter([
        ("PATH", sandbox.path_var().as_str()),
        ("WRAPPER_ENABLED", "no"),
    ]);
    let config = WrapperConfig::from_env(&env);

    let cmd = invoke(
        &wrapper,
        &["--inspect", "/app/node_modules/.bin/jest"],
        env,
        &config,
    )
    .unwrap();
    assert_eq!(cmd.program, real.to_string_lossy());
    assert_eq!(cmd.args, vec!["--inspect", "/app/node_modules/.bin/jest"]);
    assert!(!cmd.env.contains("NODE_DEBUG"));
}

#[test]
#[serial]
fn test_no_real_node() {
    let (sandbox, wrapper, _) = node_sandbox();
    let path = sandbox.wrapper_dir().to_string_lossy().to_string();
    let executor = ScriptedExecutor::new();
    let nc = NodeContext::new(
        wrapper.to_string_lossy(),
        ["app.js"],
        Env::from_iter([("PATH", path)]),
    );

    let result = node::run(nc, &WrapperConfig::default(), &executor);
    assert!(matches!(result, Err(Error::ProgramNotFound(_))));
    assert!(executor.runs().is_empty());
}

#[test]
#[serial]
fn test_relative_script_inside_node_modules() {
    let (sandbox, wrapper, _) = node_sandbox();
    let package = sandbox.path().join("node_modules").join("gulp");
    std::fs::create_dir_all(&package).unwrap();
    let env = Env::from_iter([("PATH", sandbox.path_var())]);

    let cwd = std::env::current_dir().unwrap();
    std::env::set_current_dir(&package).unwrap();
    let result = invoke(&wrapper, &["--inspect", "./bin/gulp.js"], env, &WrapperConfig::default());
    std::env::set_current_dir(cwd).unwrap();

    let gulp = result.unwrap();
    assert_eq!(gulp.args, vec!["./bin/gulp.js"]);
    assert_eq!(gulp.env.get("NODE_DEBUG"), Some("--inspect"));
}

#[test]
#[serial]
fn test_node_binary() {
    let sandbox = Sandbox::new();
    let wrapper = sandbox.install_wrapper(NODE_WRAPPER, "node");
    sandbox.install_interpreter("node");

    let output = sandbox
        .command(&wrapper)
        .args(["--inspect=9229", "/app/node_modules/npm/bin/npm-cli.js", "start"])
        .output()
        .unwrap();
    let npm = Report::from(output);
    assert_eq!(npm.status, Some(0));
    assert_eq!(npm.args, "/app/node_modules/npm/bin/npm-cli.js start");
    assert_eq!(npm.node_debug, "--inspect=9229");

    let output = sandbox
        .command(&wrapper)
        .env("NODE_DEBUG", &npm.node_debug)
        .env("FAKE_STATUS", "3")
        .args(["server.js"])
        .output()
        .unwrap();
    let app = Report::from(output);
    assert_eq!(app.status, Some(3));
    assert_eq!(app.args, "--inspect=9229 server.js");
    assert_eq!(app.node_debug, "");
    assert_eq!(app.node_options, "");
}

#[test]
#[serial]
fn test_node_binary_without_real_node() {
    let sandbox = Sandbox::new();
    let wrapper = sandbox.install_wrapper(NODE_WRAPPER, "node");

    let output = sandbox.command(&wrapper).arg("app.js").output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("could not find"), "{stderr}");
}

#[test]
#[serial]
fn test_node_binary_rewrites_node_options() {
    let sandbox = Sandbox::new();
    let wrapper = sandbox.install_wrapper(NODE_WRAPPER, "node");
    sandbox.install_interpreter("node");

    let output = sandbox
        .command(&wrapper)
        .env(
            "NODE_OPTIONS",
            "--require ./hooks.js --max-old-space-size=4096 --inspect-brk=0.0.0.0:9229",
        )
        .args(["/app/node_modules/.bin/ts-node", "src/index.ts"])
        .output()
        .unwrap();
    let tool = Report::from(output);
    assert_eq!(tool.status, Some(0));
    assert_eq!(tool.node_options, "--require ./hooks.js --max-old-space-size=4096");
    assert_eq!(tool.node_debug, "--inspect-brk=0.0.0.0:9229");
}
