//! Node command line rewriting: find the script, strip and install `--inspect` flags.

/// Common prefix of the node debug-enable flags: `--inspect`, `--inspect=9229`,
/// `--inspect-brk`, `--inspect-brk=0.0.0.0:9229` and friends.
pub const INSPECT_PREFIX: &str = "--inspect";

/// Marker of the end of node options.
const END_OF_OPTIONS: &str = "--";

fn is_flag(arg: &str) -> bool {
    arg.starts_with('-')
}

pub fn is_inspect_flag(arg: &str) -> bool {
    arg.starts_with(INSPECT_PREFIX)
}

/// Return the position of the script, the first non-empty argument that is not an option.
pub fn script_position(args: &[String]) -> Option<usize> {
    // node options are always a single token (`--arg=option`)
    args.iter().position(|arg| !arg.is_empty() && !is_flag(arg))
}

/// Return the script that node will execute. `None` when node reads a script from stdin or
/// only options were given.
pub fn find_script(args: &[String]) -> Option<&str> {
    script_position(args).map(|pos| args[pos].as_str())
}

/// Remove all `--inspect*` node options, returning the remaining arguments and the last
/// removed flag.
///
/// Only node options are scanned: everything from the script (or `--`) onwards belongs to the
/// application and is copied untouched, even when it looks like an inspect flag.
pub fn strip_inspect_arg(args: &[String]) -> (Vec<String>, Option<String>) {
    let mut stripped = Vec::with_capacity(args.len());
    let mut inspect = None;

    for (i, arg) in args.iter().enumerate() {
        if is_inspect_flag(arg) {
            inspect = Some(arg.clone());
            continue;
        }
        if arg == END_OF_OPTIONS || arg.is_empty() || !is_flag(arg) {
            stripped.extend_from_slice(&args[i..]);
            break;
        }
        stripped.push(arg.clone());
    }

    (stripped, inspect)
}

/// Remove every `--inspect*` token of an options string such as `NODE_OPTIONS`, returning
/// the remaining tokens and the last removed flag. Unlike the command line there is no script
/// here, so no token ends the scan.
pub fn strip_inspect_options(options: &[String]) -> (Vec<String>, Option<String>) {
    let mut stripped = Vec::with_capacity(options.len());
    let mut inspect = None;

    for opt in options {
        if is_inspect_flag(opt) {
            inspect = Some(opt.clone());
        } else {
            stripped.push(opt.clone());
        }
    }

    (stripped, inspect)
}

/// Join tokens back into a `NODE_OPTIONS` value. Node only honors double quotes there, so
/// plain tokens stay bare and the rest are double-quoted with `"` and `\` escaped.
pub fn join_options<S: AsRef<str>>(options: &[S]) -> String {
    let needs_quotes = |opt: &str| {
        opt.is_empty()
            || opt
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '\\'))
    };

    options
        .iter()
        .map(|opt| {
            let opt = opt.as_ref();
            if !needs_quotes(opt) {
                return opt.to_string();
            }
            let mut quoted = String::with_capacity(opt.len() + 2);
            quoted.push('"');
            for c in opt.chars() {
                if c == '"' || c == '\\' {
                    quoted.push('\\');
                }
                quoted.push(c);
            }
            quoted.push('"');
            quoted
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Position where node options end: the script or the `--` marker.
///
/// The `--` marker counts as an end too: node reads the token after it as the script.
fn options_end(args: &[String]) -> Option<usize> {
    args.iter()
        .position(|arg| arg == END_OF_OPTIONS || (!arg.is_empty() && !is_flag(arg)))
}

/// Insert a node option right before the script, or at the end when there is no script.
pub fn install_node_arg(args: &mut Vec<String>, node_arg: &str) {
    match options_end(args) {
        Some(pos) => args.insert(pos, node_arg.to_string()),
        None => args.push(node_arg.to_string()),
    }
}

/// Insert `arg` right after the first script whose path contains `pattern`. Returns false if
/// there is no such script.
pub fn install_after_script(args: &mut Vec<String>, pattern: &str, arg: &str) -> bool {
    let found = args
        .iter()
        .position(|a| !a.is_empty() && !is_flag(a) && a.contains(pattern));
    match found {
        Some(pos) => {
            args.insert(pos + 1, arg.to_string());
            true
        }
        None => false,
    }
}
