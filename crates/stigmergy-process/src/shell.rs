//! OS-shell wrapping for spawned CLIs (spec §4.D.1: "with OS-shell wrapping
//! (to match how the CLI behaves for users)").
//!
//! Many AI CLIs are thin wrapper scripts (nvm shims, pyenv shims, npm bin
//! stubs) that only resolve correctly when invoked the way an interactive
//! shell would invoke them. Rather than exec the binary directly, the
//! Supervisor builds a single shell command line and hands it to `sh -c`.

/// Single-quote an argv element for POSIX shell consumption.
pub fn shell_quote(arg: &str) -> String {
    if !arg.is_empty() && arg.bytes().all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.' | b'/' | b':' | b'@')) {
        return arg.to_string();
    }
    let escaped = arg.replace('\'', r"'\''");
    format!("'{escaped}'")
}

/// Join argv into a single shell command line, quoting each element.
pub fn build_shell_command(argv: &[String]) -> String {
    argv.iter().map(|a| shell_quote(a)).collect::<Vec<_>>().join(" ")
}
