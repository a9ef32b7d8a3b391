// ABOUTME: Positional %1/%2 substitution for the local and remote ssh command line templates
// ABOUTME: Holds the built-in defaults and the template pair used to render a connection command

use serde::{Deserialize, Serialize};

/// `-t` forces a tty. `|| exec $SHELL` keeps the terminal open so ssh errors stay readable.
pub const DEFAULT_LOCAL_TEMPLATE: &str = "ssh -t %1 %2 || exec $SHELL";

/// Runs `%1` in an interactive remote `$SHELL`, then execs into a fresh one.
/// `$SHELL` is quoted so it expands on the remote host. `|| true` keeps the
/// remote exit status from reaching the local shell.
pub const DEFAULT_REMOTE_TEMPLATE: &str = r#"'$SHELL -i -c "%1 ; exec $SHELL" || true'"#;

/// Script used when the query carries no trailing text.
pub const NOOP_COMMAND: &str = "true";

/// Replace `%1` with `args[0]`, `%2` with `args[1]` and so on, in one pass.
///
/// Substituted text is not rescanned. Placeholders without an argument and
/// any other `%` sequence are copied through unchanged.
pub fn render(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '%' {
            let arg = chars
                .peek()
                .and_then(|d| d.to_digit(10))
                .filter(|&n| n >= 1)
                .and_then(|n| args.get(n as usize - 1));
            if let Some(arg) = arg {
                out.push_str(arg);
                chars.next();
                continue;
            }
        }
        out.push(c);
    }

    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplatePair {
    pub local: String,
    pub remote: String,
}

impl Default for TemplatePair {
    fn default() -> Self {
        Self {
            local: DEFAULT_LOCAL_TEMPLATE.to_string(),
            remote: DEFAULT_REMOTE_TEMPLATE.to_string(),
        }
    }
}

impl TemplatePair {
    /// Full command line for `target`, running `script` remotely or the
    /// no-op command when there is none.
    pub fn command_line(&self, target: &str, script: Option<&str>) -> String {
        let remote = render(&self.remote, &[script.unwrap_or(NOOP_COMMAND)]);
        render(&self.local, &[target, &remote])
    }
}
