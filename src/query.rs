// ABOUTME: Parser for launcher queries of the form [user@][host-prefix] [trailing text]
// ABOUTME: Hand-written single pass tokenizer plus the rule deciding when trailing text is allowed

/// Usage hint shown next to the launcher trigger.
pub const SYNOPSIS: &str = "[user@]<host> [script]";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedQuery {
    pub user: Option<String>,
    pub host_fragment: String,
    /// `Some` as soon as whitespace follows the host, even if nothing else does.
    pub trailing: Option<String>,
}

impl ParsedQuery {
    /// Trailing text is only meaningful when the launcher was explicitly
    /// triggered and a host has been typed.
    pub fn is_applicable(&self, triggered: bool) -> bool {
        self.trailing.is_none() || (triggered && !self.host_fragment.is_empty())
    }

    /// `user@host` when a user was given, otherwise the bare host.
    pub fn target_for(&self, host: &str) -> String {
        match &self.user {
            Some(user) => format!("{user}@{host}"),
            None => host.to_string(),
        }
    }

    /// Trailing text with the empty case folded into `None`.
    pub fn script(&self) -> Option<&str> {
        self.trailing.as_deref().filter(|s| !s.is_empty())
    }
}

/// Parse a raw query. Returns `None` only when the input cannot be tokenized,
/// e.g. a host fragment followed directly by a character outside `[\w.-]`.
pub fn parse(raw: &str) -> Option<ParsedQuery> {
    let mut rest = raw;

    let user = match split_user(rest) {
        Some((user, after)) => {
            rest = after;
            Some(user.to_string())
        }
        None => None,
    };

    rest = rest.strip_prefix('[').unwrap_or(rest);
    let host_len = rest
        .find(|c: char| !is_host_char(c))
        .unwrap_or(rest.len());
    let host_fragment = rest[..host_len].to_string();
    rest = &rest[host_len..];
    rest = rest.strip_prefix(']').unwrap_or(rest);

    let trailing = if rest.is_empty() {
        None
    } else {
        let text = rest.trim_start_matches([' ', '\t']);
        if text.len() == rest.len() || text.contains('\n') {
            return None;
        }
        Some(text.to_string())
    };

    Some(ParsedQuery {
        user,
        host_fragment,
        trailing,
    })
}

fn split_user(input: &str) -> Option<(&str, &str)> {
    let end = input.find(|c: char| !is_word_char(c))?;
    if end == 0 {
        return None;
    }
    input[end..]
        .strip_prefix('@')
        .map(|after| (&input[..end], after))
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_host_char(c: char) -> bool {
    is_word_char(c) || c == '.' || c == '-'
}
