//! Remote script blocks and shell quoting.
//!
//! A [`ScriptBlock`] is a self-contained unit sent to a remote `bash -s`.
//! Every block starts with `set -uo pipefail`; statements that must succeed
//! carry an explicit `|| exit <code>` so the first failure aborts the rest of
//! the block with a status the caller can map back to a typed error.

/// Header prepended to every block.
pub const SCRIPT_HEADER: &str = "set -uo pipefail\n";

/// A named multi-line script executed in one remote shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptBlock {
    name: &'static str,
    body: String,
}

impl ScriptBlock {
    #[must_use]
    pub fn new(name: &'static str, body: impl Into<String>) -> Self {
        Self {
            name,
            body: body.into(),
        }
    }

    /// Short label used in logs and timeout messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Full script text, header included.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(SCRIPT_HEADER.len() + self.body.len() + 1);
        out.push_str(SCRIPT_HEADER);
        out.push_str(&self.body);
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out
    }
}

/// Quote `value` for POSIX shells using single quotes.
#[must_use]
pub fn shell_quote(value: &str) -> String {
    if !value.is_empty()
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"@%+=:,./_-".contains(&b))
    {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', r"'\''"))
}
