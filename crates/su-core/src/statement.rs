//! Splitting a migration script into individually executed statements.
//!
//! Drivers run one statement per call, so each script is cut on a semicolon
//! immediately followed by a newline (`;\n`). This is plain text matching, not
//! SQL parsing: a `;\n` inside a string literal or a comment splits the
//! statement in two, and `;\r\n` does not split at all. Scripts must be
//! formatted with that in mind.

/// Statement delimiter inside a migration script.
pub const STATEMENT_DELIMITER: &str = ";\n";

/// One statement cut from a migration script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// 1-based position within the script
    pub ordinal: usize,

    /// Statement text, exactly as written before its delimiter
    pub sql: String,
}

/// Split `content` into statements on [`STATEMENT_DELIMITER`].
///
/// Empty and whitespace-only fragments, such as the tail after the final
/// delimiter, are dropped. Everything else keeps its original text.
pub fn split_statements(content: &str) -> Vec<Statement> {
    content
        .split(STATEMENT_DELIMITER)
        .filter(|fragment| !fragment.trim().is_empty())
        .enumerate()
        .map(|(i, fragment)| Statement {
            ordinal: i + 1,
            sql: fragment.to_string(),
        })
        .collect()
}

#[cfg(test)]
#[path = "statement_test.rs"]
mod tests;
