use thiserror::Error;

/// Failures the core reports to its caller. None of them ends the process:
/// each one is scoped to a single row, category, profile or external call.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SkinWizError {
    #[error("malformed row {row} in {table}: {reason}")]
    MalformedRow {
        table: &'static str,
        row: usize,
        reason: String,
    },

    #[error("unrecognized product category: {0}")]
    UnknownCategory(String),

    #[error("upstream fetch failed: {0}")]
    UpstreamFetch(String),

    #[error("invalid profile: {0}")]
    InvalidProfile(String),
}

impl SkinWizError {
    pub fn malformed(table: &'static str, row: usize, reason: impl Into<String>) -> Self {
        SkinWizError::MalformedRow {
            table,
            row,
            reason: reason.into(),
        }
    }
}
