use thiserror::Error;

/// Shared error taxonomy for area-statistics operations.
///
/// Upstream transport failures (`UpstreamUnavailable`, `UpstreamRejected`)
/// are propagated unchanged from the client layer; the core never retries
/// or suppresses them. An empty result set is *not* an error anywhere in
/// this taxonomy.
#[derive(Debug, Error)]
pub enum StatError {
    /// One or more area codes had a prefix absent from the entity-type key.
    /// Every offending code is listed so callers can correct their input.
    #[error("unrecognized area code(s): {}", .codes.join(", "))]
    UnknownAreaCode { codes: Vec<String> },

    /// The catalog search for a census table title returned no results.
    #[error("no census table found matching title '{title}'")]
    TableNotFound { title: String },

    /// Output mode string was not one of "n"/"count" or "p"/"percent".
    #[error("invalid output mode '{0}' (expected 'n' or 'p')")]
    InvalidOutputMode(String),

    /// Sex string was not one of "m", "f" or "t".
    #[error("invalid sex '{0}' (expected 'm', 'f' or 't')")]
    InvalidSex(String),

    /// A geography lookup input did not carry the expected four columns.
    #[error("schema mismatch in {table}: expected {expected} columns, found {found}")]
    SchemaMismatch {
        table: String,
        expected: usize,
        found: usize,
    },

    /// Expected columns entirely absent from an upstream response.
    #[error("expected column(s) missing from response: {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    /// The upstream API could not be reached.
    #[error("upstream {source_name} unavailable: {detail}")]
    UpstreamUnavailable { source_name: String, detail: String },

    /// The upstream API rejected the request.
    #[error("upstream rejected request: {reason}")]
    UpstreamRejected { reason: String },
}

pub type Result<T> = std::result::Result<T, StatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_codes_are_listed_in_order() {
        let err = StatError::UnknownAreaCode {
            codes: vec!["X99000001".to_string(), "Q11000002".to_string()],
        };
        insta::assert_snapshot!(
            err.to_string(),
            @"unrecognized area code(s): X99000001, Q11000002"
        );
    }

    #[test]
    fn missing_columns_message_names_each_column() {
        let err = StatError::MissingColumns {
            columns: vec!["area_code".to_string(), "value".to_string()],
        };
        insta::assert_snapshot!(
            err.to_string(),
            @"expected column(s) missing from response: area_code, value"
        );
    }
}
