use crate::validate::ValidationErrors;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An id lookup, or a strict multi-id lookup, matched fewer documents
    /// than requested.
    #[error("expected {expected} document(s) in `{collection}`, found {found}")]
    NotFound {
        collection: &'static str,
        expected: usize,
        found: usize,
    },

    /// A strict save or create was attempted on a record that failed
    /// validation. Reported before any data access.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// `last` was called without an explicit sort order.
    #[error("`last` requires an explicit sort order")]
    UnsortedLast,

    /// A sort clause string could not be parsed.
    #[error("invalid sort clause `{0}`")]
    InvalidSortClause(String),

    #[error(transparent)]
    Driver(#[from] mongodb::error::Error),
}

impl Error {
    pub(crate) fn not_found(collection: &'static str, expected: usize, found: usize) -> Self {
        Self::NotFound {
            collection,
            expected,
            found,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_collection() {
        let err = Error::not_found("users", 3, 1);
        assert_eq!(err.to_string(), "expected 3 document(s) in `users`, found 1");
    }

    #[test]
    fn unsorted_last_is_a_usage_error() {
        assert_eq!(
            Error::UnsortedLast.to_string(),
            "`last` requires an explicit sort order"
        );
    }

    #[test]
    fn invalid_sort_clause_echoes_the_token() {
        assert_eq!(
            Error::InvalidSortClause("name sideways".into()).to_string(),
            "invalid sort clause `name sideways`"
        );
    }
}
