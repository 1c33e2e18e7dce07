//! Metadata lookup errors.

use std::error::Error;
use std::fmt;

/// Errors from [`MetaTables`](crate::MetaTables) construction and lookups.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MetaError {
    /// An index fell outside its table.
    IndexOutOfRange {
        /// Table being read.
        table: &'static str,
        /// Index that was requested.
        index: i64,
        /// Exclusive upper bound.
        bound: usize,
    },
    /// Rows supplied to [`MetaTables::new`](crate::MetaTables::new) don't
    /// agree with each other or with the glyph counts.
    InvalidTables {
        /// What disagreed.
        reason: String,
    },
}

impl fmt::Display for MetaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfRange {
                table,
                index,
                bound,
            } => write!(
                f,
                "{table}: index should be between 0 and {bound} but got {index}"
            ),
            Self::InvalidTables { reason } => write!(f, "invalid metadata tables: {reason}"),
        }
    }
}

impl Error for MetaError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_names_table_and_bound() {
        let e = MetaError::IndexOutOfRange {
            table: "monsters",
            index: -1,
            bound: 381,
        };
        assert_eq!(
            e.to_string(),
            "monsters: index should be between 0 and 381 but got -1"
        );
    }
}
