use thiserror::Error;

/// Unified error type for database operations that application code can handle
#[derive(Error, Debug)]
pub enum DbError {
    /// Entity not found by the given identifier
    #[error("Entity not found")]
    NotFound,

    /// Unique constraint violation
    #[error("Unique constraint violation")]
    UniqueViolation {
        /// Column(s) named by the violated constraint, e.g. "email"
        constraint: Option<String>,
        table: Option<String>,
        message: String,
    },

    /// Foreign key constraint violation
    #[error("Foreign key constraint violation")]
    ForeignKeyViolation { message: String },

    /// Check constraint violation
    #[error("Check constraint violation")]
    CheckViolation { constraint: Option<String>, message: String },

    /// Catch-all for non-recoverable errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convert from sqlx::Error using proper sqlx error categorization
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => DbError::NotFound,
            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                if db_err.is_unique_violation() {
                    let (table, constraint) = match extract_constraint_target(&message) {
                        Some((table, column)) => (Some(table), Some(column)),
                        None => (db_err.table().map(|s| s.to_string()), db_err.constraint().map(|s| s.to_string())),
                    };
                    DbError::UniqueViolation {
                        constraint,
                        table,
                        message,
                    }
                } else if db_err.is_foreign_key_violation() {
                    DbError::ForeignKeyViolation { message }
                } else if db_err.is_check_violation() {
                    DbError::CheckViolation {
                        constraint: message.split_once("failed: ").map(|(_, c)| c.to_string()),
                        message,
                    }
                } else {
                    // All other database errors are non-recoverable - convert to anyhow
                    DbError::Other(anyhow::Error::from(err))
                }
            }
            _ => DbError::Other(anyhow::Error::from(err)),
        }
    }
}

/// Extract `(table, column)` from a SQLite constraint message.
///
/// SQLite does not report constraint names through the driver; the target only appears in the
/// message text, e.g. "UNIQUE constraint failed: users.email". For composite keys the first
/// column is returned.
fn extract_constraint_target(message: &str) -> Option<(String, String)> {
    let (_, target) = message.split_once("failed: ")?;
    let first = target.split(',').next()?.trim();
    let (table, column) = first.split_once('.')?;
    Some((table.to_string(), column.to_string()))
}

/// Type alias for database operation results
pub type Result<T> = std::result::Result<T, DbError>;
