use rusqlite::ffi;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// A UNIQUE column rejected a duplicate value.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("connection lock poisoned: {0}")]
    Poisoned(String),

    #[error(transparent)]
    Sqlite(rusqlite::Error),
}

impl DbError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DbError::UniqueViolation(_))
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(code, msg) = &err {
            if code.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE {
                let detail = msg.clone().unwrap_or_else(|| code.to_string());
                return DbError::UniqueViolation(detail);
            }
        }
        DbError::Sqlite(err)
    }
}
