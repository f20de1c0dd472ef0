use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Db(String),
}

impl ModelError {
    /// Map a unique-constraint violation to `Conflict`, anything else to `Db`.
    pub fn from_db(e: DbErr, conflict_msg: &str) -> Self {
        match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => ModelError::Conflict(conflict_msg.to_string()),
            _ => ModelError::Db(e.to_string()),
        }
    }
}

pub(crate) fn db_err(e: DbErr) -> ModelError {
    ModelError::Db(e.to_string())
}

pub(crate) fn required(field: &str, value: &str) -> Result<(), ModelError> {
    if value.trim().is_empty() {
        return Err(ModelError::Validation(format!("{field} is required")));
    }
    Ok(())
}

pub(crate) fn required_value(field: &str, value: &sea_orm::ActiveValue<String>) -> Result<(), ModelError> {
    match value.try_as_ref() {
        Some(v) => required(field, v),
        None => Err(ModelError::Validation(format!("{field} is required"))),
    }
}
