use mongodb::bson;
use mongodb::error::{ErrorKind, WriteFailure};
use thiserror::Error;

/// MongoDB server code for a unique index violation
pub const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Mongo error: {0}")]
    MongoError(mongodb::error::Error),

    /// A unique index rejected the write. Carries the server message
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Failed to serialize document: {0}")]
    FailedToSerializeDocument(String),

    #[error("Failed to deserialize document: {0}")]
    FailedToDeserializeDocument(String),

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// A conditional update matched nothing because the row is not in the expected state
    #[error("State conflict: {0}")]
    StateConflict(String),

    #[error("Update failed: {0}")]
    UpdateFailed(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl DatabaseError {
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, DatabaseError::DuplicateKey(_))
    }
}

impl From<mongodb::error::Error> for DatabaseError {
    fn from(error: mongodb::error::Error) -> Self {
        // find_one_and_update reports index violations as command errors, writes as write errors
        let duplicate = match error.kind.as_ref() {
            ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY_CODE => Some(e.message.clone()),
            ErrorKind::Command(e) if e.code == DUPLICATE_KEY_CODE => Some(e.message.clone()),
            _ => None,
        };
        match duplicate {
            Some(message) => DatabaseError::DuplicateKey(message),
            None => DatabaseError::MongoError(error),
        }
    }
}

impl From<bson::ser::Error> for DatabaseError {
    fn from(error: bson::ser::Error) -> Self {
        DatabaseError::FailedToSerializeDocument(error.to_string())
    }
}

impl From<bson::de::Error> for DatabaseError {
    fn from(error: bson::de::Error) -> Self {
        DatabaseError::FailedToDeserializeDocument(error.to_string())
    }
}
