//! Error types for the editor

use blockwork_model::{DocumentError, TreeError};
use blockwork_schema::{InsertRejection, ValidationErrors};
use thiserror::Error;

/// Why an action could not be applied
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActionError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("Insert rejected: {0}")]
    Rejected(#[from] InsertRejection),

    #[error("Invalid data for block {block_id}: {errors}")]
    Validation {
        block_id: String,
        errors: ValidationErrors,
    },
}

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Action error: {0}")]
    Action(#[from] ActionError),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),
}
