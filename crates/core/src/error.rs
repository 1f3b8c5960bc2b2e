use thiserror::Error;

use crate::model::{BlockError, FormError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Block(#[from] BlockError),
    #[error(transparent)]
    Form(#[from] FormError),
}
