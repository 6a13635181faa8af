use std::io;

use crate::export::{ExportError, PublishStage, TransportError};
use crate::log::LogError;
use crate::session::SessionError;
use crate::storage::StorageError;
use crate::surface::SurfaceError;
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Log(#[from] LogError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("publish failed at {stage} step: {message}")]
    Publish { stage: PublishStage, message: String },
}
