use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DdpError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("No DDPMS map stream found in {0}")]
    MissingMapStream(PathBuf),
}

pub type DdpResult<T> = Result<T, DdpError>;
