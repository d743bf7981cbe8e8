use scan_abi::{CellId, EntityHandle, ScannerId};
use thiserror::Error;

pub type SimResult<T> = Result<T, SimError>;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("scenario parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("scanner {0} is already placed")]
    DuplicateScanner(ScannerId),

    #[error("entity {0:?} is already in use")]
    DuplicateEntity(EntityHandle),

    #[error("coverage cell {0:?} belongs to more than one network")]
    DuplicateCell(CellId),
}
