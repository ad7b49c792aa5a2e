use crate::CellId;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cell {0:?} does not exist in this store")]
    UnknownCell(CellId),
    #[error("no cell is registered under id `{id}`")]
    UnknownId { id: String },
}

pub type Result<T> = std::result::Result<T, Error>;
