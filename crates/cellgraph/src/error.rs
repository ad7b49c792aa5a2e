pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid graph configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Model(#[from] cellgraph_model::Error),
}
