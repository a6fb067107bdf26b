use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("event seq {seq} does not follow {last}")]
    OutOfOrder { seq: u64, last: u64 },
}
