use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenterError {
    #[error("bridge error: {0}")]
    Bridge(#[from] shardnet_bridge::BridgeError),

    #[error("shard io error: {0}")]
    ShardIo(#[from] shardnet_shardio::ShardIoError),

    #[error("audit error: {0}")]
    Audit(#[from] shardnet_audit::AuditError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("farmer returned a contact the renter could not parse")]
    BadFarmerContact,

    #[error("transfer to {farmer} failed after exhausting retries: {reason}")]
    TransferFailed { farmer: String, reason: String },

    #[error("upload was cancelled")]
    Cancelled,

    #[error("slice of pointers was empty before the declared shard count was reached")]
    PointerSliceExhausted,
}

pub type Result<T> = std::result::Result<T, RenterError>;
