use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("audit count must be at least 1")]
    EmptyChallengeSet,
    #[error("no matching leaf for the given challenge and shard")]
    ProofConstruction,
    #[error("proof is malformed: {0}")]
    MalformedProof(String),
}

pub type Result<T> = std::result::Result<T, AuditError>;
