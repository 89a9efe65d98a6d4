//! shardnet renter transfer coordinator
//!
//! Everything the renter side drives that a farmer or the bridge does
//! not: farmer selection via bounded offer streams, a persisted
//! blacklist of farmers that failed a transfer, and upload/download
//! coordinators built from the per-shard transfer state machine (§4.7,
//! §9).

mod blacklist;
mod download;
mod error;
mod offer;
mod transfer;
mod upload;

pub use blacklist::{Blacklist, BlacklistStore, FileBlacklistStore, NullBlacklistStore, DEFAULT_TTL};
pub use download::{DownloadConfig, DownloadCoordinator, DownloadOutcome, DEFAULT_POINTER_WINDOW};
pub use error::{RenterError, Result};
pub use offer::{Offer, OfferError, OfferStream};
pub use transfer::{TransferMachine, TransferState};
pub use upload::{UploadConfig, UploadCoordinator, UploadOutcome, MAX_POINTER_ACQUISITIONS};
