//! Exchange report — telemetry record of one shard transfer's outcome
//!
//! Immutable once `exchange_end` is set; posted to the bridge regardless of
//! whether the overall upload/download ultimately succeeds.

use serde::{Deserialize, Serialize};

use crate::{Id256, PublicKey};

/// Result code for a completed exchange, matching the bridge's wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ExchangeResultCode {
    Success = 1000,
    Failure = 1100,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeReport {
    pub reporter_id: PublicKey,
    pub farmer_id: PublicKey,
    pub client_id: PublicKey,
    pub data_hash: Id256,
    pub exchange_start: i64,
    pub exchange_end: Option<i64>,
    pub exchange_result_code: Option<ExchangeResultCode>,
    pub exchange_result_message: Option<String>,
}

impl ExchangeReport {
    /// Open a new report at the start of a transfer attempt.
    pub fn start(reporter_id: PublicKey, farmer_id: PublicKey, client_id: PublicKey, data_hash: Id256, now: i64) -> Self {
        Self {
            reporter_id,
            farmer_id,
            client_id,
            data_hash,
            exchange_start: now,
            exchange_end: None,
            exchange_result_code: None,
            exchange_result_message: None,
        }
    }

    /// Close the report. Once closed it must not be mutated further.
    pub fn end(&mut self, now: i64, code: ExchangeResultCode, message: impl Into<String>) {
        self.exchange_end = Some(now);
        self.exchange_result_code = Some(code);
        self.exchange_result_message = Some(message.into());
    }

    pub fn is_closed(&self) -> bool {
        self.exchange_end.is_some()
    }
}

// Encoded as its numeric wire value rather than the variant name.
use serde::de::Error as DeError;
use serde::{Deserializer, Serializer};

impl Serialize for ExchangeResultCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(*self as u16)
    }
}

impl<'de> Deserialize<'de> for ExchangeResultCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let v = u16::deserialize(deserializer)?;
        match v {
            1000 => Ok(ExchangeResultCode::Success),
            1100 => Ok(ExchangeResultCode::Failure),
            other => Err(D::Error::custom(format!("unknown exchange result code {other}"))),
        }
    }
}
