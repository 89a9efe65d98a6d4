//! Exchange report sink
//!
//! The shard server emits one exchange report per transfer attempt but has
//! no opinion on where reports go (the bridge API is an external
//! collaborator, out of scope here); callers plug in a sink.

use async_trait::async_trait;
use shardnet_core::ExchangeReport;

#[async_trait]
pub trait ExchangeSink: Send + Sync {
    async fn submit(&self, report: ExchangeReport);
}

/// Discards every report; useful for tests and standalone farmer setups
/// that don't report to a bridge.
pub struct NullExchangeSink;

#[async_trait]
impl ExchangeSink for NullExchangeSink {
    async fn submit(&self, _report: ExchangeReport) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_sink_accepts_reports() {
        let sink = NullExchangeSink;
        let report = ExchangeReport::start([0u8; 32], [1u8; 32], [2u8; 32], [3u8; 32], 0);
        sink.submit(report).await;
    }
}
