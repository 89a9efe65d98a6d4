//! Shard muxer
//!
//! Assembles ordered remote shard streams, added over time, into a single
//! contiguous byte buffer, verifying each input's hash as it completes.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use shardnet_core::ShardHash;
use tokio::sync::Notify;

use crate::error::{Result, ShardIoError};

const DEFAULT_SOURCE_DRAIN_WAIT: Duration = Duration::from_secs(8);
const DEFAULT_SOURCE_IDLE_WAIT: Duration = Duration::from_millis(50);

/// One remote shard's byte stream, as seen by the muxer.
#[async_trait]
pub trait ShardSource: Send {
    /// Returns the next chunk, `Ok(None)` once the source has ended, or
    /// an error if the underlying transport failed.
    async fn next_chunk(&mut self) -> std::io::Result<Option<Bytes>>;
}

/// An in-memory shard source, useful for tests and for sources already
/// fully buffered (e.g. retried after a prior failed transfer).
pub struct BufferedSource {
    remaining: Option<Bytes>,
}

impl BufferedSource {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            remaining: Some(data.into()),
        }
    }
}

#[async_trait]
impl ShardSource for BufferedSource {
    async fn next_chunk(&mut self) -> std::io::Result<Option<Bytes>> {
        Ok(self.remaining.take())
    }
}

struct SharedState {
    queue: std::collections::VecDeque<(ShardHash, Box<dyn ShardSource>)>,
    added_count: usize,
}

struct Shared {
    shards: usize,
    length: u64,
    notify: Notify,
    state: Mutex<SharedState>,
}

/// Handle used by the caller adding pointer-backed sources as they are
/// resolved, concurrently with the muxer draining them.
#[derive(Clone)]
pub struct MuxerHandle {
    shared: std::sync::Arc<Shared>,
}

impl MuxerHandle {
    /// Fails if every declared shard already has a source added.
    pub fn add_input_source(&self, hash: ShardHash, source: Box<dyn ShardSource>) -> Result<()> {
        let mut state = self.shared.state.lock().expect("muxer state poisoned");
        if state.added_count >= self.shared.shards {
            return Err(ShardIoError::TooManySources);
        }
        state.queue.push_back((hash, source));
        state.added_count += 1;
        drop(state);
        self.shared.notify.notify_one();
        Ok(())
    }
}

pub struct ShardMuxer {
    shared: std::sync::Arc<Shared>,
    source_drain_wait: Duration,
}

impl ShardMuxer {
    pub fn new(shards: usize, length: u64) -> (Self, MuxerHandle) {
        let shared = std::sync::Arc::new(Shared {
            shards,
            length,
            notify: Notify::new(),
            state: Mutex::new(SharedState {
                queue: std::collections::VecDeque::new(),
                added_count: 0,
            }),
        });
        (
            Self {
                shared: shared.clone(),
                source_drain_wait: DEFAULT_SOURCE_DRAIN_WAIT,
            },
            MuxerHandle { shared },
        )
    }

    pub fn with_source_drain_wait(mut self, wait: Duration) -> Self {
        self.source_drain_wait = wait;
        self
    }

    /// Drain all input sources in FIFO addition order, verifying each
    /// one's bytes against its declared hash, and return the assembled
    /// output once `length` bytes have been emitted.
    pub async fn read_all(&self) -> Result<Bytes> {
        let mut out = BytesMut::with_capacity(self.shared.length as usize);
        loop {
            if out.len() as u64 >= self.shared.length {
                break;
            }
            let Some((hash, mut source)) = self.pop_or_wait().await? else {
                break;
            };

            let mut shard_buf = BytesMut::new();
            loop {
                match source.next_chunk().await {
                    Ok(Some(chunk)) => {
                        let projected = out.len() as u64 + shard_buf.len() as u64 + chunk.len() as u64;
                        if projected > self.shared.length {
                            return Err(ShardIoError::InputLengthExceeded);
                        }
                        shard_buf.extend_from_slice(&chunk);
                    }
                    Ok(None) => break,
                    Err(e) => return Err(ShardIoError::DownloadError(e.to_string())),
                }
            }

            let computed = shardnet_crypto::rmd160_sha256(&shard_buf);
            if computed != hash {
                return Err(ShardIoError::ShardIntegrity);
            }
            out.extend_from_slice(&shard_buf);
        }
        Ok(out.freeze())
    }

    async fn pop_or_wait(&self) -> Result<Option<(ShardHash, Box<dyn ShardSource>)>> {
        loop {
            {
                let mut state = self.shared.state.lock().expect("muxer state poisoned");
                if let Some(item) = state.queue.pop_front() {
                    return Ok(Some(item));
                }
                if state.added_count >= self.shared.shards {
                    return Ok(None);
                }
            }
            // Head is drained but the next source hasn't arrived yet;
            // wait up to source_drain_wait before giving up.
            let notified = self.shared.notify.notified();
            if tokio::time::timeout(self.source_drain_wait, notified).await.is_err() {
                return Err(ShardIoError::UnexpectedEndOfSource);
            }
        }
    }
}
