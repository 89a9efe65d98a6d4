//! Blacklist
//!
//! A time-bounded set of farmer identities excluded from offer
//! selection. Reaped lazily on read rather than with a background timer:
//! every `contains`/`snapshot` call first evicts entries older than
//! `ttl`. Persisted as a JSON object `{ nodeId: addedAtMillis }`
//! (§6) via the `BlacklistStore` trait; the core depends only on
//! `get`/`put` of the whole map as a blob.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use shardnet_core::PublicKey;

pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[async_trait]
pub trait BlacklistStore: Send + Sync {
    async fn load(&self) -> std::io::Result<HashMap<String, i64>>;
    async fn save(&self, entries: &HashMap<String, i64>) -> std::io::Result<()>;
}

/// A `BlacklistStore` that discards writes and starts empty, useful for
/// tests and renters that don't persist across restarts.
pub struct NullBlacklistStore;

#[async_trait]
impl BlacklistStore for NullBlacklistStore {
    async fn load(&self) -> std::io::Result<HashMap<String, i64>> {
        Ok(HashMap::new())
    }
    async fn save(&self, _entries: &HashMap<String, i64>) -> std::io::Result<()> {
        Ok(())
    }
}

/// A JSON-file-backed store rooted at `<dir>/.blacklist`, matching the
/// persisted-state shape in §6.
pub struct FileBlacklistStore {
    path: std::path::PathBuf,
}

impl FileBlacklistStore {
    pub fn new(dir: impl Into<std::path::PathBuf>) -> Self {
        Self { path: dir.into().join(".blacklist") }
    }
}

#[async_trait]
impl BlacklistStore for FileBlacklistStore {
    async fn load(&self) -> std::io::Result<HashMap<String, i64>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes).unwrap_or_default()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e),
        }
    }

    async fn save(&self, entries: &HashMap<String, i64>) -> std::io::Result<()> {
        let bytes = serde_json::to_vec(entries).expect("blacklist entries always serialize");
        tokio::fs::write(&self.path, bytes).await
    }
}

/// In-memory blacklist, mutated only by the transfer coordinator and
/// read by the pointer-request path (one writer, many readers per §5).
pub struct Blacklist {
    entries: Mutex<HashMap<PublicKey, i64>>,
    ttl_millis: i64,
}

impl Blacklist {
    pub fn new() -> Self {
        Self { entries: Mutex::new(HashMap::new()), ttl_millis: DEFAULT_TTL.as_millis() as i64 }
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self { entries: Mutex::new(HashMap::new()), ttl_millis: ttl.as_millis() as i64 }
    }

    /// Load persisted entries from `store` into memory.
    pub async fn load(store: &dyn BlacklistStore, ttl: Duration) -> std::io::Result<Self> {
        let raw = store.load().await?;
        let mut entries = HashMap::with_capacity(raw.len());
        for (node_id, added_at) in raw {
            if let Ok(bytes) = hex::decode(&node_id) {
                if let Ok(id) = <[u8; 32]>::try_from(bytes) {
                    entries.insert(id, added_at);
                }
            }
        }
        Ok(Self { entries: Mutex::new(entries), ttl_millis: ttl.as_millis() as i64 })
    }

    pub async fn persist(&self, store: &dyn BlacklistStore) -> std::io::Result<()> {
        let raw: HashMap<String, i64> =
            self.entries.lock().expect("blacklist poisoned").iter().map(|(id, ts)| (hex::encode(id), *ts)).collect();
        store.save(&raw).await
    }

    /// Add `node_id` to the blacklist, timestamped `now` (unix millis).
    pub fn add(&self, node_id: PublicKey, now: i64) {
        self.entries.lock().expect("blacklist poisoned").insert(node_id, now);
    }

    /// Reap entries older than `ttl` and report whether `node_id` is
    /// still present afterward.
    pub fn contains(&self, node_id: &PublicKey, now: i64) -> bool {
        let mut entries = self.entries.lock().expect("blacklist poisoned");
        self.reap_locked(&mut entries, now);
        entries.contains_key(node_id)
    }

    /// The current (reaped) set of blacklisted node IDs, used to build
    /// the `exclude` list sent with a shard registration request.
    pub fn snapshot(&self, now: i64) -> Vec<PublicKey> {
        let mut entries = self.entries.lock().expect("blacklist poisoned");
        self.reap_locked(&mut entries, now);
        entries.keys().copied().collect()
    }

    fn reap_locked(&self, entries: &mut HashMap<PublicKey, i64>, now: i64) {
        entries.retain(|_, added_at| now - *added_at < self.ttl_millis);
    }
}

impl Default for Blacklist {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_then_contains() {
        let blacklist = Blacklist::new();
        blacklist.add([1u8; 32], 0);
        assert!(blacklist.contains(&[1u8; 32], 10));
    }

    #[test]
    fn test_reaped_after_ttl_elapses() {
        let blacklist = Blacklist::with_ttl(Duration::from_millis(100));
        blacklist.add([1u8; 32], 0);
        assert!(blacklist.contains(&[1u8; 32], 50));
        assert!(!blacklist.contains(&[1u8; 32], 200));
    }

    #[test]
    fn test_snapshot_excludes_reaped_entries() {
        let blacklist = Blacklist::with_ttl(Duration::from_millis(100));
        blacklist.add([1u8; 32], 0);
        blacklist.add([2u8; 32], 90);
        let snapshot = blacklist.snapshot(200);
        assert_eq!(snapshot, vec![[2u8; 32]]);
    }

    #[tokio::test]
    async fn test_persist_and_reload_roundtrip() {
        let dir = std::env::temp_dir().join(format!("shardnet-blacklist-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let store = FileBlacklistStore::new(&dir);

        let blacklist = Blacklist::new();
        blacklist.add([9u8; 32], 0);
        blacklist.persist(&store).await.unwrap();

        let reloaded = Blacklist::load(&store, DEFAULT_TTL).await.unwrap();
        assert!(reloaded.contains(&[9u8; 32], 0));

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn test_null_store_starts_empty() {
        let reloaded = Blacklist::load(&NullBlacklistStore, DEFAULT_TTL).await.unwrap();
        assert!(reloaded.snapshot(0).is_empty());
    }
}
