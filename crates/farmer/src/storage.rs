//! Shard storage backends
//!
//! The farmer depends only on this trait for persisting shard bytes; the
//! bridge's actual storage medium (disk, block store, ...) is external to
//! the core per spec, so two concrete, testable implementations are
//! provided here.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use shardnet_core::ShardHash;

#[async_trait]
pub trait ShardStorage: Send + Sync {
    async fn exists(&self, hash: &ShardHash) -> bool;
    async fn available_space(&self) -> std::io::Result<u64>;
    async fn write_shard(&self, hash: &ShardHash, data: &[u8]) -> std::io::Result<()>;
    async fn read_shard(&self, hash: &ShardHash) -> std::io::Result<Vec<u8>>;
    async fn delete_shard(&self, hash: &ShardHash) -> std::io::Result<()>;
}

/// In-memory storage, used in tests and for ephemeral farmer setups.
pub struct MemoryShardStorage {
    shards: Mutex<HashMap<ShardHash, Vec<u8>>>,
    capacity: u64,
}

impl MemoryShardStorage {
    pub fn new(capacity: u64) -> Self {
        Self {
            shards: Mutex::new(HashMap::new()),
            capacity,
        }
    }

    fn used(&self) -> u64 {
        self.shards.lock().expect("storage poisoned").values().map(|v| v.len() as u64).sum()
    }
}

#[async_trait]
impl ShardStorage for MemoryShardStorage {
    async fn exists(&self, hash: &ShardHash) -> bool {
        self.shards.lock().expect("storage poisoned").contains_key(hash)
    }

    async fn available_space(&self) -> std::io::Result<u64> {
        Ok(self.capacity.saturating_sub(self.used()))
    }

    async fn write_shard(&self, hash: &ShardHash, data: &[u8]) -> std::io::Result<()> {
        self.shards.lock().expect("storage poisoned").insert(*hash, data.to_vec());
        Ok(())
    }

    async fn read_shard(&self, hash: &ShardHash) -> std::io::Result<Vec<u8>> {
        self.shards
            .lock()
            .expect("storage poisoned")
            .get(hash)
            .cloned()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "shard not found"))
    }

    async fn delete_shard(&self, hash: &ShardHash) -> std::io::Result<()> {
        self.shards.lock().expect("storage poisoned").remove(hash);
        Ok(())
    }
}

/// One file per shard, named by hex-encoded hash, under `root`.
pub struct FilesystemShardStorage {
    root: PathBuf,
    capacity: u64,
}

impl FilesystemShardStorage {
    pub fn new(root: PathBuf, capacity: u64) -> std::io::Result<Self> {
        std::fs::create_dir_all(&root)?;
        Ok(Self { root, capacity })
    }

    fn path_for(&self, hash: &ShardHash) -> PathBuf {
        self.root.join(hex::encode(hash))
    }

    fn used(&self) -> std::io::Result<u64> {
        let mut total = 0u64;
        for entry in std::fs::read_dir(&self.root)? {
            total += entry?.metadata()?.len();
        }
        Ok(total)
    }
}

#[async_trait]
impl ShardStorage for FilesystemShardStorage {
    async fn exists(&self, hash: &ShardHash) -> bool {
        self.path_for(hash).exists()
    }

    async fn available_space(&self) -> std::io::Result<u64> {
        Ok(self.capacity.saturating_sub(self.used()?))
    }

    async fn write_shard(&self, hash: &ShardHash, data: &[u8]) -> std::io::Result<()> {
        tokio::fs::write(self.path_for(hash), data).await
    }

    async fn read_shard(&self, hash: &ShardHash) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(self.path_for(hash)).await
    }

    async fn delete_shard(&self, hash: &ShardHash) -> std::io::Result<()> {
        match tokio::fs::remove_file(self.path_for(hash)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}
