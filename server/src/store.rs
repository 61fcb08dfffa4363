use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rocksdb::{IteratorMode, WriteBatch, DB};
use tokio::task;
use tracing::warn;

use crate::paste::Paste;
use crate::paste_id::PasteId;

/// Adapter over the single collection of paste documents. Sole owner of
/// persisted state; request handlers and the sweeper only go through here.
#[derive(Clone)]
pub struct PasteStore {
    db: Arc<DB>,
}

impl PasteStore {
    /// Opens the store. An error here is fatal to the caller: the process
    /// must not begin serving without its database.
    pub fn open(path: &Path) -> Result<Self> {
        let db = DB::open_default(path)
            .with_context(|| format!("failed to open database at {}", path.display()))?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Persists a document under its identifier in a single put.
    pub async fn insert(&self, id: &PasteId, paste: &Paste) -> Result<()> {
        let key = id.as_bytes();
        let value = bincode::serialize(paste).context("failed to encode paste")?;
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || db.put(key, value)).await??;
        Ok(())
    }

    /// Exact-key lookup. Arbitrary untrusted identifiers are simply absent.
    pub async fn find(&self, id: &str) -> Result<Option<Paste>> {
        let key = id.as_bytes().to_vec();
        let db = Arc::clone(&self.db);
        let raw = task::spawn_blocking(move || db.get(key)).await??;

        match raw {
            Some(raw) => Ok(Some(
                bincode::deserialize(&raw).context("failed to decode stored paste")?,
            )),
            None => Ok(None),
        }
    }

    /// Deletes every document expired by `cutoff` in one batched write and
    /// returns the count removed. Documents that fail to decode are skipped,
    /// not deleted.
    pub async fn sweep_expired(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || {
            let mut batch = WriteBatch::default();
            let mut removed = 0;

            for (key, value) in db.snapshot().iterator(IteratorMode::Start) {
                match bincode::deserialize::<Paste>(&value) {
                    Ok(paste) if paste.expired_by(cutoff) => {
                        batch.delete(key);
                        removed += 1;
                    }
                    Ok(_) => {}
                    Err(e) => warn!("Skipping undecodable document: {e}"),
                }
            }

            db.write(batch).context("failed to apply cleanup batch")?;
            Ok(removed)
        })
        .await?
    }
}
