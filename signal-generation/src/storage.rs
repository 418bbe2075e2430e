// Signal Storage
// Keeps the pending signal and the history of past signals, in memory or in a flat JSON file

use chrono::{DateTime, Utc};
use common::{Resolution, Signal, SignalRecord, SignalResult, SignalStore};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The pending signal is the most recent record that has no resolution
fn pending_of(records: &[SignalRecord]) -> Option<&SignalRecord> {
    records.last().filter(|record| record.is_pending())
}

/// Mark every open record as superseded and append `signal` as the new pending one
fn push_pending(records: &mut Vec<SignalRecord>, signal: &Signal, at: DateTime<Utc>) -> Option<Signal> {
    let mut superseded = None;
    for record in records.iter_mut().filter(|r| r.is_pending()) {
        record.close(Resolution::Superseded, None, at);
        superseded = Some(record.signal.clone());
    }

    records.push(SignalRecord::open(signal.clone()));
    superseded
}

fn close_pending(
    records: &mut [SignalRecord],
    resolution: Resolution,
    exit_price: Option<Decimal>,
    at: DateTime<Utc>,
) -> Option<SignalRecord> {
    let record = records.last_mut().filter(|record| record.is_pending())?;
    record.close(resolution, exit_price, at);
    Some(record.clone())
}

/// In-memory signal storage, lost on restart
pub struct InMemoryStore {
    records: tokio::sync::RwLock<Vec<SignalRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            records: tokio::sync::RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SignalStore for InMemoryStore {
    async fn pending(&self) -> SignalResult<Option<Signal>> {
        let records = self.records.read().await;
        Ok(pending_of(&records).map(|record| record.signal.clone()))
    }

    async fn replace_pending(&self, signal: &Signal, at: DateTime<Utc>) -> SignalResult<Option<Signal>> {
        let mut records = self.records.write().await;
        Ok(push_pending(&mut records, signal, at))
    }

    async fn resolve_pending(
        &self,
        resolution: Resolution,
        exit_price: Option<Decimal>,
        at: DateTime<Utc>,
    ) -> SignalResult<Option<SignalRecord>> {
        let mut records = self.records.write().await;
        Ok(close_pending(&mut records, resolution, exit_price, at))
    }

    async fn history(&self) -> SignalResult<Vec<SignalRecord>> {
        Ok(self.records.read().await.clone())
    }
}

/// Signal history kept as a pretty-printed JSON array in a single file.
///
/// The whole file is rewritten on every change through a temporary sibling
/// file, so a crash mid-write leaves the previous history in place.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> SignalResult<Vec<SignalRecord>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No signal history at {}, starting empty", self.path.display());
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, records: &[SignalRecord]) -> SignalResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_vec_pretty(records)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl SignalStore for FileStore {
    async fn pending(&self) -> SignalResult<Option<Signal>> {
        let records = self.load().await?;
        Ok(pending_of(&records).map(|record| record.signal.clone()))
    }

    async fn replace_pending(&self, signal: &Signal, at: DateTime<Utc>) -> SignalResult<Option<Signal>> {
        let mut records = self.load().await?;
        let superseded = push_pending(&mut records, signal, at);
        self.save(&records).await?;

        info!("Stored signal {} ({} records in {})", signal.id, records.len(), self.path.display());
        Ok(superseded)
    }

    async fn resolve_pending(
        &self,
        resolution: Resolution,
        exit_price: Option<Decimal>,
        at: DateTime<Utc>,
    ) -> SignalResult<Option<SignalRecord>> {
        let mut records = self.load().await?;
        let closed = close_pending(&mut records, resolution, exit_price, at);
        if closed.is_some() {
            self.save(&records).await?;
        }
        Ok(closed)
    }

    async fn history(&self) -> SignalResult<Vec<SignalRecord>> {
        self.load().await
    }
}
