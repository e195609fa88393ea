//! In-process row store.
//!
//! Used by tests and when no database is configured. Rows live in a
//! `BTreeMap` per partition, so queries come back ordered by row key like they
//! do from a real table service.

use super::{Filter, Row, RowStore};
use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

type Partitions = BTreeMap<String, BTreeMap<String, Row>>;

#[derive(Debug, Default)]
pub struct MemoryRowStore {
    partitions: RwLock<Partitions>,
    /// When set, every call fails with `StoreError::Unavailable`.
    unavailable: AtomicBool,
}

impl MemoryRowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an unreachable backend.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of rows across all partitions.
    pub fn len(&self) -> usize {
        self.partitions
            .read()
            .map(|p| p.values().map(BTreeMap::len).sum())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "memory store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Partitions>, StoreError> {
        self.check_available()?;
        self.partitions
            .read()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Partitions>, StoreError> {
        self.check_available()?;
        self.partitions
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

fn not_found(partition_key: &str, row_key: &str) -> StoreError {
    StoreError::NotFound {
        partition_key: partition_key.to_string(),
        row_key: row_key.to_string(),
    }
}

#[async_trait]
impl RowStore for MemoryRowStore {
    async fn put(&self, row: Row) -> Result<(), StoreError> {
        let mut partitions = self.write()?;
        partitions
            .entry(row.partition_key.clone())
            .or_default()
            .insert(row.row_key.clone(), row);
        Ok(())
    }

    async fn get(&self, partition_key: &str, row_key: &str) -> Result<Row, StoreError> {
        let partitions = self.read()?;
        partitions
            .get(partition_key)
            .and_then(|rows| rows.get(row_key))
            .cloned()
            .ok_or_else(|| not_found(partition_key, row_key))
    }

    async fn delete(&self, partition_key: &str, row_key: &str) -> Result<(), StoreError> {
        let mut partitions = self.write()?;
        partitions
            .get_mut(partition_key)
            .and_then(|rows| rows.remove(row_key))
            .map(|_| ())
            .ok_or_else(|| not_found(partition_key, row_key))
    }

    async fn query(
        &self,
        partition_key: &str,
        filter: Option<&Filter>,
    ) -> Result<Vec<Row>, StoreError> {
        let partitions = self.read()?;
        let Some(rows) = partitions.get(partition_key) else {
            return Ok(Vec::new());
        };

        Ok(rows
            .values()
            .filter(|row| filter.map_or(true, |f| f.matches(row)))
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_available()
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
