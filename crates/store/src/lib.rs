//! voltdesk store: ordered in-memory collections with swap-published snapshots.
//!
//! Writers mutate a uid-indexed builder behind a mutex; every applied batch
//! freezes a fresh [`Snapshot`] that readers pick up lock-free through an
//! `ArcSwap`. A query running against an older snapshot keeps it alive for
//! the duration of the call.

#![forbid(unsafe_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use rustc_hash::FxHashMap;
use tokio::sync::watch;
use tracing::debug;
use voltdesk_core::{Entity, Mutation, Record, Snapshot, Uid};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate uid: {0}")]
    Duplicate(Uid),
    #[error("no record with uid: {0}")]
    Missing(Uid),
}

/// Dedupes a batch of mutations by uid: last write wins, first-seen FIFO
/// order is preserved. Seed files and bulk imports routinely carry repeated
/// rows for the same record.
pub struct Coalescer<T> {
    map: FxHashMap<Uid, Mutation<T>>,
    order: VecDeque<Uid>,
    superseded: u64,
}

impl<T: Record> Coalescer<T> {
    pub fn new() -> Self {
        Self { map: FxHashMap::default(), order: VecDeque::new(), superseded: 0 }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Number of mutations replaced by a later one for the same uid.
    pub fn superseded(&self) -> u64 {
        self.superseded
    }

    pub fn push(&mut self, m: Mutation<T>) {
        let uid = m.uid();
        if self.map.insert(uid, m).is_some() {
            self.superseded += 1;
        } else {
            self.order.push_back(uid);
        }
    }

    pub fn drain(&mut self) -> Vec<Mutation<T>> {
        let mut out = Vec::with_capacity(self.order.len());
        while let Some(uid) = self.order.pop_front() {
            if let Some(m) = self.map.remove(&uid) {
                out.push(m);
            }
        }
        out
    }
}

impl<T: Record> Default for Coalescer<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Ordered record collection with a uid index. Upserts replace in place so
/// the collection keeps its insertion order; deletes close the gap.
pub struct CollectionBuilder<T> {
    epoch: u64,
    items: Vec<T>,
    index: FxHashMap<Uid, usize>,
}

impl<T: Record + Clone> CollectionBuilder<T> {
    pub fn new() -> Self {
        Self { epoch: 0, items: Vec::new(), index: FxHashMap::default() }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn contains(&self, uid: Uid) -> bool {
        self.index.contains_key(&uid)
    }

    pub fn get(&self, uid: Uid) -> Option<&T> {
        self.index.get(&uid).map(|&i| &self.items[i])
    }

    /// Apply a batch and bump the epoch once.
    pub fn apply(&mut self, batch: Vec<Mutation<T>>) {
        for m in batch {
            match m {
                Mutation::Upsert(rec) => {
                    let uid = rec.uid();
                    if let Some(&i) = self.index.get(&uid) {
                        self.items[i] = rec;
                    } else {
                        self.index.insert(uid, self.items.len());
                        self.items.push(rec);
                    }
                }
                Mutation::Delete(uid) => {
                    if let Some(i) = self.index.remove(&uid) {
                        self.items.remove(i);
                        // Positions after the removed slot shift left.
                        for (j, rec) in self.items.iter().enumerate().skip(i) {
                            self.index.insert(rec.uid(), j);
                        }
                    }
                }
            }
        }
        self.epoch = self.epoch.saturating_add(1);
    }

    pub fn freeze(&self) -> Arc<Snapshot<T>> {
        Arc::new(Snapshot { epoch: self.epoch, items: self.items.clone() })
    }
}

impl<T: Record + Clone> Default for CollectionBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe collection handle: mutations behind a mutex, the current
/// snapshot behind an `ArcSwap`, and an epoch watch for anyone who wants
/// to know when the collection changed.
pub struct SharedCollection<T> {
    inner: Mutex<CollectionBuilder<T>>,
    snap: ArcSwap<Snapshot<T>>,
    epoch_tx: watch::Sender<u64>,
}

impl<T: Entity> SharedCollection<T> {
    pub fn new() -> Self {
        let (epoch_tx, _epoch_rx) = watch::channel(0u64);
        Self {
            inner: Mutex::new(CollectionBuilder::new()),
            snap: ArcSwap::from_pointee(Snapshot::default()),
            epoch_tx,
        }
    }

    /// Current published snapshot; cheap, lock-free.
    pub fn current(&self) -> Arc<Snapshot<T>> {
        self.snap.load_full()
    }

    pub fn subscribe_epoch(&self) -> watch::Receiver<u64> {
        self.epoch_tx.subscribe()
    }

    pub fn get(&self, uid: Uid) -> Option<T> {
        self.inner.lock().unwrap().get(uid).cloned()
    }

    /// Apply a batch of mutations as one epoch. Duplicated uids within the
    /// batch are coalesced (last write wins).
    pub fn apply(&self, batch: Vec<Mutation<T>>) {
        if batch.is_empty() {
            return;
        }
        let mut coalescer = Coalescer::new();
        let raw = batch.len();
        for m in batch {
            coalescer.push(m);
        }
        if coalescer.superseded() > 0 {
            debug!(
                kind = T::KIND,
                raw,
                coalesced = coalescer.len(),
                superseded = coalescer.superseded(),
                "batch coalesced"
            );
        }
        let mut inner = self.inner.lock().unwrap();
        inner.apply(coalescer.drain());
        self.publish(&inner);
    }

    /// Insert a record with a uid not yet present.
    pub fn insert(&self, rec: T) -> Result<(), StoreError> {
        let uid = rec.uid();
        let mut inner = self.inner.lock().unwrap();
        if inner.contains(uid) {
            return Err(StoreError::Duplicate(uid));
        }
        inner.apply(vec![Mutation::Upsert(rec)]);
        self.publish(&inner);
        Ok(())
    }

    /// Replace an existing record.
    pub fn update(&self, rec: T) -> Result<(), StoreError> {
        let uid = rec.uid();
        let mut inner = self.inner.lock().unwrap();
        if !inner.contains(uid) {
            return Err(StoreError::Missing(uid));
        }
        inner.apply(vec![Mutation::Upsert(rec)]);
        self.publish(&inner);
        Ok(())
    }

    pub fn remove(&self, uid: Uid) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.contains(uid) {
            return Err(StoreError::Missing(uid));
        }
        inner.apply(vec![Mutation::Delete(uid)]);
        self.publish(&inner);
        Ok(())
    }

    fn publish(&self, inner: &CollectionBuilder<T>) {
        let next = inner.freeze();
        let epoch = next.epoch;
        metrics::gauge!("collection_records", inner.len() as f64, "kind" => T::KIND);
        self.snap.store(next);
        let _ = self.epoch_tx.send(epoch);
    }
}

impl<T: Entity> Default for SharedCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}
