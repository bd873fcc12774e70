//! voltdesk public API façade (in-process).
//!
//! This crate defines the stable trait and types frontends (REST server,
//! CLI) depend on. The in-proc implementation calls the store directly;
//! a remote implementation can sit behind the same trait later.

#![forbid(unsafe_code)]

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;
use voltdesk_core::{Entity, Uid};
use voltdesk_query::{ListQuery, QueryError};
use voltdesk_store::{SharedCollection, StoreError};

/// API errors suitable for transport over HTTP later.
#[derive(Debug, thiserror::Error, Serialize, Deserialize)]
pub enum ApiError {
    #[error("validation: {0}")]
    Validation(String),
    #[error("not_found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("internal: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<QueryError> for ApiError {
    fn from(e: QueryError) -> Self {
        Self::Validation(e.to_string())
    }
}

fn map_store_err(e: StoreError) -> ApiError {
    match e {
        StoreError::Duplicate(uid) => ApiError::Conflict(format!("uid already exists: {uid}")),
        StoreError::Missing(uid) => ApiError::NotFound(format!("no record with uid: {uid}")),
    }
}

/// Transport mirror of a query result page: owned items plus the metadata
/// a client needs to render pagination controls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total_matching: usize,
    pub total_pages: usize,
    pub page: usize,
    pub page_size: usize,
}

/// CRUD + list surface for one record kind.
#[async_trait::async_trait]
pub trait ResourceApi<T: Entity>: Send + Sync {
    async fn list(&self, query: ListQuery) -> ApiResult<ListResponse<T>>;
    async fn get(&self, uid: Uid) -> ApiResult<T>;
    /// Create a record; a nil uid in the payload gets one assigned.
    async fn create(&self, record: T) -> ApiResult<T>;
    /// Replace the record at `uid`. The payload's uid, when set, must agree.
    async fn update(&self, uid: Uid, record: T) -> ApiResult<T>;
    async fn delete(&self, uid: Uid) -> ApiResult<()>;
}

// ----------------- In-process implementation -----------------

pub struct InProcResource<T> {
    col: Arc<SharedCollection<T>>,
}

impl<T> Clone for InProcResource<T> {
    fn clone(&self) -> Self {
        Self { col: Arc::clone(&self.col) }
    }
}

impl<T: Entity> InProcResource<T> {
    pub fn new(col: Arc<SharedCollection<T>>) -> Self {
        Self { col }
    }

    pub fn collection(&self) -> &Arc<SharedCollection<T>> {
        &self.col
    }
}

#[async_trait::async_trait]
impl<T: Entity> ResourceApi<T> for InProcResource<T> {
    async fn list(&self, query: ListQuery) -> ApiResult<ListResponse<T>> {
        let t0 = Instant::now();
        let snap = self.col.current();
        let page = voltdesk_query::run(&snap.items, &query)?;
        let resp = ListResponse {
            items: page.items.into_iter().cloned().collect(),
            total_matching: page.total_matching,
            total_pages: page.total_pages,
            page: page.page,
            page_size: query.page_size,
        };
        info!(
            kind = T::KIND,
            epoch = snap.epoch,
            matched = resp.total_matching,
            page = resp.page,
            took_ms = %t0.elapsed().as_millis(),
            "api: list ok"
        );
        Ok(resp)
    }

    async fn get(&self, uid: Uid) -> ApiResult<T> {
        self.col
            .get(uid)
            .ok_or_else(|| ApiError::NotFound(format!("no record with uid: {uid}")))
    }

    async fn create(&self, record: T) -> ApiResult<T> {
        let t0 = Instant::now();
        let mut rec = record;
        if rec.uid().is_nil() {
            rec.set_uid(Uid::new());
        }
        self.col.insert(rec.clone()).map_err(map_store_err)?;
        info!(kind = T::KIND, uid = %rec.uid(), took_ms = %t0.elapsed().as_millis(), "api: create ok");
        Ok(rec)
    }

    async fn update(&self, uid: Uid, record: T) -> ApiResult<T> {
        let t0 = Instant::now();
        if !record.uid().is_nil() && record.uid() != uid {
            return Err(ApiError::Validation(format!(
                "payload uid {} does not match target {uid}",
                record.uid()
            )));
        }
        let mut rec = record;
        rec.set_uid(uid);
        self.col.update(rec.clone()).map_err(map_store_err)?;
        info!(kind = T::KIND, uid = %uid, took_ms = %t0.elapsed().as_millis(), "api: update ok");
        Ok(rec)
    }

    async fn delete(&self, uid: Uid) -> ApiResult<()> {
        let t0 = Instant::now();
        self.col.remove(uid).map_err(map_store_err)?;
        info!(kind = T::KIND, uid = %uid, took_ms = %t0.elapsed().as_millis(), "api: delete ok");
        Ok(())
    }
}

// ----------------- Mock implementation -----------------

/// Canned-response implementation for tests of API consumers.
pub struct MockResource<T> {
    pub list: Option<ListResponse<T>>,
    pub record: Option<T>,
}

impl<T> Default for MockResource<T> {
    fn default() -> Self {
        Self { list: None, record: None }
    }
}

impl<T> MockResource<T> {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl<T: Entity> ResourceApi<T> for MockResource<T> {
    async fn list(&self, _query: ListQuery) -> ApiResult<ListResponse<T>> {
        self.list.clone().ok_or_else(|| ApiError::Internal("no list configured".into()))
    }

    async fn get(&self, uid: Uid) -> ApiResult<T> {
        self.record.clone().ok_or_else(|| ApiError::NotFound(format!("no record with uid: {uid}")))
    }

    async fn create(&self, _record: T) -> ApiResult<T> {
        self.record.clone().ok_or_else(|| ApiError::Internal("no record configured".into()))
    }

    async fn update(&self, _uid: Uid, _record: T) -> ApiResult<T> {
        self.record.clone().ok_or_else(|| ApiError::Internal("no record configured".into()))
    }

    async fn delete(&self, _uid: Uid) -> ApiResult<()> {
        Ok(())
    }
}
