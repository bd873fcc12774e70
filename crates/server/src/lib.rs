//! voltdesk REST server: CRUD + list endpoints per record kind.
//!
//! Pagination is server-side and nowhere else: clients send `page` and
//! `page_size` with each list call and render from the returned metadata.
//! They never fetch the full set to paginate locally.

#![forbid(unsafe_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tracing::info;
use voltdesk_core::entities::{
    Component, DiePlan, HsrpRequest, RsaRequest, SparePartRequest, User, Vendor,
};
use voltdesk_store::SharedCollection;

mod resource;
pub mod seed;

pub use seed::SeedFile;

/// One shared collection per record kind.
#[derive(Clone)]
pub struct AppState {
    pub vendors: Arc<SharedCollection<Vendor>>,
    pub components: Arc<SharedCollection<Component>>,
    pub die_plans: Arc<SharedCollection<DiePlan>>,
    pub spare_part_requests: Arc<SharedCollection<SparePartRequest>>,
    pub hsrp_requests: Arc<SharedCollection<HsrpRequest>>,
    pub rsa_requests: Arc<SharedCollection<RsaRequest>>,
    pub users: Arc<SharedCollection<User>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            vendors: Arc::new(SharedCollection::new()),
            components: Arc::new(SharedCollection::new()),
            die_plans: Arc::new(SharedCollection::new()),
            spare_part_requests: Arc::new(SharedCollection::new()),
            hsrp_requests: Arc::new(SharedCollection::new()),
            rsa_requests: Arc::new(SharedCollection::new()),
            users: Arc::new(SharedCollection::new()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

async fn healthz() -> &'static str {
    "ok"
}

async fn readyz(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "epochs": {
            "vendors": state.vendors.current().epoch,
            "components": state.components.current().epoch,
            "die-plans": state.die_plans.current().epoch,
            "spare-part-requests": state.spare_part_requests.current().epoch,
            "hsrp-requests": state.hsrp_requests.current().epoch,
            "rsa-requests": state.rsa_requests.current().epoch,
            "users": state.users.current().epoch,
        }
    }))
}

pub fn build_router(state: &AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .with_state(state.clone())
        .nest("/v1/vendors", resource::routes(state.vendors.clone()))
        .nest("/v1/components", resource::routes(state.components.clone()))
        .nest("/v1/die-plans", resource::routes(state.die_plans.clone()))
        .nest(
            "/v1/spare-part-requests",
            resource::routes(state.spare_part_requests.clone()),
        )
        .nest("/v1/hsrp-requests", resource::routes(state.hsrp_requests.clone()))
        .nest("/v1/rsa-requests", resource::routes(state.rsa_requests.clone()))
        .nest("/v1/users", resource::routes(state.users.clone()))
}

/// Bind and serve until the task is cancelled.
pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let app = build_router(&state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "voltdesk server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
