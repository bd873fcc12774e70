//! Generic CRUD + list handlers, instantiated once per record kind.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use voltdesk_core::{Entity, Uid};
use voltdesk_query::{Filter, ListQuery};
use voltdesk_api::{ApiError, InProcResource, ListResponse, ResourceApi};
use voltdesk_store::SharedCollection;

const DEFAULT_PAGE_SIZE: usize = 10;

fn max_page_size() -> usize {
    std::env::var("VOLTDESK_MAX_PAGE_SIZE").ok().and_then(|s| s.parse().ok()).unwrap_or(200)
}

/// List query parameters. Malformed `page`/`page_size` fail extraction and
/// come back as 400; they are never defaulted.
#[derive(Debug, Deserialize)]
pub(crate) struct ListParams {
    #[serde(default)]
    q: Option<String>,
    /// Comma-separated search fields; defaults per kind.
    #[serde(default)]
    fields: Option<String>,
    #[serde(default)]
    filter_field: Option<String>,
    #[serde(default)]
    filter_value: Option<String>,
    #[serde(default)]
    page: Option<usize>,
    #[serde(default)]
    page_size: Option<usize>,
}

impl ListParams {
    fn into_query<T: Entity>(self) -> Result<ListQuery, ApiError> {
        let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        let cap = max_page_size();
        if page_size > cap {
            return Err(ApiError::Validation(format!("page_size exceeds maximum of {cap}")));
        }
        let filter = match (self.filter_field, self.filter_value) {
            (Some(field), Some(value)) => Some(Filter { field, value }),
            (None, None) => None,
            _ => {
                return Err(ApiError::Validation(
                    "filter_field and filter_value must be given together".into(),
                ))
            }
        };
        let search_fields = match self.fields {
            Some(csv) => csv.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect(),
            None => T::search_fields().iter().map(|s| (*s).to_string()).collect(),
        };
        Ok(ListQuery {
            search_text: self.q.unwrap_or_default(),
            search_fields,
            filter,
            page: self.page.unwrap_or(1),
            page_size,
        })
    }
}

/// `ApiError` carried through axum with the JSON error contract
/// `{ "error": { "code", "message" } }`.
pub(crate) struct ApiFailure(ApiError);

impl From<ApiError> for ApiFailure {
    fn from(e: ApiError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "validation"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };
        let body = json!({ "error": { "code": code, "message": self.0.to_string() } });
        (status, Json(body)).into_response()
    }
}

fn parse_uid(raw: &str) -> Result<Uid, ApiFailure> {
    raw.parse().map_err(|_| ApiError::Validation(format!("invalid uid: {raw}")).into())
}

pub(crate) fn routes<T>(col: Arc<SharedCollection<T>>) -> Router
where
    T: Entity + Serialize + DeserializeOwned,
{
    Router::new()
        .route("/", get(list::<T>).post(create::<T>))
        .route("/:id", get(get_one::<T>).patch(patch_one::<T>).delete(delete_one::<T>))
        .with_state(InProcResource::new(col))
}

async fn list<T>(
    State(api): State<InProcResource<T>>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse<T>>, ApiFailure>
where
    T: Entity + Serialize + DeserializeOwned,
{
    let query = params.into_query::<T>()?;
    Ok(Json(api.list(query).await?))
}

async fn get_one<T>(
    State(api): State<InProcResource<T>>,
    Path(id): Path<String>,
) -> Result<Json<T>, ApiFailure>
where
    T: Entity + Serialize + DeserializeOwned,
{
    let uid = parse_uid(&id)?;
    Ok(Json(api.get(uid).await?))
}

async fn create<T>(
    State(api): State<InProcResource<T>>,
    Json(record): Json<T>,
) -> Result<(StatusCode, Json<T>), ApiFailure>
where
    T: Entity + Serialize + DeserializeOwned,
{
    let created = api.create(record).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Shallow JSON merge onto the stored record, then a full update.
async fn patch_one<T>(
    State(api): State<InProcResource<T>>,
    Path(id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<T>, ApiFailure>
where
    T: Entity + Serialize + DeserializeOwned,
{
    let uid = parse_uid(&id)?;
    let patch = match patch {
        serde_json::Value::Object(map) => map,
        _ => return Err(ApiError::Validation("patch body must be a JSON object".into()).into()),
    };
    if let Some(v) = patch.get("uid") {
        if v.as_str() != Some(uid.to_string().as_str()) {
            return Err(ApiError::Validation("patch may not change the uid".into()).into());
        }
    }

    let existing = api.get(uid).await?;
    let mut merged = match serde_json::to_value(&existing) {
        Ok(serde_json::Value::Object(map)) => map,
        _ => return Err(ApiError::Internal("record did not serialize to an object".into()).into()),
    };
    for (k, v) in patch {
        merged.insert(k, v);
    }
    let updated: T = serde_json::from_value(serde_json::Value::Object(merged))
        .map_err(|e| ApiError::Validation(format!("patch produced an invalid record: {e}")))?;
    Ok(Json(api.update(uid, updated).await?))
}

async fn delete_one<T>(
    State(api): State<InProcResource<T>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiFailure>
where
    T: Entity + Serialize + DeserializeOwned,
{
    let uid = parse_uid(&id)?;
    api.delete(uid).await?;
    Ok(StatusCode::NO_CONTENT)
}
