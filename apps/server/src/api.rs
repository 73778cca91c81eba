use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderValue, Method},
    routing::get,
    Json, Router,
};
use passfinder_catalog::PricedItem;
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    config::Config,
    error::{ApiError, ApiResult, MISSING_USER_ID},
    main_lib::AppState,
};

#[derive(Serialize)]
pub struct UserItemsResponse {
    pub items: Vec<PricedItem>,
}

pub async fn healthz() -> &'static str {
    "ok"
}

/// Priced entitlement items sold by a user, cheapest first.
async fn get_user_items(
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<UserItemsResponse>> {
    if user_id.trim().is_empty() {
        return Err(ApiError::BadRequest(MISSING_USER_ID.to_string()));
    }
    let items = state.aggregator.collect_priced_items(&user_id).await?;
    Ok(Json(UserItemsResponse { items }))
}

async fn missing_user_id() -> ApiResult<()> {
    Err(ApiError::BadRequest(MISSING_USER_ID.to_string()))
}

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = config
            .cors_allow
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(origin) => Some(origin),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin {:?}", o);
                    None
                }
            })
            .collect::<Vec<_>>();
        CorsLayer::new().allow_origin(origins)
    }
    .allow_methods([Method::GET]);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/user-items", get(missing_user_id))
        .route("/user-items/", get(missing_user_id))
        .route("/user-items/{user_id}", get(get_user_items))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
