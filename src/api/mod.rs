// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Mintgate

use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        CheckResponse, MintData, MintRequest, MintResponse, StoreBlobResponse, StoredBlobData,
    },
    state::AppState,
};

pub mod blobs;
pub mod health;
pub mod mint;

/// Whole-request deadline. Sits above the sponsor deadline so a slow
/// sponsor resolves to a clean 502 before this fires, and below any
/// platform kill timer.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/mint", post(mint::mint))
        .route("/mints/check", get(mint::check_mint))
        .route("/walrus/store", post(blobs::store_blob));

    Router::new()
        .nest("/api", api_routes)
        .route("/walrus/blobs/{blob_id}", get(blobs::serve_blob))
        .route("/health", get(health::health))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        mint::mint,
        mint::check_mint,
        blobs::store_blob,
        blobs::serve_blob,
        health::health
    ),
    components(
        schemas(
            MintRequest,
            MintResponse,
            MintData,
            CheckResponse,
            StoreBlobResponse,
            StoredBlobData,
            health::HealthResponse,
            health::HealthChecks
        )
    ),
    tags(
        (name = "Mint", description = "Mint authorization and delegation"),
        (name = "Blobs", description = "Event artwork storage"),
        (name = "Health", description = "Liveness and readiness")
    )
)]
struct ApiDoc;
