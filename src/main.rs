// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Mintgate

use std::{net::SocketAddr, sync::Arc};

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mintgate_server::{
    api::router,
    config::Config,
    mint::{MintService, SponsorDelegator},
    state::AppState,
    storage::{self, EventStore, MintLedger},
    walrus::WalrusClient,
};

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            std::process::exit(1);
        }
    };

    init_tracing(config.log_json);

    // Open the ledger and ensure tables exist before accepting traffic.
    let db = Arc::new(
        storage::open(&config.ledger_path).expect("Failed to open ledger database"),
    );
    let ledger = MintLedger::new(db.clone());
    let events = EventStore::new(db);

    if let Some(path) = &config.events_path {
        match events.seed_from_file(path) {
            Ok(count) => info!(count, path = %path.display(), "seeded mint events"),
            Err(err) => warn!(error = %err, path = %path.display(), "failed to seed mint events"),
        }
    }

    let delegator =
        Arc::new(SponsorDelegator::new(&config.sponsor).expect("Failed to build sponsor client"));
    let walrus = WalrusClient::new(&config.walrus).expect("Failed to build walrus client");

    let mint = MintService::new(events, ledger.clone(), delegator);
    let state = AppState::new(
        mint,
        ledger,
        walrus,
        config.walrus.default_retention,
        config.upload_token_secret.clone(),
    );
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Failed to parse bind address");

    info!(%addr, "mintgate server listening (docs at /docs)");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("HTTP server failed");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install ctrl-c handler");
    info!("shutdown signal received");
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
