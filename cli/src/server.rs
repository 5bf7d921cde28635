// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Host servers and port supervision

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use eda_infrastructure_core::infrastructure::http::{HttpEvent, HttpResponse, JsonResponse};
use eda_infrastructure_core::presentation::api::{router, HttpEventHandler, HttpRoute};
use eda_infrastructure_core::{Application, PrimaryPort};

/// Forwards the request itself to the application as an event.
pub struct AcceptHttpEvent;

#[async_trait]
impl HttpEventHandler for AcceptHttpEvent {
    async fn handle(&self, app: Arc<dyn Application>, event: HttpEvent) -> Result<Box<dyn HttpResponse>> {
        let method = event.http_method();
        app.accept(Arc::new(event)).await?;
        Ok(Box::new(JsonResponse::with_status(
            202,
            json!({ "accepted": true, "method": method.as_str() }),
        )))
    }
}

pub struct HttpServer {
    address: SocketAddr,
    routes: Vec<HttpRoute>,
    shutdown: CancellationToken,
}

impl HttpServer {
    pub fn new(address: SocketAddr, routes: Vec<HttpRoute>) -> Self {
        Self {
            address,
            routes,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }
}

#[async_trait]
impl PrimaryPort for HttpServer {
    fn priority(&self) -> i32 {
        500
    }

    async fn entrypoint(&self, app: Arc<dyn Application>) -> Result<()> {
        let api = router(app, self.routes.clone());
        let listener = TcpListener::bind(self.address)
            .await
            .with_context(|| format!("Failed to bind to {}", self.address))?;

        info!("HTTP API listening on {}", self.address);

        axum::serve(listener, api)
            .with_graceful_shutdown(self.shutdown.clone().cancelled_owned())
            .await
            .context("HTTP server failed")?;

        info!("HTTP API stopped");
        Ok(())
    }
}

/// Start every port, lowest priority first, and wait for all of them.
pub async fn run_ports(app: Arc<dyn Application>, mut ports: Vec<Arc<dyn PrimaryPort>>) {
    ports.sort_by_key(|port| port.priority());

    let mut tasks = JoinSet::new();
    for port in ports {
        let app = app.clone();
        tasks.spawn(async move { port.entrypoint(app).await });
    }

    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("Port failed: {:#}", e),
            Err(e) => error!("Port task failed: {}", e),
        }
    }
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
