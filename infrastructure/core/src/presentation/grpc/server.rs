// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! gRPC Server
//!
//! Hosts whatever services a [`GrpcServicers`] implementation registers.
//! The server runs on a background task until ctrl-c or its cancellation
//! token fires; shutdown is graceful and awaited.

use async_trait::async_trait;
use std::net::{AddrParseError, SocketAddr};
use std::sync::{Arc, OnceLock};
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tonic::service::RoutesBuilder;
use tonic::transport::Server;
use tracing::{debug, info};

use crate::domain::ports::{Application, PrimaryPort};

pub const DEFAULT_GRPC_ADDRESS: &str = "[::]:50051";

#[derive(Debug, thiserror::Error)]
pub enum GrpcError {
    #[error("Invalid gRPC listen address '{address}': {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: AddrParseError,
    },

    #[error("gRPC transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("gRPC server task failed: {0}")]
    Task(#[from] JoinError),
}

/// Registers service implementations on the server being built.
pub trait GrpcServicers: Send + Sync {
    fn add_servicers(&self, routes: &mut RoutesBuilder, app: Arc<dyn Application>);
}

pub struct GrpcServer {
    address: String,
    servicers: Arc<dyn GrpcServicers>,
    app: OnceLock<Arc<dyn Application>>,
    shutdown: CancellationToken,
}

impl GrpcServer {
    pub fn new(servicers: Arc<dyn GrpcServicers>) -> Self {
        Self {
            address: DEFAULT_GRPC_ADDRESS.to_string(),
            servicers,
            app: OnceLock::new(),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, GrpcError> {
        self.address.parse().map_err(|source| GrpcError::InvalidAddress {
            address: self.address.clone(),
            source,
        })
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn app(&self) -> Option<&Arc<dyn Application>> {
        self.app.get()
    }

    /// Serve until shut down.
    pub async fn accept(&self, app: Arc<dyn Application>) -> Result<(), GrpcError> {
        let addr = self.socket_addr()?;
        if self.app.set(app.clone()).is_err() {
            debug!("gRPC server application already set; keeping the first one");
        }

        let mut routes = RoutesBuilder::default();
        self.servicers.add_servicers(&mut routes, app);

        let shutdown = self.shutdown.clone();
        let server = tokio::spawn(async move {
            Server::builder()
                .add_routes(routes.routes())
                .serve_with_shutdown(addr, async move {
                    tokio::select! {
                        _ = shutdown.cancelled() => {}
                        _ = tokio::signal::ctrl_c() => {}
                    }
                    info!("gRPC server shutting down");
                })
                .await
        });

        info!("gRPC server listening on {}", addr);
        server.await??;
        info!("gRPC server stopped");
        Ok(())
    }
}

#[async_trait]
impl PrimaryPort for GrpcServer {
    fn priority(&self) -> i32 {
        999
    }

    async fn entrypoint(&self, app: Arc<dyn Application>) -> anyhow::Result<()> {
        self.accept(app).await?;
        Ok(())
    }
}
