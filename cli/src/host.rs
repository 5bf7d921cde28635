// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Host
//!
//! Boots an [`EdaHost`]: parses the shared command line, lets every CLI
//! handler configure the application, then runs the long-lived ports
//! (d-bus listener, HTTP API and, when an address is given, gRPC) until
//! ctrl-c or SIGTERM.

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{ArgMatches, Args, Command, FromArgMatches};
use std::ffi::OsString;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use eda_infrastructure_core::infrastructure::cli::{
    CliDispatcher, CliError, CliHandler, EventsourcingConfigCli, LoggingConfigCli, OneShotCli,
};
use eda_infrastructure_core::infrastructure::dbus::{DbusSignalListener, DbusSignals, SignalPackage, ZbusConnector};
use eda_infrastructure_core::infrastructure::http::HttpMethod;
use eda_infrastructure_core::presentation::api::HttpRoute;
use eda_infrastructure_core::presentation::grpc::{GrpcServer, GrpcServicers, RoutesBuilder};
use eda_infrastructure_core::{Application, PrimaryPort};

use crate::app::EdaHost;
use crate::server::{run_ports, shutdown_signal, AcceptHttpEvent, HttpServer};

/// Host settings shared with the handler chain's command line.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct HostArgs {
    /// HTTP API port
    #[arg(long, env = "EDA_HTTP_PORT", default_value_t = 8000)]
    pub http_port: u16,

    /// HTTP API host
    #[arg(long, env = "EDA_HTTP_HOST", default_value = "127.0.0.1")]
    pub http_host: String,

    /// gRPC listen address, e.g. [::]:50051 (gRPC stays off when unset)
    #[arg(long, env = "EDA_GRPC_ADDRESS", value_name = "ADDRESS")]
    pub grpc_address: Option<String>,

    /// Do not listen for d-bus signals
    #[arg(long)]
    pub no_dbus: bool,
}

impl HostArgs {
    pub fn http_address(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.http_host, self.http_port)
            .parse()
            .with_context(|| format!("Invalid HTTP address {}:{}", self.http_host, self.http_port))
    }
}

/// Contributes [`HostArgs`] to the shared command line.
#[derive(Debug, Default)]
pub struct HostCli;

#[async_trait]
impl CliHandler for HostCli {
    fn description(&self) -> &str {
        "Configures the host ports"
    }

    fn priority(&self) -> i32 {
        -1
    }

    fn add_arguments(&self, command: Command) -> Command {
        HostArgs::augment_args(command)
    }

    async fn handle(&self, _app: &dyn Application, matches: &ArgMatches) -> Result<(), CliError> {
        let args = HostArgs::from_arg_matches(matches)?;
        debug!("Host settings: {:?}", args);
        Ok(())
    }
}

struct NoServicers;

impl GrpcServicers for NoServicers {
    fn add_servicers(&self, _routes: &mut RoutesBuilder, _app: Arc<dyn Application>) {}
}

/// Assembles the ports around an application.
pub struct Host {
    name: String,
    packages: Vec<Arc<dyn SignalPackage>>,
    routes: Vec<HttpRoute>,
    servicers: Arc<dyn GrpcServicers>,
    handlers: Vec<Arc<dyn CliHandler>>,
}

impl Host {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            packages: Vec::new(),
            routes: vec![HttpRoute::new(HttpMethod::Post, "/events", Arc::new(AcceptHttpEvent))],
            servicers: Arc::new(NoServicers),
            handlers: Vec::new(),
        }
    }

    pub fn with_package(mut self, package: Arc<dyn SignalPackage>) -> Self {
        self.packages.push(package);
        self
    }

    pub fn with_route(mut self, route: HttpRoute) -> Self {
        self.routes.push(route);
        self
    }

    pub fn with_servicers(mut self, servicers: Arc<dyn GrpcServicers>) -> Self {
        self.servicers = servicers;
        self
    }

    pub fn with_handler(mut self, handler: Arc<dyn CliHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn dispatcher(&self) -> CliDispatcher {
        let builtin: [Arc<dyn CliHandler>; 4] = [
            Arc::new(HostCli),
            Arc::new(LoggingConfigCli),
            Arc::new(OneShotCli),
            Arc::new(EventsourcingConfigCli),
        ];
        builtin
            .into_iter()
            .chain(self.handlers.iter().cloned())
            .fold(CliDispatcher::new(self.name.clone()), |dispatcher, handler| {
                dispatcher.with_handler(handler)
            })
    }

    /// Configure the application from `args` and, unless it runs once,
    /// serve until a shutdown signal arrives.
    pub async fn run<I, T>(self, args: I) -> Result<Arc<EdaHost>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let dispatcher = self.dispatcher();
        let matches = dispatcher.parse(args)?;
        let host_args = HostArgs::from_arg_matches(&matches).map_err(CliError::from)?;

        let app = Arc::new(EdaHost::new(self.name.clone()));
        dispatcher.dispatch(app.as_ref(), &matches).await?;

        if app.is_one_shot() {
            info!("{} ran in one-shot mode", self.name);
            return Ok(app);
        }

        let (ports, tokens) = self.ports(&host_args)?;
        tokio::spawn(async move {
            shutdown_signal().await;
            for token in tokens {
                token.cancel();
            }
        });

        run_ports(app.clone(), ports).await;
        Ok(app)
    }

    fn ports(&self, args: &HostArgs) -> Result<(Vec<Arc<dyn PrimaryPort>>, Vec<CancellationToken>)> {
        let mut ports: Vec<Arc<dyn PrimaryPort>> = Vec::new();
        let mut tokens = Vec::new();

        if args.no_dbus {
            info!("D-Bus listener disabled");
        } else {
            let signals = Arc::new(DbusSignals::new(self.packages.clone()));
            let listener = DbusSignalListener::new(signals, Arc::new(ZbusConnector));
            tokens.push(listener.shutdown_token());
            ports.push(Arc::new(listener));
        }

        let http = HttpServer::new(args.http_address()?, self.routes.clone());
        tokens.push(http.shutdown_token());
        ports.push(Arc::new(http));

        if let Some(address) = &args.grpc_address {
            let grpc = GrpcServer::new(self.servicers.clone()).with_address(address.clone());
            grpc.socket_addr()?;
            tokens.push(grpc.shutdown_token());
            ports.push(Arc::new(grpc));
        }

        Ok((ports, tokens))
    }
}
