pub mod db;
pub mod model;
mod services;
pub mod utils;

use db::{mongo, Stores};
use utils::health;
use utils::reaper;
use tokio::signal;
use dotenv::dotenv;
use std::sync::Arc;
use std::net::SocketAddr;
use utils::errors::AgriError;
use utils::context::ServiceContext;
use crate::utils::errors::ErrorCode;
use utils::config::{Configuration, StoreBackend, self};
use grpc::api::accounts_server::AccountsServer;
use grpc::admin::admin_server::AdminServer;
use tokio::sync::oneshot::{self};
use tonic::transport::{Identity, Server, ServerTlsConfig};
use opentelemetry::{global, sdk::{propagation::TraceContextPropagator,trace,trace::Sampler}};
use tracing_subscriber::{prelude::__tracing_subscriber_SubscriberExt, Registry, util::SubscriberInitExt};

///
/// These are the generated gRPC/protobuf modules which give us access to the message structures, services,
/// servers and clients to talk to our APIs. The services are implemented in services/mod.rs
///
pub mod grpc {
    pub mod common {
        tonic::include_proto!("grpc.common");
    }

    pub mod api {
        tonic::include_proto!("grpc.accounts");
    }

    pub mod admin {
        tonic::include_proto!("grpc.admin");
    }
}

pub const APP_NAME: &str = "AgriNova";

///
/// Entry point to start the app.
///
pub async fn lib_main() -> Result<(), AgriError> {

    // Load any local dev settings as environment variables from a .env file.
    dotenv().ok();

    // Default log level to INFO if it's not specified.
    config::default_env("RUST_LOG", "INFO");

    // SIGINT/ctrl+c handling for graceful shutdown.
    let (signal_tx, signal_rx) = oneshot::channel();
    let _signal = tokio::spawn(wait_for_signal(signal_tx));

    // Load the service configuration into struct and reject anything unusable.
    let config = Configuration::from_env()?;
    config.validate()?;

    // Initialise open-telemetry distributed tracing.
    let tracing = init_tracing(&config)?;

    tracing::info!("{}\n{}", BANNER, config.fmt_console()?);

    // Connect the stores before proceeding.
    let stores = init_stores(&config).await?;

    // Topics must exist before the first notification is published.
    #[cfg(feature = "kafka")]
    utils::kafka::create_topics(&config).await?;

    // The service context allows any gRPC service access to shared stuff (stores, notifier, etc.).
    let ctx = Arc::new(ServiceContext::new(config.clone(), stores)?);

    let (health_reporter, health_service) = health::start(ctx.clone()).await;

    // Expired OTPs and blocks are ignored on read, this just keeps the stores tidy.
    tokio::spawn(reaper::run(ctx.clone()));

    // The address we'll serve on.
    let addr: SocketAddr = config.address.parse()
        .map_err(|err| ErrorCode::InvalidConfiguration.with_msg(&format!("Invalid address {}: {}", config.address, err)))?;

    let mut builder = Server::builder();

    if config.tls_enabled() {
        builder = builder.tls_config(ServerTlsConfig::new().identity(init_tls(&config).await?))?;
    }

    tracing::info!("{} listening on {} {}", APP_NAME, addr, if config.tls_enabled() { "using tls" } else { "without tls" });

    let server = builder
        .add_service(AccountsServer::new(ctx.clone()))
        .add_optional_service(admin_service(&ctx))
        .add_service(health_service)
        .serve_with_shutdown(addr, async {
            signal_rx.await.ok();
            tracing::info!("Graceful shutdown");
        });

    server.await?;

    health::shutdown(health_reporter).await;

    if tracing {
        opentelemetry::global::shutdown_tracer_provider(); // sending remaining spans
    }

    Ok(())
}

///
/// The Admin clock endpoints are only routed when admin_enabled is set.
///
fn admin_service(ctx: &Arc<ServiceContext>) -> Option<AdminServer<Arc<ServiceContext>>> {
    match ctx.config().admin_enabled {
        true => {
            tracing::warn!("Admin service enabled - clients can move the service clock");
            Some(AdminServer::new(ctx.clone()))
        },
        false => None,
    }
}

///
/// Sends a oneshot signal when a SIGINT is received (Ctrl+C)
///
async fn wait_for_signal(tx: oneshot::Sender<()>) {
    let _ = signal::ctrl_c().await;
    tracing::info!("SIGINT received: shutting down");
    let _ = tx.send(());
}

///
/// Create the configured stores. MongoDB is connected and its indexes synced with the code.
///
async fn init_stores(config: &Configuration) -> Result<Stores, AgriError> {
    match config.backend()? {
        StoreBackend::Mongo => {
            let db = mongo::get_mongo_db(APP_NAME, config).await?;
            mongo::update_mongo(&db).await?;
            Ok(Stores::mongo(db))
        },
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory stores - nothing will survive a restart");
            Ok(Stores::memory())
        },
    }
}

///
/// Bind to the server-side key and certificate.
///
async fn init_tls(config: &Configuration) -> Result<Identity, AgriError> {

    tracing::info!("Initialising TLS config");

    let cert_path = config.tls_cert.clone().unwrap_or_default();
    let key_path = config.tls_key.clone().unwrap_or_default();

    let cert = tokio::fs::read(&cert_path)
        .await
        .map_err(|e| ErrorCode::IOError.with_msg(&format!("Failed to open pem {}: {}", cert_path, e)))?;

    let key = tokio::fs::read(&key_path)
        .await
        .map_err(|e| ErrorCode::IOError.with_msg(&format!("Failed to open key {}: {}", key_path, e)))?;

    Ok(Identity::from_pem(cert, key))
}

///
/// Initialise tracing and plug-in the Jaeger feature if enabled.
///
fn init_tracing(config: &Configuration) -> Result<bool, AgriError> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    match config.distributed_tracing {
        true => { // Install the Jaeger pipeline.
            let tracer = opentelemetry_jaeger::new_pipeline()
                .with_service_name(APP_NAME)
                .with_trace_config(trace::config().with_sampler(Sampler::AlwaysOn))
                .with_agent_endpoint(config.jaeger_endpoint.clone().unwrap_or_default())
                .install_batch(opentelemetry::runtime::Tokio)
                .map_err(|err| ErrorCode::InvalidConfiguration.with_msg(&format!("Unable to build Jaeger pipeline: {}", err)))?;

            if let Err(err) = Registry::default()
                .with(tracing_subscriber::EnvFilter::from_default_env()) // Set the tracing level to match RUST_LOG env variable.
                .with(tracing_subscriber::fmt::layer().with_test_writer().with_ansi(true))
                .with(tracing_opentelemetry::layer().with_tracer(tracer))
                .try_init() {
                    tracing::info!("Tracing already initialised: {}", err); // Allowed error here - tests call this fn repeatedly.
            }

            Ok(true)
        },
        false => {
            if let Err(err) = Registry::default()
                .with(tracing_subscriber::EnvFilter::from_default_env()) // Set the tracing level to match RUST_LOG env variable.
                .with(tracing_subscriber::fmt::layer().with_test_writer().with_ansi(true))
                .try_init() {
                    tracing::info!("Tracing already initialised: {}", err); // Allowed error here - tests call this fn repeatedly.
            }

            Ok(false)
        }
    }
}

const BANNER: &str = r#"
    _               _ _   _
   / \   __ _ _ __(_) \ | | _____   ____ _
  / _ \ / _` | '__| |  \| |/ _ \ \ / / _` |
 / ___ \ (_| | |  | | |\  | (_) \ V / (_| |
/_/   \_\__, |_|  |_|_| \_|\___/ \_/ \__,_|
        |___/
"#;
