// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::Result;
use axum::{http::StatusCode, routing::get, Router};
use clap::Parser;
use futures::StreamExt;
use kube::{
    runtime::{
        reflector::{self, Store},
        watcher::{self, Config as WatcherConfig},
        WatchStreamExt,
    },
    Api, Client, Resource,
};
use nextdns_operator::{
    config::ControllerConfig,
    constants::{HEALTH_SERVER_PATH, METRICS_SERVER_PATH, TOKIO_WORKER_THREADS},
    context::{Context, Stores},
    controller::{run_profile_controller, run_shared_list_controller, ControllerOptions},
    crd::{NextDNSAllowlist, NextDNSDenylist, NextDNSProfile, NextDNSTLDList},
    metrics,
    nextdns::HttpClientFactory,
    observer::PrometheusObserver,
};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, error, info};

fn main() -> Result<()> {
    if let Err(e) = rustls::crypto::ring::default_provider().install_default() {
        eprintln!("CRITICAL: Failed to install rustls crypto provider: {e:?}");
        std::process::exit(1);
    }

    let config = ControllerConfig::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("nextdns-controller")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(config))
}

fn init_tracing() {
    // Respects RUST_LOG (default: info) and RUST_LOG_FORMAT (json or text)
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

async fn async_main(config: ControllerConfig) -> Result<()> {
    init_tracing();

    info!("Starting NextDNS operator");
    debug!("Configuration: {:?}", config);

    let default_resync_period = config.resync_period()?;
    let metrics_addr = config.metrics_addr()?;
    let options = ControllerOptions {
        namespace: config.namespace().map(str::to_string),
        concurrency: config.concurrency,
    };
    match &options.namespace {
        Some(ns) => info!("Watching namespace {}", ns),
        None => info!("Watching all namespaces"),
    }

    let client = Client::try_default().await?;
    debug!("Kubernetes client initialized successfully");

    let nextdns = HttpClientFactory::new(&config.nextdns_api_url, config.http_timeout())?;

    let stores = Stores {
        profiles: spawn_reflector(options.api::<NextDNSProfile>(&client)),
        allowlists: spawn_reflector(options.api::<NextDNSAllowlist>(&client)),
        denylists: spawn_reflector(options.api::<NextDNSDenylist>(&client)),
        tld_lists: spawn_reflector(options.api::<NextDNSTLDList>(&client)),
    };

    info!("Waiting for reflector stores to sync");
    stores.profiles.wait_until_ready().await?;
    stores.allowlists.wait_until_ready().await?;
    stores.denylists.wait_until_ready().await?;
    stores.tld_lists.wait_until_ready().await?;

    let context = Arc::new(Context {
        client,
        stores,
        nextdns: Arc::new(nextdns),
        observer: Arc::new(PrometheusObserver),
        default_resync_period,
    });

    info!("Starting all controllers");

    // Controllers should never exit - if one fails, we log it and exit the main process
    tokio::select! {
        result = run_profile_controller(context.clone(), options.clone()) => {
            error!("CRITICAL: NextDNSProfile controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("NextDNSProfile controller exited unexpectedly without error")
        }
        result = run_shared_list_controller::<NextDNSAllowlist>(context.clone(), options.clone()) => {
            error!("CRITICAL: NextDNSAllowlist controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("NextDNSAllowlist controller exited unexpectedly without error")
        }
        result = run_shared_list_controller::<NextDNSDenylist>(context.clone(), options.clone()) => {
            error!("CRITICAL: NextDNSDenylist controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("NextDNSDenylist controller exited unexpectedly without error")
        }
        result = run_shared_list_controller::<NextDNSTLDList>(context.clone(), options) => {
            error!("CRITICAL: NextDNSTLDList controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("NextDNSTLDList controller exited unexpectedly without error")
        }
        result = serve_metrics(metrics_addr) => {
            error!("CRITICAL: metrics server exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("metrics server exited unexpectedly without error")
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal, stopping controllers");
            Ok(())
        }
    }
}

/// Start a reflector task for `api` and return its store.
fn spawn_reflector<K>(api: Api<K>) -> Store<K>
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug + Send + Sync + 'static,
{
    let (reader, writer) = reflector::store();
    let stream = reflector::reflector(writer, watcher::watcher(api, WatcherConfig::default()))
        .default_backoff()
        .touched_objects()
        .for_each(|_| futures::future::ready(()));
    tokio::spawn(stream);
    reader
}

async fn serve_metrics(addr: SocketAddr) -> Result<()> {
    let app = Router::new()
        .route(METRICS_SERVER_PATH, get(metrics_handler))
        .route(HEALTH_SERVER_PATH, get(|| async { "ok" }));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Serving metrics on http://{}{}", addr, METRICS_SERVER_PATH);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn metrics_handler() -> Result<String, (StatusCode, String)> {
    metrics::gather_metrics().map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}
