// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::Result;
use axum::{http::StatusCode, routing::get, Router};
use clap::Parser;
use futures::StreamExt;
use k8s_openapi::api::core::v1::{ConfigMap, Namespace, Service};
use kube::{
    runtime::{
        reflector::{self, store::Writer, Store},
        watcher::{self, Event},
        WatchStreamExt,
    },
    Api, Client, ResourceExt,
};
use polaris_controller::{
    config::{ControllerArgs, LogFormat},
    constants::{METRICS_SERVER_PATH, TOKIO_WORKER_THREADS},
    event_handler::{key_for_event, namespace_fanout_keys, resync_keys, NamespaceSyncTracker},
    metrics,
    work_queue::WorkQueue,
    worker::{handle_key, ServiceDispatcher},
};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

fn main() -> Result<()> {
    let args = ControllerArgs::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("polaris-controller")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(args))
}

/// Initialize logging.
///
/// Format: timestamp file:line LEVEL message. Respects `RUST_LOG` if set,
/// otherwise defaults to INFO level.
fn init_logging(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match format {
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        LogFormat::Text => {
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

async fn async_main(args: ControllerArgs) -> Result<()> {
    init_logging(args.log_format);

    info!("Starting Polaris controller");
    debug!(?args, "Parsed controller configuration");

    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;
    debug!("Kubernetes client initialized successfully");

    let queue = Arc::new(WorkQueue::new());
    let (service_store, service_writer) = reflector::store::<Service>();

    let (services, config_maps): (Api<Service>, Api<ConfigMap>) = match &args.watch_namespace {
        Some(ns) => (
            Api::namespaced(client.clone(), ns),
            Api::namespaced(client.clone(), ns),
        ),
        None => (Api::all(client.clone()), Api::all(client.clone())),
    };
    let namespaces: Api<Namespace> = Api::all(client.clone());
    let namespace_config = match &args.watch_namespace {
        Some(ns) => watcher::Config::default().fields(&format!("metadata.name={ns}")),
        None => watcher::Config::default(),
    };

    let services_ready = Arc::new(AtomicBool::new(false));
    let dispatcher = ServiceDispatcher::new(service_store.clone(), Arc::clone(&services_ready));

    let workers: Vec<_> = (0..args.worker_count())
        .map(|id| tokio::spawn(run_worker(id, Arc::clone(&queue), dispatcher.clone())))
        .collect();
    info!(workers = workers.len(), "Started queue workers");

    // Watches should never exit - if one fails, we log it and exit the main process
    let outcome = tokio::select! {
        result = run_service_watch(services, service_writer, services_ready, Arc::clone(&queue)) => {
            error!("CRITICAL: Service watch exited unexpectedly: {:?}", result);
            result.and_then(|()| Err(anyhow::anyhow!("Service watch exited unexpectedly without error")))
        }
        result = run_namespace_watch(namespaces, namespace_config, service_store.clone(), Arc::clone(&queue)) => {
            error!("CRITICAL: Namespace watch exited unexpectedly: {:?}", result);
            result.and_then(|()| Err(anyhow::anyhow!("Namespace watch exited unexpectedly without error")))
        }
        result = run_config_map_watch(config_maps, Arc::clone(&queue)) => {
            error!("CRITICAL: ConfigMap watch exited unexpectedly: {:?}", result);
            result.and_then(|()| Err(anyhow::anyhow!("ConfigMap watch exited unexpectedly without error")))
        }
        result = run_resync(args.resync_period(), service_store, Arc::clone(&queue)) => {
            error!("CRITICAL: Resync loop exited unexpectedly: {:?}", result);
            result
        }
        result = serve_metrics(args.metrics_addr()) => {
            error!("CRITICAL: Metrics server exited unexpectedly: {:?}", result);
            result
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
            Ok(())
        }
    };

    queue.shut_down();
    for worker in workers {
        if let Err(e) = worker.await {
            error!(error = %e, "Queue worker panicked");
        }
    }
    info!("Polaris controller stopped");

    outcome
}

/// Watch Services, keep the shared store current and enqueue kind keys.
async fn run_service_watch(
    api: Api<Service>,
    writer: Writer<Service>,
    ready: Arc<AtomicBool>,
    queue: Arc<WorkQueue>,
) -> Result<()> {
    info!("Starting Service watch");

    let mut events = watcher::watcher(api, watcher::Config::default())
        .default_backoff()
        .reflect(writer)
        .boxed();

    while let Some(event) = events.next().await {
        match event {
            Ok(event) => {
                if matches!(event, Event::InitDone) && !ready.swap(true, Ordering::AcqRel) {
                    info!("Service cache synced");
                }
                if let Some(key) = key_for_event(&event) {
                    queue.add(key);
                }
            }
            Err(e) => warn!(error = %e, "Service watch error, backing off"),
        }
    }

    Ok(())
}

/// Watch Namespaces, enqueue kind keys and fan out to Services on sync changes.
async fn run_namespace_watch(
    api: Api<Namespace>,
    config: watcher::Config,
    services: Store<Service>,
    queue: Arc<WorkQueue>,
) -> Result<()> {
    info!("Starting Namespace watch");

    let mut tracker = NamespaceSyncTracker::new();
    let mut events = watcher::watcher(api, config).default_backoff().boxed();

    while let Some(event) = events.next().await {
        let event = match event {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "Namespace watch error, backing off");
                continue;
            }
        };

        if let Some(key) = key_for_event(&event) {
            queue.add(key);
        }

        let (namespace, was_synced) = match &event {
            Event::Apply(ns) | Event::InitApply(ns) => (ns, tracker.observe(ns)),
            Event::Delete(ns) => (ns, tracker.remove(ns).filter(|synced| *synced)),
            Event::Init | Event::InitDone => continue,
        };

        if let Some(was_synced) = was_synced {
            let name = namespace.name_any();
            let in_namespace: Vec<_> = services
                .state()
                .into_iter()
                .filter(|svc| svc.namespace().as_deref() == Some(name.as_str()))
                .collect();
            let keys = namespace_fanout_keys(was_synced, in_namespace.iter().map(Arc::as_ref));
            info!(
                namespace = %name,
                was_synced,
                services = keys.len(),
                "Namespace sync state changed, requeueing its services"
            );
            for key in keys {
                queue.add(key);
            }
        }
    }

    Ok(())
}

/// Watch ConfigMaps and enqueue kind keys.
async fn run_config_map_watch(api: Api<ConfigMap>, queue: Arc<WorkQueue>) -> Result<()> {
    info!("Starting ConfigMap watch");

    let mut events = watcher::watcher(api, watcher::Config::default())
        .default_backoff()
        .boxed();

    while let Some(event) = events.next().await {
        match event {
            Ok(event) => {
                if let Some(key) = key_for_event(&event) {
                    queue.add(key);
                }
            }
            Err(e) => warn!(error = %e, "ConfigMap watch error, backing off"),
        }
    }

    Ok(())
}

/// Periodically enqueue a resync key for every known Service.
async fn run_resync(
    period: Option<Duration>,
    services: Store<Service>,
    queue: Arc<WorkQueue>,
) -> Result<()> {
    let Some(period) = period else {
        info!("Resync disabled");
        return std::future::pending().await;
    };

    info!(period = ?period, "Starting resync loop");
    let mut ticker = tokio::time::interval(period);
    // The first tick completes immediately; the initial list already enqueued everything
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let state = services.state();
        let keys = resync_keys(state.iter().map(Arc::as_ref));
        debug!(keys = keys.len(), "Running resync pass");
        for key in keys {
            queue.add(key);
        }
    }
}

/// Pull keys from the queue and run them through the dispatcher.
async fn run_worker(id: usize, queue: Arc<WorkQueue>, dispatcher: ServiceDispatcher) {
    debug!(worker = id, "Queue worker started");

    while let Some(key) = queue.get().await {
        metrics::set_queue_depth(queue.len());

        let outcome = handle_key(&queue, &key, |item| dispatcher.dispatch(item));
        debug!(worker = id, key = %key, ?outcome, "Handled queue key");

        queue.done(&key);
    }

    debug!(worker = id, "Queue worker stopped");
}

/// Serve Prometheus metrics.
async fn serve_metrics(addr: SocketAddr) -> Result<()> {
    let app = Router::new().route(METRICS_SERVER_PATH, get(metrics_handler));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, path = METRICS_SERVER_PATH, "Serving metrics");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn metrics_handler() -> Result<String, (StatusCode, String)> {
    metrics::gather_metrics().map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}
