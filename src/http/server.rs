//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, limits, request ID, security headers)
//! - Bind server to a TCP or TLS listener
//! - Apply hot-reloaded configuration
//! - Observability (metrics, correlation IDs)

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    http::Request,
    middleware::{self, Next},
    response::Response,
    Router,
};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::setup_admin_router;
use crate::api::{self, ChatHub};
use crate::blockchain::{BlockchainClient, StreakContract};
use crate::config::AppConfig;
use crate::http::request::request_id;
use crate::net::load_tls_config;
use crate::observability::metrics;
use crate::prayer::PrayerScheduler;
use crate::security::security_header_layers;
use crate::store::GuildStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Live configuration, swapped on reload.
    pub config: Arc<ArcSwap<AppConfig>>,
    pub store: GuildStore,
    pub chat: ChatHub,
    pub prayer: Option<Arc<PrayerScheduler>>,
    pub chain: Option<BlockchainClient>,
    /// Read access to the streak contract for member prayer views.
    pub streaks: Option<Arc<dyn StreakContract>>,
}

impl AppState {
    pub fn new(config: AppConfig, store: GuildStore) -> Self {
        let chat = ChatHub::new(config.guilds.chat_buffer);
        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            store,
            chat,
            prayer: None,
            chain: None,
            streaks: None,
        }
    }

    pub fn with_prayer(mut self, scheduler: Arc<PrayerScheduler>) -> Self {
        self.prayer = Some(scheduler);
        self
    }

    pub fn with_chain(mut self, client: BlockchainClient) -> Self {
        self.chain = Some(client);
        self
    }

    pub fn with_streaks(mut self, contract: Arc<dyn StreakContract>) -> Self {
        self.streaks = Some(contract);
        self
    }
}

/// HTTP server for the guild API.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    pub fn new(state: AppState) -> Self {
        let router = Self::build_router(&state);
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: &AppState) -> Router {
        let config = state.config.load_full();

        let mut routes = api::router();
        if config.admin.enabled {
            routes = routes.merge(setup_admin_router(state.clone()));
        }

        let mut router = routes
            .with_state(state.clone())
            .layer(middleware::from_fn(track_metrics))
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

        if config.security.enable_headers {
            for layer in security_header_layers() {
                router = router.layer(layer);
            }
        }

        router.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Swap in each reloaded configuration as it arrives.
    ///
    /// Per-request settings (auth secret, admin key, guild defaults) apply
    /// immediately; listener and middleware settings need a restart.
    pub fn apply_config_updates(&self, mut updates: mpsc::UnboundedReceiver<AppConfig>) -> JoinHandle<()> {
        let config = self.state.config.clone();
        tokio::spawn(async move {
            while let Some(new_config) = updates.recv().await {
                let old = config.load();
                if old.listener.bind_address != new_config.listener.bind_address
                    || old.timeouts.request_secs != new_config.timeouts.request_secs
                {
                    tracing::warn!("Listener and timeout changes take effect after restart");
                }
                config.store(Arc::new(new_config));
                tracing::info!("Configuration applied");
            }
        })
    }

    /// Serve plain HTTP until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Serve HTTPS until `shutdown` fires.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        cert_path: &str,
        key_path: &str,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let tls = load_tls_config(Path::new(cert_path), Path::new(key_path)).await?;
        let grace = Duration::from_secs(self.state.config.load().timeouts.shutdown_grace_secs);

        let handle = axum_server::Handle::new();
        let shutdown_handle = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            shutdown_handle.graceful_shutdown(Some(grace));
        });

        tracing::info!(address = %addr, "HTTPS server starting");
        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}

async fn track_metrics(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let id = request_id(request.headers()).map(str::to_string);

    let response = next.run(request).await;
    let status = response.status();
    metrics::record_request(&method, status.as_u16(), start);

    if status.is_server_error() {
        tracing::warn!(
            request_id = id.as_deref().unwrap_or("unknown"),
            method = %method,
            path = %path,
            status = status.as_u16(),
            "Request failed"
        );
    }
    response
}
