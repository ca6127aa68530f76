use crate::config::GradesConfig;
use crate::handlers;
use crate::services::MongoDb;
use axum::{
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use std::future::IntoFuture;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub db: MongoDb,
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
    state: AppState,
}

impl Application {
    /// Connects, runs the maintenance routines, then binds the listener.
    ///
    /// The listener is only bound after maintenance finishes, so no request
    /// can observe the collection before indexes and the validator are in
    /// place. A failed connection aborts startup; a failed maintenance
    /// routine is logged and skipped.
    pub async fn build(config: GradesConfig) -> Result<Self, AppError> {
        let db = MongoDb::connect(&config.mongodb.uri, &config.mongodb.database)
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to MongoDB: {}", e);
                e
            })?;

        if let Err(e) = db.initialize_indexes().await {
            tracing::warn!(error = %e, "Index creation failed; continuing startup");
        }
        if let Err(e) = db.install_validator().await {
            tracing::warn!(error = %e, "Validator installation failed; continuing startup");
        }

        let state = AppState { db: db.clone() };

        let app = Router::new()
            .route("/", get(handlers::liveness))
            .route("/health", get(handlers::health_check))
            .route("/ready", get(handlers::readiness_check))
            .route("/metrics", get(handlers::metrics_endpoint))
            .route("/grades/stats", get(handlers::overall_stats))
            .route("/grades/stats/:id", get(handlers::class_stats))
            .route("/grades/debug", get(handlers::debug_sample))
            .route("/grades/test-validation", post(handlers::test_validation))
            .layer(TraceLayer::new_for_http())
            .with_state(state.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
            state,
        })
    }

    pub fn db(&self) -> &MongoDb {
        &self.state.db
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
