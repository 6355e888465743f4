use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::error::{DhtError, Result};
use crate::DhtReader;

const CONTENT_TYPE: &str = "text/json";

/// Answers every request with one fresh sensor reading
#[derive(Clone)]
pub struct MeasurementService {
    sensor: Arc<Mutex<dyn DhtReader + Send>>,
}

impl MeasurementService {
    pub fn new<S>(sensor: S) -> Self
    where
        S: DhtReader + Send + 'static,
    {
        Self {
            sensor: Arc::new(Mutex::new(sensor)),
        }
    }

    /// Every method and path is served by the same handler
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", any(measure))
            .fallback(measure)
            .with_state(self.clone())
    }

    /// Reads the sensor once on the blocking pool and returns the JSON body
    pub async fn measure(&self) -> Result<String> {
        let sensor = Arc::clone(&self.sensor);
        let measurement = tokio::task::spawn_blocking(move || {
            let mut sensor = sensor.lock().map_err(|_| DhtError::LockPoisoned)?;
            sensor.read()
        })
        .await
        .map_err(|e| DhtError::Task(e.to_string()))??;

        let body = serde_json::to_string(&measurement)?;
        info!("Measured: {measurement:?}");
        Ok(body)
    }
}

async fn measure(State(service): State<MeasurementService>) -> Response {
    // Failures are reported in the body, the status stays 200
    let body = match service.measure().await {
        Ok(body) => body,
        Err(err) => {
            warn!("Failed: {err}");
            error_body(&err)
        }
    };
    ([(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response()
}

fn error_body(err: &DhtError) -> String {
    serde_json::json!({ "err": err.to_string() }).to_string()
}

/// Binds `addr` and serves `service` until the process exits
pub async fn serve(addr: &str, service: MeasurementService) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| DhtError::Bind {
            addr: addr.to_string(),
            source,
        })?;
    info!("Listening from {addr}");

    axum::serve(listener, service.router())
        .await
        .map_err(DhtError::Serve)
}
