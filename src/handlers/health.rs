//! Liveness and database readiness check.

use std::time::Instant;

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::DbPool;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `healthy` or `degraded`
    pub status: &'static str,
    pub version: &'static str,
    pub database: DatabaseHealth,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct DatabaseHealth {
    pub connected: bool,
    /// Round trip of the ping, absent when it failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    pub pool_size: u32,
    pub idle_connections: usize,
}

/// `GET /health`
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": { "connected": true, "latency_ms": 2, "pool_size": 3, "idle_connections": 2 },
///   "timestamp": "2025-01-15T08:00:00Z"
/// }
/// ```
///
/// Answers 503 with `"status": "degraded"` when the database ping fails.
pub async fn health_check(State(pool): State<DbPool>) -> (StatusCode, Json<HealthResponse>) {
    let started = Instant::now();
    let ping = sqlx::query("SELECT 1").execute(&pool).await;

    let (status_code, status, latency_ms) = match ping {
        Ok(_) => (
            StatusCode::OK,
            "healthy",
            Some(u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)),
        ),
        Err(e) => {
            tracing::warn!("Health check database ping failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", None)
        }
    };

    let body = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        database: DatabaseHealth {
            connected: latency_ms.is_some(),
            latency_ms,
            pool_size: pool.size(),
            idle_connections: pool.num_idle(),
        },
        timestamp: Utc::now(),
    };

    (status_code, Json(body))
}
