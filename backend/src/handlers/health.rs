//! Health check handler

/// Health check endpoint for load balancers and monitoring
pub async fn health_check() -> &'static str {
    "OK"
}
