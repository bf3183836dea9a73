use crate::constants::RATE_LIMIT_SWEEP_INTERVAL_SECS;
use crate::rate_limit::RateLimiter;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;

/// Background task that drops expired rate limit windows
pub async fn start_sweep_task(limiter: Arc<RateLimiter>) {
    let mut interval = time::interval(Duration::from_secs(RATE_LIMIT_SWEEP_INTERVAL_SECS));

    tracing::info!(
        "🧹 Starting rate limit sweep (runs every {}s)",
        RATE_LIMIT_SWEEP_INTERVAL_SECS
    );

    loop {
        interval.tick().await;
        let removed = limiter.sweep();
        if removed > 0 {
            tracing::debug!("🗑️  Swept {} expired rate limit windows", removed);
        }
    }
}
