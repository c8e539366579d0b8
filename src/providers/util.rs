use anyhow::Result;
use std::time::Duration;

/// Builds the shared HTTP client. Without a timeout the platform default
/// applies and a hung request only leaves stale rates in place.
pub fn build_client(timeout: Option<Duration>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent("tripfx/0.1");
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}
