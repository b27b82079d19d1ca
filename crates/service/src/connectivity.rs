//! Outbound reachability probe run before each model call.

use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;

#[async_trait]
pub trait ConnectivityCheck: Send + Sync {
    /// `true` when the model provider is plausibly reachable. Never fails.
    async fn is_reachable(&self) -> bool;
}

/// Opens a TCP connection to a well-known endpoint with a bounded timeout.
#[derive(Debug, Clone)]
pub struct TcpConnectivityCheck {
    addr: String,
    timeout: Duration,
}

impl TcpConnectivityCheck {
    #[must_use]
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self { addr: addr.into(), timeout }
    }
}

#[async_trait]
impl ConnectivityCheck for TcpConnectivityCheck {
    async fn is_reachable(&self) -> bool {
        match tokio::time::timeout(self.timeout, TcpStream::connect(&self.addr)).await {
            Ok(Ok(_stream)) => {
                tracing::info!("Internet connection detected.");
                true
            },
            Ok(Err(e)) => {
                tracing::error!(addr = %self.addr, error = %e, "No internet connection detected.");
                false
            },
            Err(_) => {
                tracing::error!(addr = %self.addr, timeout = ?self.timeout, "Connectivity probe timed out.");
                false
            },
        }
    }
}

/// Always reachable. Used when the probe is disabled, e.g. for a local model endpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipConnectivityCheck;

#[async_trait]
impl ConnectivityCheck for SkipConnectivityCheck {
    async fn is_reachable(&self) -> bool {
        true
    }
}
