//! HTTP front end: binds the socket, then serves one task per connection.

use crate::config::Config;
use crate::dispatch::dispatch;
use crate::error::Result;
use crate::state::AppState;
use axum::{Router, routing::get};
use log::info;
use std::net::{IpAddr, SocketAddr};
use tokio::net::TcpListener;

/// The router: every `GET` goes through the dispatcher.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dispatch))
        .route("/*path", get(dispatch))
        .with_state(state)
}

/// A bound but not yet running server.
pub struct Server {
    listener: TcpListener,
    state: AppState,
}

impl Server {
    /// Binds the configured address and builds the component graph.
    ///
    /// Binding comes first so the PDF renderer's base URL can use the real
    /// port when `server.port` is 0.
    pub async fn bind(config: &Config) -> Result<Self> {
        let listener =
            TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
        let addr = listener.local_addr()?;
        let base_url = config
            .server
            .public_url
            .clone()
            .unwrap_or_else(|| base_url_for(addr));
        let state = AppState::from_config(config, base_url)?;
        Ok(Self { listener, state })
    }

    pub fn base_url(&self) -> &str {
        &self.state.base_url
    }

    /// Serves until Ctrl-C. Each connection runs on its own task, so a slow
    /// PDF conversion never holds up other requests.
    pub async fn serve(self) -> Result<()> {
        info!("Listening on {}", self.base_url());
        axum::serve(self.listener, router(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

/// `http://host:port` for a bound address; wildcard hosts become
/// `localhost`.
pub fn base_url_for(addr: SocketAddr) -> String {
    let host = match addr.ip() {
        ip if ip.is_unspecified() => "localhost".to_string(),
        IpAddr::V6(ip) => format!("[{ip}]"),
        IpAddr::V4(ip) => ip.to_string(),
    };
    format!("http://{host}:{}", addr.port())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_hosts_map_to_localhost() {
        assert_eq!(
            base_url_for("0.0.0.0:8080".parse().unwrap()),
            "http://localhost:8080"
        );
        assert_eq!(
            base_url_for("[::]:9000".parse().unwrap()),
            "http://localhost:9000"
        );
        assert_eq!(
            base_url_for("127.0.0.1:3000".parse().unwrap()),
            "http://127.0.0.1:3000"
        );
        assert_eq!(base_url_for("[::1]:3000".parse().unwrap()), "http://[::1]:3000");
    }
}
