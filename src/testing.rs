//! Test support: an in-process axum server standing in for the MT5 bridge.

use axum::Router;

use crate::config::BridgeConfig;
use crate::engine::bridge::Mt5Client;

pub struct StubBroker {
    base_url: String,
}

impl StubBroker {
    /// Serve `router` on an ephemeral localhost port for the rest of the test.
    pub async fn spawn(router: Router) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Self { base_url: format!("http://{addr}") }
    }

    /// A base URL nothing listens on (connection refused).
    pub fn unreachable() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn config(&self) -> BridgeConfig {
        BridgeConfig::with_address(self.base_url.clone(), "0")
    }

    pub fn client(&self) -> Mt5Client {
        Mt5Client::with_base_url(reqwest::Client::new(), &self.base_url)
    }
}
