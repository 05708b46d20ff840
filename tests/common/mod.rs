//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;

use tokio::net::TcpListener;

use response_engine::config::ApiConfig;
use response_engine::gateway::GatewayResponses;
use response_engine::routing::RouteTable;
use response_engine::{ApiServer, Shutdown};

/// A running emulator bound to an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the emulator for `table` and return once it is accepting connections.
pub async fn start_server(config: ApiConfig, table: RouteTable, gateway: GatewayResponses) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = ApiServer::new(config, table, gateway);
    let stop = shutdown.signalled();

    tokio::spawn(async move {
        server.run(listener, stop).await.unwrap();
    });

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestServer { addr, client, shutdown }
}
