/*!
 * TCP reference driver
 *
 * A minimal `ConnectionFactory` that opens a TCP connection to the first
 * reachable seed server. It speaks no wire protocol; it exists so the
 * lifecycle manager can be run and observed against real sockets.
 */

use anyhow::anyhow;
use hydrate_connect::{Connection, ConnectionFactory, ConnectionPolicy};
use hydrate_core_discovery::ServerAddress;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, info};

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Handle to a collection served through a `TcpConnection`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionHandle {
    pub connection_id: u64,
    pub server: ServerAddress,
    pub database: String,
    pub collection: String,
    pub policy: ConnectionPolicy,
}

/// A TCP connection to one member server
#[derive(Debug)]
pub struct TcpConnection {
    id: u64,
    server: ServerAddress,
    policy: ConnectionPolicy,
    stream: Mutex<Option<TcpStream>>,
}

impl TcpConnection {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn server(&self) -> &ServerAddress {
        &self.server
    }

    pub fn policy(&self) -> ConnectionPolicy {
        self.policy
    }

    /// False once `close()` ran
    pub async fn is_open(&self) -> bool {
        self.stream.lock().await.is_some()
    }
}

#[async_trait::async_trait]
impl Connection for TcpConnection {
    type Resource = CollectionHandle;

    fn resource(&self, database: &str, name: &str) -> CollectionHandle {
        CollectionHandle {
            connection_id: self.id,
            server: self.server.clone(),
            database: database.to_string(),
            collection: name.to_string(),
            policy: self.policy,
        }
    }

    async fn close(&self) {
        if let Some(mut stream) = self.stream.lock().await.take() {
            if let Err(e) = stream.shutdown().await {
                debug!("Shutdown of connection {} to {} failed: {}", self.id, self.server, e);
            }
            info!("Closed connection {} to {}", self.id, self.server);
        }
    }
}

/// Connects to the first reachable seed, in the order given
#[derive(Debug, Clone)]
pub struct TcpDriver {
    connect_timeout: Duration,
}

impl TcpDriver {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }

    async fn dial(&self, server: &ServerAddress) -> anyhow::Result<TcpStream> {
        let target = (server.host.as_str(), server.port);
        match tokio::time::timeout(self.connect_timeout, TcpStream::connect(target)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(anyhow!("{}: {}", server, e)),
            Err(_) => Err(anyhow!("{}: timed out after {:?}", server, self.connect_timeout)),
        }
    }
}

impl Default for TcpDriver {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

#[async_trait::async_trait]
impl ConnectionFactory<TcpConnection> for TcpDriver {
    async fn connect(
        &self,
        servers: &[ServerAddress],
        policy: &ConnectionPolicy,
    ) -> anyhow::Result<TcpConnection> {
        let mut failures = Vec::new();

        for server in servers {
            match self.dial(server).await {
                Ok(stream) => {
                    let id = NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed);
                    info!("Opened connection {} to {}", id, server);
                    return Ok(TcpConnection {
                        id,
                        server: server.clone(),
                        policy: *policy,
                        stream: Mutex::new(Some(stream)),
                    });
                }
                Err(e) => {
                    debug!("Seed unreachable: {}", e);
                    failures.push(e.to_string());
                }
            }
        }

        Err(anyhow!("no reachable server ({})", failures.join("; ")))
    }
}
