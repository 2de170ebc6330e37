use crate::config::Config;
use crate::constants::{DEFAULT_DNS_PORT, REPLY_BUFFER_SIZE};
use crate::errors::{ProbeError, Result};
use crate::query::{DnsQuery, TransactionId};
use crate::reply::DnsReply;
use crate::transport::{Connector, Datagram, UdpConnector};
use std::io;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Sends one `version.bind` query and scrapes the answer.
///
/// Every call owns its socket; it is dropped before `query` returns, whether
/// the exchange succeeded, failed, or ran out of time.
pub struct VersionProbe<C = UdpConnector> {
    connector: C,
    timeout: Duration,
    port: u16,
    transaction_id: TransactionId,
}

impl VersionProbe<UdpConnector> {
    pub fn new(timeout: Duration) -> Self {
        Self::with_connector(UdpConnector, timeout)
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.timeout())
            .port(config.port)
            .transaction_id(config.transaction_id())
    }
}

impl<C: Connector> VersionProbe<C> {
    pub fn with_connector(connector: C, timeout: Duration) -> Self {
        Self {
            connector,
            timeout,
            port: DEFAULT_DNS_PORT,
            transaction_id: TransactionId::default(),
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn transaction_id(mut self, transaction_id: TransactionId) -> Self {
        self.transaction_id = transaction_id;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Query `host` and return the printable payload of its reply
    pub async fn query(&self, host: &str) -> Result<String> {
        if host.is_empty() {
            return Err(ProbeError::ConnectionRefused("empty host".to_string()));
        }

        let query = DnsQuery::version_bind(self.transaction_id.resolve());
        let started = Instant::now();

        let reply = match timeout(self.timeout, self.exchange(host, &query)).await {
            Ok(reply) => reply.map_err(|e| {
                warn!("version.bind query to {} failed: {}", host, e);
                e
            })?,
            Err(_) => {
                warn!(
                    "No reply from {}:{} within {:?}",
                    host, self.port, self.timeout
                );
                return Err(ProbeError::TimedOut(self.timeout));
            }
        };

        if let Some(header) = reply.header() {
            if header.id != query.id() {
                debug!(
                    "Reply transaction ID {:#06x} differs from query ID {:#06x}",
                    header.id,
                    query.id()
                );
            }
            debug!(
                "Reply header: flags={:#06x} rcode={} answers={}",
                header.flags,
                header.response_code(),
                header.answer_count
            );
        }

        let version = reply.version_text(query.scrape_offset());
        info!(
            host = host,
            bytes = reply.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "version.bind answered: {:?}",
            version
        );
        Ok(version)
    }

    async fn exchange(&self, host: &str, query: &DnsQuery) -> Result<DnsReply> {
        let channel = self
            .connector
            .connect(host, self.port)
            .await
            .map_err(|e| ProbeError::ConnectionRefused(format!("{}:{}: {}", host, self.port, e)))?;

        let sent = channel
            .send(query.as_bytes())
            .await
            .map_err(|e| ProbeError::ConnectionRefused(format!("{}:{}: {}", host, self.port, e)))?;
        debug!("Sent {} bytes to {}: {}", sent, host, query);

        let mut buf = [0u8; REPLY_BUFFER_SIZE];
        let len = channel
            .recv(&mut buf)
            .await
            .map_err(|e| self.classify_recv_error(host, e))?;

        let reply = DnsReply::new(&buf[..len]);
        debug!("Received {} bytes from {}: {:02x?}", len, host, reply.as_bytes());
        Ok(reply)
    }

    fn classify_recv_error(&self, host: &str, err: io::Error) -> ProbeError {
        match err.kind() {
            io::ErrorKind::ConnectionRefused => {
                ProbeError::ConnectionRefused(format!("{}:{}: {}", host, self.port, err))
            }
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
                ProbeError::TimedOut(self.timeout)
            }
            _ => ProbeError::Transport(err),
        }
    }
}

/// Query `host` on port 53 over UDP
pub async fn query_version(host: &str, timeout: Duration) -> Result<String> {
    VersionProbe::new(timeout).query(host).await
}
