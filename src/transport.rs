use async_trait::async_trait;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::net::{lookup_host, UdpSocket};
use tracing::debug;

/// Opens a connected datagram channel to a host
#[async_trait]
pub trait Connector: Send + Sync {
    type Channel: Datagram;

    async fn connect(&self, host: &str, port: u16) -> io::Result<Self::Channel>;
}

/// One connected datagram socket. Dropping it closes the socket.
#[async_trait]
pub trait Datagram: Send + Sync {
    async fn send(&self, payload: &[u8]) -> io::Result<usize>;

    async fn recv(&self, buf: &mut [u8]) -> io::Result<usize>;
}

/// UDP connector backed by tokio sockets
#[derive(Debug, Clone, Copy, Default)]
pub struct UdpConnector;

#[async_trait]
impl Connector for UdpConnector {
    type Channel = UdpChannel;

    async fn connect(&self, host: &str, port: u16) -> io::Result<UdpChannel> {
        let peer = lookup_host((host, port)).await?.next().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no address found for {}", host),
            )
        })?;

        let local: SocketAddr = match peer {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };
        let socket = UdpSocket::bind(local).await?;
        socket.connect(peer).await?;
        debug!("UDP socket {} connected to {}", socket.local_addr()?, peer);

        Ok(UdpChannel { socket, peer })
    }
}

#[derive(Debug)]
pub struct UdpChannel {
    socket: UdpSocket,
    peer: SocketAddr,
}

impl UdpChannel {
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }
}

#[async_trait]
impl Datagram for UdpChannel {
    async fn send(&self, payload: &[u8]) -> io::Result<usize> {
        self.socket.send(payload).await
    }

    async fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        self.socket.recv(buf).await
    }
}

impl Drop for UdpChannel {
    fn drop(&mut self) {
        debug!("Closing UDP socket to {}", self.peer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_udp_connect_loopback() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = server.local_addr().unwrap().port();

        let channel = UdpConnector.connect("127.0.0.1", port).await.unwrap();
        assert_eq!(channel.peer(), server.local_addr().unwrap());

        assert_eq!(channel.send(b"ping").await.unwrap(), 4);
        let mut buf = [0u8; 16];
        let (len, from) = server.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..len], b"ping");

        server.send_to(b"pong", from).await.unwrap();
        let len = channel.recv(&mut buf).await.unwrap();
        assert_eq!(&buf[..len], b"pong");
    }

    #[tokio::test]
    async fn test_unresolvable_host_fails() {
        let result = UdpConnector.connect("name.invalid.", 53).await;
        assert!(result.is_err());
    }
}
