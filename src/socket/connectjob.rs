use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use crate::socket::client::SocketType;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;

/// Manages the connection process: DNS -> TCP -> TLS.
#[derive(Debug, Clone, Default)]
pub struct ConnectJob {
    tls_config: Option<Arc<ClientConfig>>,
}

impl ConnectJob {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a caller-built TLS configuration instead of the webpki roots.
    pub fn with_tls_config(config: Arc<ClientConfig>) -> Self {
        Self {
            tls_config: Some(config),
        }
    }

    /// Connect to `host:port`. IPv6 literals may be given with or without
    /// brackets.
    pub async fn connect(&self, host: &str, port: u16, tls: bool) -> Result<SocketType, NetError> {
        let host = host.trim_start_matches('[').trim_end_matches(']');

        // 1. DNS Resolution
        let addrs: Vec<_> = tokio::net::lookup_host((host, port))
            .await
            .dns_context(host)?
            .collect();

        // 2. TCP Connect, first address that answers wins
        let mut last_err = None;
        let mut stream = None;
        for addr in addrs {
            match TcpStream::connect(addr).await {
                Ok(s) => {
                    stream = Some(s);
                    break;
                }
                Err(e) => last_err = Some(e),
            }
        }
        let stream = match stream {
            Some(s) => s,
            None => {
                let err = last_err.unwrap_or_else(|| {
                    std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses resolved")
                });
                return Err(err).connection_context(host, port);
            }
        };
        let _ = stream.set_nodelay(true);

        tracing::debug!(host = %host, port, tls, "connected");

        if !tls {
            return Ok(SocketType::Tcp(stream));
        }

        // 3. TLS Handshake
        let config = match &self.tls_config {
            Some(config) => config.clone(),
            None => default_tls_config()?,
        };
        let server_name = ServerName::try_from(host.to_string()).map_err(NetError::transport)?;
        let tls_stream = TlsConnector::from(config)
            .connect(server_name, stream)
            .await
            .connection_context(host, port)?;

        Ok(SocketType::Tls(Box::new(tls_stream)))
    }
}

fn default_tls_config() -> Result<Arc<ClientConfig>, NetError> {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let provider = Arc::new(tokio_rustls::rustls::crypto::ring::default_provider());
    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(NetError::transport)?
        .with_root_certificates(roots)
        .with_no_client_auth();

    Ok(Arc::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_connect_plain() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let _ = listener.accept().await;
        });

        let socket = ConnectJob::new().connect("127.0.0.1", port, false).await.unwrap();
        assert!(!socket.is_tls());
    }

    #[tokio::test]
    async fn test_connect_ipv6_literal() {
        // Hosts without IPv6 loopback have nothing to test.
        let Ok(listener) = TcpListener::bind("[::1]:0").await else {
            return;
        };
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let _ = listener.accept().await;
            let _ = listener.accept().await;
        });

        let job = ConnectJob::new();
        assert!(job.connect("::1", port, false).await.is_ok());
        assert!(job.connect("[::1]", port, false).await.is_ok());
    }

    #[tokio::test]
    async fn test_connect_refused_is_transport_error() {
        // Bind then drop to get a port nobody listens on.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let err = ConnectJob::new()
            .connect("127.0.0.1", port, false)
            .await
            .unwrap_err();
        assert!(matches!(err, NetError::TransportError(_)));
        assert!(err.to_string().contains(&format!("127.0.0.1:{port}")));
    }

    #[test]
    fn test_default_tls_config_builds() {
        let config = default_tls_config().unwrap();
        assert!(config.alpn_protocols.is_empty());
    }
}
