use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use tokio::task::JoinHandle;

use crate::config::{Credential, TlsOptions};
use crate::error::{NoxError, NoxResult};
use crate::observability::{Logger, TracingLogger};
use crate::webhook::handler::{router, WebhookHandler, WebhookState};
use crate::webhook::tls;

const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

enum ServerState {
    Stopped,
    Listening {
        addr: SocketAddr,
        secure: bool,
        handle: Handle,
        task: JoinHandle<io::Result<()>>,
    },
}

/// HTTP(S) listener for platform callbacks.
///
/// Every connection is served on its own task; the only state shared between
/// requests is the signing secret, the logger and the optional caller hook.
pub struct WebhookServer {
    secret: Credential,
    logger: Arc<dyn Logger>,
    handler: Option<Arc<dyn WebhookHandler>>,
    shutdown_grace: Duration,
    state: ServerState,
}

impl WebhookServer {
    pub fn new(secret: impl Into<Credential>) -> Self {
        Self {
            secret: secret.into(),
            logger: TracingLogger::shared("webhook"),
            handler: None,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
            state: ServerState::Stopped,
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Forward every accepted event to `handler`.
    pub fn with_handler(mut self, handler: Arc<dyn WebhookHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// How long `stop` waits for in-flight requests.
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    pub fn router(&self) -> Router {
        router(WebhookState {
            secret: self.secret.clone(),
            logger: self.logger.clone(),
            handler: self.handler.clone(),
        })
    }

    pub fn is_listening(&self) -> bool {
        matches!(self.state, ServerState::Listening { .. })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        match &self.state {
            ServerState::Listening { addr, .. } => Some(*addr),
            ServerState::Stopped => None,
        }
    }

    /// Bind `host:port` and start serving.
    ///
    /// TLS is used when `tls` carries both a certificate and a key; otherwise
    /// plain HTTP. Returns the bound address (useful with port 0). Fails with
    /// `Config` when the signing secret is blank.
    pub async fn start(
        &mut self,
        host: &str,
        port: u16,
        tls: Option<&TlsOptions>,
    ) -> NoxResult<SocketAddr> {
        if self.is_listening() {
            return Err(NoxError::server("webhook server is already listening"));
        }

        if self.secret.expose().trim().is_empty() {
            return Err(NoxError::config("webhook signing secret is empty"));
        }

        let addr = tokio::net::lookup_host((host, port))
            .await
            .map_err(|e| NoxError::server(format!("Cannot resolve {}:{}: {}", host, port, e)))?
            .next()
            .ok_or_else(|| NoxError::server(format!("No address for {}:{}", host, port)))?;

        let tls_config = match tls {
            Some(options) => tls::server_config(options)?,
            None => None,
        };
        let secure = tls_config.is_some();

        let app = self.router();
        let handle = Handle::new();

        let task = match tls_config {
            Some(config) => {
                let server = axum_server::bind_rustls(addr, RustlsConfig::from_config(config))
                    .handle(handle.clone());
                tokio::spawn(async move { server.serve(app.into_make_service()).await })
            }
            None => {
                let server = axum_server::bind(addr).handle(handle.clone());
                tokio::spawn(async move { server.serve(app.into_make_service()).await })
            }
        };

        let Some(bound) = handle.listening().await else {
            let reason = match task.await {
                Ok(Err(e)) => e.to_string(),
                Ok(Ok(())) => "listener closed".to_string(),
                Err(e) => e.to_string(),
            };
            return Err(NoxError::server(format!("Failed to bind {}: {}", addr, reason)));
        };

        self.logger.info(&format!(
            "Webhook server running at {}://{}",
            if secure { "https" } else { "http" },
            bound
        ));

        self.state = ServerState::Listening {
            addr: bound,
            secure,
            handle,
            task,
        };
        Ok(bound)
    }

    /// Stop accepting connections, drain in-flight requests, release the socket.
    ///
    /// No-op when the server is not listening.
    pub async fn stop(&mut self) -> NoxResult<()> {
        let ServerState::Listening {
            addr,
            secure,
            handle,
            task,
        } = std::mem::replace(&mut self.state, ServerState::Stopped)
        else {
            return Ok(());
        };

        self.logger.info(&format!(
            "Stopping webhook server at {} (tls: {}, open connections: {})",
            addr,
            secure,
            handle.connection_count()
        ));
        handle.graceful_shutdown(Some(self.shutdown_grace));

        match task.await {
            Ok(Ok(())) => {
                self.logger.info("Webhook server stopped");
                Ok(())
            }
            Ok(Err(e)) => Err(NoxError::server(format!("Webhook server failed: {}", e))),
            Err(e) => Err(NoxError::server(format!("Webhook server task failed: {}", e))),
        }
    }
}

impl Drop for WebhookServer {
    fn drop(&mut self) {
        if let ServerState::Listening { handle, .. } = &self.state {
            handle.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webhook::handler::LIVENESS_MESSAGE;

    #[tokio::test]
    async fn test_start_and_stop_plaintext() {
        let mut server = WebhookServer::new("secret").with_shutdown_grace(Duration::from_secs(1));
        assert!(!server.is_listening());

        let addr = server.start("127.0.0.1", 0, None).await.unwrap();
        assert_ne!(addr.port(), 0);
        assert_eq!(server.local_addr(), Some(addr));

        assert!(server.start("127.0.0.1", 0, None).await.is_err());

        server.stop().await.unwrap();
        assert!(!server.is_listening());
        server.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_bind_conflict_is_reported() {
        let mut first = WebhookServer::new("secret");
        let addr = first.start("127.0.0.1", 0, None).await.unwrap();

        let mut second = WebhookServer::new("secret");
        let result = second.start("127.0.0.1", addr.port(), None).await;
        assert!(matches!(result, Err(NoxError::Server { .. })));
        assert!(!second.is_listening());

        first.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_tls_with_missing_files_fails_before_binding() {
        let mut server = WebhookServer::new("secret");
        let options = TlsOptions::new("/nonexistent/cert.pem", "/nonexistent/key.pem");
        let result = server.start("127.0.0.1", 0, Some(&options)).await;
        assert!(matches!(result, Err(NoxError::Config { .. })));
        assert!(!server.is_listening());
    }

    #[tokio::test]
    async fn test_blank_secret_refuses_to_start() {
        for secret in ["", "  "] {
            let mut server = WebhookServer::new(secret);
            let result = server.start("127.0.0.1", 0, None).await;
            assert!(matches!(result, Err(NoxError::Config { .. })));
            assert!(!server.is_listening());
        }
    }

    #[tokio::test]
    async fn test_serves_https_with_certificate_and_key() {
        let dir = tempfile::tempdir().unwrap();
        let identity =
            rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
        let cert_path = dir.path().join("cert.pem");
        let key_path = dir.path().join("key.pem");
        std::fs::write(&cert_path, identity.cert.pem()).unwrap();
        std::fs::write(&key_path, identity.key_pair.serialize_pem()).unwrap();

        let mut server = WebhookServer::new("secret").with_shutdown_grace(Duration::from_secs(1));
        let options = TlsOptions::new(cert_path.clone(), key_path.clone());
        let addr = server.start("127.0.0.1", 0, Some(&options)).await.unwrap();

        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .build()
            .unwrap();
        let response = client
            .get(format!("https://{}/", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["message"], LIVENESS_MESSAGE);

        server.stop().await.unwrap();
    }
}
