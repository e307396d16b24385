//! Server module for running Terraform providers
//!
//! This module starts the provider's gRPC server and performs the go-plugin
//! handshake Terraform expects on stdout. Logs go to stderr.
//!
//! go-plugin AutoMTLS is not supported: the server never generates its own
//! certificate and the handshake line carries no certificate field. TLS is
//! used only when the configured certificate and key files exist, otherwise
//! the server listens in plaintext on the loopback interface. Terraform
//! accepts a handshake without a certificate and then dials plaintext.

use crate::error::{Result, TfplugError};
use crate::grpc::GrpcProviderServer;
use crate::proto::provider_server::ProviderServer;
use crate::provider::Provider;
use std::path::PathBuf;
use tonic::transport::{Identity, Server, ServerTlsConfig};

/// Environment variable Terraform sets when launching a plugin
pub const MAGIC_COOKIE_KEY: &str = "TF_PLUGIN_MAGIC_COOKIE";

/// Expected value of the magic cookie
pub const MAGIC_COOKIE_VALUE: &str =
    "d602bf8f470bc67ca7faa0386276bbdd4330efaf76d1a219cb4d6991ca9872b2";

/// Set by Terraform when it asks the plugin to negotiate AutoMTLS
pub const CLIENT_CERT_ENV_VAR: &str = "PLUGIN_CLIENT_CERT";

/// Protocol versions announced in the handshake line
const CORE_PROTOCOL_VERSION: u32 = 1;
const PLUGIN_PROTOCOL_VERSION: u32 = 6;

/// Log level for the server
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse Terraform's TF_LOG values. JSON output maps to trace since
    /// Terraform uses it for the most verbose logging.
    pub fn from_tf_log(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "TRACE" | "JSON" => Some(LogLevel::Trace),
            "DEBUG" => Some(LogLevel::Debug),
            "INFO" => Some(LogLevel::Info),
            "WARN" => Some(LogLevel::Warn),
            "ERROR" => Some(LogLevel::Error),
            _ => None,
        }
    }

    fn as_tracing(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Server configuration for running a Terraform provider
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Path to TLS certificate file. TLS is used only when both files exist.
    pub cert_path: PathBuf,
    /// Path to TLS key file
    pub key_path: PathBuf,
    /// Maximum message size in bytes
    pub max_message_size: usize,
    /// Whether to install the stderr log subscriber
    pub enable_logging: bool,
    /// Log level, overridden by TF_LOG when set
    pub log_level: LogLevel,
    /// Whether to require the magic cookie from Terraform
    pub require_magic_cookie: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            cert_path: PathBuf::from("./certs/localhost.pem"),
            key_path: PathBuf::from("./certs/localhost-key.pem"),
            max_message_size: 256 << 20, // 256MB
            enable_logging: true,
            log_level: LogLevel::Info,
            require_magic_cookie: true,
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cert_path(mut self, path: PathBuf) -> Self {
        self.cert_path = path;
        self
    }

    pub fn with_key_path(mut self, path: PathBuf) -> Self {
        self.key_path = path;
        self
    }

    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    pub fn without_logging(mut self) -> Self {
        self.enable_logging = false;
        self
    }

    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Skip the magic cookie check, for running the binary by hand
    pub fn without_magic_cookie(mut self) -> Self {
        self.require_magic_cookie = false;
        self
    }

    /// Level from TF_LOG, or the configured level
    pub fn effective_log_level(&self) -> LogLevel {
        std::env::var("TF_LOG")
            .ok()
            .and_then(|v| LogLevel::from_tf_log(&v))
            .unwrap_or(self.log_level)
    }
}

/// Format the go-plugin handshake line
pub fn handshake_line(addr: std::net::SocketAddr) -> String {
    format!(
        "{}|{}|tcp|{}|grpc",
        CORE_PROTOCOL_VERSION, PLUGIN_PROTOCOL_VERSION, addr
    )
}

/// True when Terraform offered a client certificate for AutoMTLS
fn auto_mtls_requested() -> bool {
    std::env::var(CLIENT_CERT_ENV_VAR).is_ok_and(|cert| !cert.trim().is_empty())
}

fn check_magic_cookie() -> Result<()> {
    match std::env::var(MAGIC_COOKIE_KEY) {
        Ok(value) if value == MAGIC_COOKIE_VALUE => Ok(()),
        _ => Err(TfplugError::Handshake(
            "This binary is a plugin. These are not meant to be executed directly. \
             Please execute the program that consumes these plugins, which will \
             load any plugins automatically"
                .to_string(),
        )),
    }
}

fn init_logging(level: LogLevel) {
    // Another subscriber may already be installed, e.g. by tests
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level.as_tracing())
        .with_target(false)
        .with_ansi(false)
        .try_init();
}

async fn load_tls(config: &ServerConfig) -> Result<Option<ServerTlsConfig>> {
    if !config.cert_path.exists() || !config.key_path.exists() {
        return Ok(None);
    }

    let cert = tokio::fs::read(&config.cert_path)
        .await
        .map_err(|e| TfplugError::TlsError(format!("Failed to read certificate: {}", e)))?;
    let key = tokio::fs::read(&config.key_path)
        .await
        .map_err(|e| TfplugError::TlsError(format!("Failed to read key: {}", e)))?;

    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
    Ok(Some(ServerTlsConfig::new().identity(Identity::from_pem(cert, key))))
}

/// Main entry point for running a provider
pub async fn serve<P: Provider + 'static>(provider: P, config: ServerConfig) -> Result<()> {
    if config.enable_logging {
        init_logging(config.effective_log_level());
    }

    if config.require_magic_cookie {
        check_magic_cookie()?;
    }

    let provider_service = ProviderServer::new(GrpcProviderServer::new(provider))
        .max_decoding_message_size(config.max_message_size)
        .max_encoding_message_size(config.max_message_size);

    if auto_mtls_requested() {
        tracing::warn!(
            "{} is set but AutoMTLS is not supported; using file-based TLS or plaintext",
            CLIENT_CERT_ENV_VAR
        );
    }
    let tls = load_tls(&config).await?;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let mut builder = Server::builder();
    if let Some(tls) = tls {
        tracing::debug!("serving with TLS");
        builder = builder.tls_config(tls)?;
    } else {
        tracing::debug!("no certificate found, serving plaintext");
    }

    println!("{}", handshake_line(addr));
    tracing::info!(%addr, "provider server listening");

    let incoming = tokio_stream::wrappers::TcpListenerStream::new(listener);
    builder
        .add_service(provider_service)
        .serve_with_incoming_shutdown(incoming, async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
        })
        .await?;

    Ok(())
}

/// Convenience function to run a provider with default configuration
pub async fn serve_default<P: Provider + 'static>(provider: P) -> Result<()> {
    serve(provider, ServerConfig::default()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn handshake_line_uses_protocol_six() {
        let addr: std::net::SocketAddr = "127.0.0.1:43210".parse().unwrap();
        assert_eq!(handshake_line(addr), "1|6|tcp|127.0.0.1:43210|grpc");
    }

    #[test]
    fn tf_log_values_parse_case_insensitively() {
        assert_eq!(LogLevel::from_tf_log("debug"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::from_tf_log("JSON"), Some(LogLevel::Trace));
        assert_eq!(LogLevel::from_tf_log("off"), None);
    }

    #[test]
    #[serial]
    fn tf_log_overrides_configured_level() {
        std::env::set_var("TF_LOG", "WARN");
        let config = ServerConfig::new().with_log_level(LogLevel::Debug);
        assert_eq!(config.effective_log_level(), LogLevel::Warn);

        std::env::remove_var("TF_LOG");
        assert_eq!(config.effective_log_level(), LogLevel::Debug);
    }

    #[test]
    #[serial]
    fn magic_cookie_must_match() {
        std::env::remove_var(MAGIC_COOKIE_KEY);
        assert!(matches!(check_magic_cookie(), Err(TfplugError::Handshake(_))));

        std::env::set_var(MAGIC_COOKIE_KEY, MAGIC_COOKIE_VALUE);
        assert!(check_magic_cookie().is_ok());
        std::env::remove_var(MAGIC_COOKIE_KEY);
    }

    #[tokio::test]
    #[serial]
    async fn client_certificate_does_not_change_the_handshake() {
        std::env::set_var(CLIENT_CERT_ENV_VAR, "-----BEGIN CERTIFICATE-----");
        assert!(auto_mtls_requested());

        let addr: std::net::SocketAddr = "127.0.0.1:43210".parse().unwrap();
        let line = handshake_line(addr);
        assert_eq!(line.split('|').count(), 5);
        assert!(line.ends_with("|grpc"));

        let config = ServerConfig::new()
            .with_cert_path(PathBuf::from("/nonexistent/cert.pem"))
            .with_key_path(PathBuf::from("/nonexistent/key.pem"));
        assert!(load_tls(&config).await.unwrap().is_none());

        std::env::set_var(CLIENT_CERT_ENV_VAR, "  ");
        assert!(!auto_mtls_requested());
        std::env::remove_var(CLIENT_CERT_ENV_VAR);
        assert!(!auto_mtls_requested());
    }

    #[tokio::test]
    async fn missing_certificates_mean_plaintext() {
        let config = ServerConfig::new()
            .with_cert_path(PathBuf::from("/nonexistent/cert.pem"))
            .with_key_path(PathBuf::from("/nonexistent/key.pem"));
        assert!(load_tls(&config).await.unwrap().is_none());
    }
}
