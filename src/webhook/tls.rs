//! rustls configuration for the webhook listener.
//!
//! Peer verification applies to client certificates: with `verify_peer` on,
//! `allow_self_signed` off and a `client_ca` bundle configured, any
//! certificate a client presents must chain to that bundle. Clients that
//! present none are still accepted, since the platform does not use mutual TLS.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::server::WebPkiClientVerifier;
use rustls::{RootCertStore, ServerConfig};

use crate::config::TlsOptions;
use crate::error::{NoxError, NoxResult};

fn load_certs(path: &Path) -> NoxResult<Vec<CertificateDer<'static>>> {
    let file = File::open(path).map_err(|e| {
        NoxError::config(format!("Cannot open certificate {}: {}", path.display(), e))
    })?;
    let certs = rustls_pemfile::certs(&mut BufReader::new(file))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            NoxError::config(format!("Invalid certificate {}: {}", path.display(), e))
        })?;

    if certs.is_empty() {
        return Err(NoxError::config(format!(
            "No certificate found in {}",
            path.display()
        )));
    }
    Ok(certs)
}

fn load_key(path: &Path) -> NoxResult<PrivateKeyDer<'static>> {
    let file = File::open(path).map_err(|e| {
        NoxError::config(format!("Cannot open private key {}: {}", path.display(), e))
    })?;
    rustls_pemfile::private_key(&mut BufReader::new(file))
        .map_err(|e| NoxError::config(format!("Invalid private key {}: {}", path.display(), e)))?
        .ok_or_else(|| NoxError::config(format!("No private key found in {}", path.display())))
}

/// Whether presented client certificates are verified against `client_ca`.
pub fn verifies_clients(options: &TlsOptions) -> bool {
    options.verify_peer && !options.allow_self_signed && options.client_ca.is_some()
}

/// Build the server configuration, or `None` when no certificate/key pair is set.
pub fn server_config(options: &TlsOptions) -> NoxResult<Option<Arc<ServerConfig>>> {
    let Some((cert, key)) = options.identity() else {
        return Ok(None);
    };

    let certs = load_certs(cert)?;
    let key = load_key(key)?;

    let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());
    let builder = ServerConfig::builder_with_provider(provider.clone())
        .with_safe_default_protocol_versions()
        .map_err(|e| NoxError::config(format!("TLS protocol setup failed: {}", e)))?;

    let builder = match (&options.client_ca, verifies_clients(options)) {
        (Some(ca), true) => {
            let mut roots = RootCertStore::empty();
            for ca_cert in load_certs(ca)? {
                roots
                    .add(ca_cert)
                    .map_err(|e| NoxError::config(format!("Invalid client CA: {}", e)))?;
            }
            let verifier = WebPkiClientVerifier::builder_with_provider(Arc::new(roots), provider)
                .allow_unauthenticated()
                .build()
                .map_err(|e| NoxError::config(format!("Client verifier setup failed: {}", e)))?;
            builder.with_client_cert_verifier(verifier)
        }
        _ => builder.with_no_client_auth(),
    };

    let mut config = builder
        .with_single_cert(certs, key)
        .map_err(|e| NoxError::config(format!("Invalid certificate/key pair: {}", e)))?;
    config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    Ok(Some(Arc::new(config)))
}
