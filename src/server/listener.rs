//! TCP listener for device connections.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::{Notify, Semaphore};
use tracing::{debug, error, info, warn};

use crate::audit::AuditLogger;
use crate::auth::Verifier;
use crate::config::Settings;
use crate::error::CollectorError;
use crate::registry::CredentialRegistry;

use super::handle_connection;

/// Connection metrics for monitoring.
#[derive(Debug, Default)]
pub struct ConnectionMetrics {
    /// Total claims processed.
    pub claims_total: AtomicU64,
    /// Claims that failed verification.
    pub claims_rejected: AtomicU64,
    /// Currently active connections.
    pub active_connections: AtomicUsize,
}

impl ConnectionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a processed claim.
    pub fn record_claim(&self, accepted: bool) {
        self.claims_total.fetch_add(1, Ordering::Relaxed);
        if !accepted {
            self.claims_rejected.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn total_claims(&self) -> u64 {
        self.claims_total.load(Ordering::Relaxed)
    }

    pub fn rejected_claims(&self) -> u64 {
        self.claims_rejected.load(Ordering::Relaxed)
    }

    /// Get active connection count.
    pub fn active(&self) -> usize {
        self.active_connections.load(Ordering::Relaxed)
    }
}

/// TCP server accepting attendance reports.
pub struct CollectorListener {
    listener: TcpListener,
    settings: Arc<Settings>,
    verifier: Arc<Verifier>,
    audit_logger: Option<Arc<AuditLogger>>,
    metrics: Arc<ConnectionMetrics>,
    /// Semaphore for connection limiting
    connection_semaphore: Arc<Semaphore>,
}

impl CollectorListener {
    /// Create and bind a new listener.
    ///
    /// Loads the credential registry and builds the verifier over it; the
    /// registry is fixed for the lifetime of the listener.
    pub async fn bind(settings: Arc<Settings>) -> Result<Self, CollectorError> {
        let listener =
            TcpListener::bind(settings.listener.bind_addr)
                .await
                .map_err(|e| CollectorError::Listener {
                    message: format!("Failed to bind to {}: {}", settings.listener.bind_addr, e),
                })?;

        let registry = CredentialRegistry::load(&settings.security.credentials_path)?;
        if registry.is_empty() {
            warn!("Credential registry is empty, every claim will be rejected");
        }
        let verifier = Arc::new(Verifier::new(Arc::new(registry)));

        let metrics = Arc::new(ConnectionMetrics::new());

        let connection_semaphore =
            Arc::new(Semaphore::new(settings.limits.max_concurrent_connections));
        info!(
            max_connections = settings.limits.max_concurrent_connections,
            "Connection limiting enabled"
        );

        let audit_logger = if settings.audit.enabled {
            match AuditLogger::new(&settings.audit.log_path) {
                Ok(logger) => {
                    info!(
                        path = %settings.audit.log_path.display(),
                        "Audit logging enabled"
                    );
                    Some(Arc::new(logger))
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        path = %settings.audit.log_path.display(),
                        "Failed to create audit logger, audit logging disabled"
                    );
                    None
                }
            }
        } else {
            info!("Audit logging disabled");
            None
        };

        let local_addr = listener.local_addr().map_err(|e| CollectorError::Listener {
            message: format!("Failed to read local address: {}", e),
        })?;
        info!(addr = %local_addr, "Collector listener bound");

        Ok(Self {
            listener,
            settings,
            verifier,
            audit_logger,
            metrics,
            connection_semaphore,
        })
    }

    /// Get connection metrics.
    pub fn metrics(&self) -> Arc<ConnectionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// The address the listener is bound to.
    ///
    /// Useful when binding to port 0 in tests.
    pub fn local_addr(&self) -> Result<SocketAddr, CollectorError> {
        self.listener
            .local_addr()
            .map_err(|e| CollectorError::Listener {
                message: format!("Failed to read local address: {}", e),
            })
    }

    /// Run the listener, accepting connections.
    ///
    /// The listener stops accepting new connections when `shutdown` is
    /// notified. Active connections continue until they complete.
    pub async fn run(&self, shutdown: Arc<Notify>) -> Result<(), CollectorError> {
        info!("Collector listener running, waiting for device connections...");

        loop {
            tokio::select! {
                result = self.listener.accept() => {
                    match result {
                        Ok((stream, peer_addr)) => {
                            let permit = match self.connection_semaphore.clone().try_acquire_owned() {
                                Ok(permit) => permit,
                                Err(_) => {
                                    warn!(
                                        peer = %peer_addr,
                                        max = self.settings.limits.max_concurrent_connections,
                                        "Connection limit reached, rejecting connection"
                                    );
                                    // Dropping the stream rejects the device
                                    continue;
                                }
                            };

                            let settings = Arc::clone(&self.settings);
                            let verifier = Arc::clone(&self.verifier);
                            let audit_logger = self.audit_logger.clone();
                            let metrics = Arc::clone(&self.metrics);

                            metrics.active_connections.fetch_add(1, Ordering::Relaxed);
                            debug!(
                                peer = %peer_addr,
                                active = metrics.active(),
                                "New connection accepted"
                            );

                            tokio::spawn(async move {
                                let _permit = permit; // Released when the task completes
                                if let Err(e) = handle_connection(
                                    stream,
                                    peer_addr,
                                    settings,
                                    verifier,
                                    audit_logger,
                                    Arc::clone(&metrics),
                                ).await {
                                    error!(peer = %peer_addr, error = %e, "Connection handler error");
                                }

                                metrics.active_connections.fetch_sub(1, Ordering::Relaxed);
                                debug!(
                                    peer = %peer_addr,
                                    active = metrics.active(),
                                    "Connection closed"
                                );
                            });
                        }
                        Err(e) => {
                            warn!(error = %e, "Failed to accept connection");
                        }
                    }
                }
                _ = shutdown.notified() => {
                    info!("Shutdown signal received, stopping listener");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Wait for all active connections to drain.
    pub async fn wait_for_drain(&self) {
        let poll_interval = std::time::Duration::from_millis(100);

        while self.metrics.active() > 0 {
            debug!(
                active = self.metrics.active(),
                "Waiting for connections to drain"
            );
            tokio::time::sleep(poll_interval).await;
        }

        info!("All connections drained");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_record_claims() {
        let metrics = ConnectionMetrics::new();
        metrics.record_claim(true);
        metrics.record_claim(false);
        metrics.record_claim(false);

        assert_eq!(metrics.total_claims(), 3);
        assert_eq!(metrics.rejected_claims(), 2);
        assert_eq!(metrics.active(), 0);
    }
}
