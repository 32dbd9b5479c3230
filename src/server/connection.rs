//! Per-connection handler.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::audit::{AuditDecision, AuditEntry, AuditLogger};
use crate::auth::Verifier;
use crate::config::Settings;
use crate::error::{CollectorError, ProtocolErrorKind};
use crate::protocol::{read_frame, write_frame, AttendanceClaim, ReportResponse};

use super::ConnectionMetrics;

/// Handle a single device connection.
///
/// Devices may send any number of claims over one connection; each claim is
/// answered individually. The loop ends when the device disconnects or a
/// read times out.
pub async fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    settings: Arc<Settings>,
    verifier: Arc<Verifier>,
    audit_logger: Option<Arc<AuditLogger>>,
    metrics: Arc<ConnectionMetrics>,
) -> Result<(), CollectorError> {
    let (mut reader, mut writer) = stream.into_split();

    loop {
        let result = process_claim(
            &mut reader,
            &mut writer,
            peer_addr,
            &settings,
            &verifier,
            audit_logger.as_deref(),
            &metrics,
        )
        .await;

        match result {
            Ok(()) => continue,
            Err(CollectorError::Protocol {
                kind: ProtocolErrorKind::ConnectionClosed,
            }) => {
                debug!(peer = %peer_addr, "Device disconnected");
                return Ok(());
            }
            Err(CollectorError::Protocol {
                kind: ProtocolErrorKind::ConnectionTimeout,
            }) => {
                warn!(peer = %peer_addr, "Connection timed out");
                return Ok(());
            }
            Err(e) => return Err(e),
        }
    }
}

/// Process a single claim from the device.
async fn process_claim<R, W>(
    reader: &mut R,
    writer: &mut W,
    peer_addr: SocketAddr,
    settings: &Settings,
    verifier: &Verifier,
    audit_logger: Option<&AuditLogger>,
    metrics: &ConnectionMetrics,
) -> Result<(), CollectorError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let socket_timeout = Duration::from_secs(settings.limits.socket_timeout_seconds);
    let msg = read_frame(reader, settings.limits.max_message_size, socket_timeout).await?;

    let request_id = Uuid::new_v4();
    let start_time = Instant::now();

    // Malformed input never reaches the verifier; it gets the same generic
    // rejection as a bad signature.
    let claim: AttendanceClaim = match serde_json::from_slice(&msg) {
        Ok(claim) => claim,
        Err(e) => {
            warn!(
                request_id = %request_id,
                peer = %peer_addr,
                error = %e,
                "Malformed claim"
            );
            metrics.record_claim(false);
            let response = serde_json::to_vec(&ReportResponse::rejected())?;
            write_frame(writer, &response, socket_timeout).await?;
            return Ok(());
        }
    };

    info!(
        request_id = %request_id,
        device_id = %claim.device_id,
        peer = %peer_addr,
        "Received attendance claim"
    );

    let outcome = verifier.verify(&claim);
    let accepted = outcome.is_valid();
    metrics.record_claim(accepted);

    let response = if accepted {
        info!(
            request_id = %request_id,
            device_id = %claim.device_id,
            "Signature verified"
        );
        ReportResponse::accepted(claim.device_id.clone())
    } else {
        // No reason is given; unknown device and bad signature look the same.
        warn!(
            request_id = %request_id,
            device_id = %claim.device_id,
            "Verification failed"
        );
        ReportResponse::rejected()
    };

    if let Some(logger) = audit_logger {
        let entry = AuditEntry::new(
            Utc::now().to_rfc3339(),
            request_id,
            claim.device_id.clone(),
            peer_addr.to_string(),
            if accepted {
                AuditDecision::Accepted
            } else {
                AuditDecision::Rejected
            },
            start_time.elapsed().as_millis() as u64,
        );
        if let Err(e) = logger.log(&entry) {
            error!(error = %e, "Failed to write audit log entry");
        }
    }

    let response_bytes = serde_json::to_vec(&response)?;
    write_frame(writer, &response_bytes, socket_timeout).await?;

    Ok(())
}
