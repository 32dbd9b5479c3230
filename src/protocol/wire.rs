//! Wire format for message framing.
//!
//! Messages are length-prefixed: [4 bytes big-endian u32][payload]

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::timeout;

use crate::error::{CollectorError, ProtocolErrorKind};

/// Read a length-prefixed message, failing after `io_timeout`.
///
/// Returns the raw bytes of the payload, an error if the declared length
/// exceeds `max_size`, and `ConnectionClosed` on a clean EOF before the
/// length prefix.
pub async fn read_frame<R>(
    reader: &mut R,
    max_size: usize,
    io_timeout: Duration,
) -> Result<Vec<u8>, CollectorError>
where
    R: AsyncReadExt + Unpin,
{
    timeout(io_timeout, read_frame_inner(reader, max_size))
        .await
        .map_err(|_| CollectorError::Protocol {
            kind: ProtocolErrorKind::ConnectionTimeout,
        })?
}

async fn read_frame_inner<R>(reader: &mut R, max_size: usize) -> Result<Vec<u8>, CollectorError>
where
    R: AsyncReadExt + Unpin,
{
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(CollectorError::Protocol {
                kind: ProtocolErrorKind::ConnectionClosed,
            });
        }
        Err(e) => return Err(CollectorError::Io(e)),
    }

    let len = u32::from_be_bytes(len_buf) as usize;
    if len > max_size {
        return Err(CollectorError::Protocol {
            kind: ProtocolErrorKind::MessageTooLarge {
                size: len,
                max: max_size,
            },
        });
    }

    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;
    Ok(buf)
}

/// Write a length-prefixed message, failing after `io_timeout`.
pub async fn write_frame<W>(
    writer: &mut W,
    data: &[u8],
    io_timeout: Duration,
) -> Result<(), CollectorError>
where
    W: AsyncWriteExt + Unpin,
{
    timeout(io_timeout, async {
        let len = (data.len() as u32).to_be_bytes();
        writer.write_all(&len).await?;
        writer.write_all(data).await?;
        writer.flush().await?;
        Ok(())
    })
    .await
    .map_err(|_| CollectorError::Protocol {
        kind: ProtocolErrorKind::ConnectionTimeout,
    })?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TIMEOUT: Duration = Duration::from_secs(5);
    const MAX: usize = 64 * 1024;

    #[tokio::test]
    async fn test_frame_round_trip() {
        let mut buffer = Vec::new();
        let message = br#"{"device_id":"door-1"}"#;

        write_frame(&mut buffer, message, TIMEOUT).await.unwrap();
        assert_eq!(&buffer[0..4], &(message.len() as u32).to_be_bytes());

        let mut cursor = Cursor::new(buffer);
        let result = read_frame(&mut cursor, MAX, TIMEOUT).await.unwrap();
        assert_eq!(result, message);
    }

    #[tokio::test]
    async fn test_oversized_frame_rejected() {
        let mut buffer = Vec::new();
        buffer.extend_from_slice(&2_000_000u32.to_be_bytes());
        buffer.extend_from_slice(&[0u8; 16]);

        let mut cursor = Cursor::new(buffer);
        let result = read_frame(&mut cursor, MAX, TIMEOUT).await;
        assert!(matches!(
            result,
            Err(CollectorError::Protocol {
                kind: ProtocolErrorKind::MessageTooLarge { .. }
            })
        ));
    }

    #[tokio::test]
    async fn test_eof_is_connection_closed() {
        let mut cursor = Cursor::new(Vec::new());
        let result = read_frame(&mut cursor, MAX, TIMEOUT).await;
        assert!(matches!(
            result,
            Err(CollectorError::Protocol {
                kind: ProtocolErrorKind::ConnectionClosed
            })
        ));
    }
}
