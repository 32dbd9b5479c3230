//! Credential table loading and lookup.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::{CollectorError, CredentialErrorKind};

use super::DeviceSecret;

/// On-disk shape of the credentials file.
///
/// ```toml
/// [devices]
/// front-door-01 = "shared secret"
/// ```
#[derive(Deserialize)]
struct CredentialsFile {
    devices: HashMap<String, String>,
}

/// Read-only mapping from device id to shared secret.
///
/// Built once at startup and injected into the verifier, so tests can supply
/// isolated fixtures and concurrent connections share it without locks.
pub struct CredentialRegistry {
    devices: HashMap<String, DeviceSecret>,
}

impl CredentialRegistry {
    /// Build a registry from explicit (device id, secret) entries.
    ///
    /// Fails on a duplicate device id; the registry holds at most one secret
    /// per device.
    pub fn from_entries<I, K, S>(entries: I) -> Result<Self, CollectorError>
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: Into<DeviceSecret>,
    {
        let mut devices = HashMap::new();
        for (device_id, secret) in entries {
            let device_id = device_id.into();
            if devices.insert(device_id.clone(), secret.into()).is_some() {
                return Err(CollectorError::Credential {
                    kind: CredentialErrorKind::DuplicateDevice { device_id },
                });
            }
        }
        Ok(Self { devices })
    }

    /// Load the registry from a TOML credentials file.
    ///
    /// Security: Verifies the file has restrictive permissions (0600 or 0400)
    /// before loading to prevent secrets from being readable by other users.
    pub fn load(path: &Path) -> Result<Self, CollectorError> {
        let metadata = std::fs::metadata(path).map_err(|e| CollectorError::Credential {
            kind: CredentialErrorKind::Unreadable {
                path: path.to_path_buf(),
                message: e.to_string(),
            },
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = metadata.permissions().mode();
            // Group and world bits must all be zero
            if mode & 0o077 != 0 {
                return Err(CollectorError::Credential {
                    kind: CredentialErrorKind::InsecurePermissions {
                        path: path.to_path_buf(),
                        mode: mode & 0o777,
                    },
                });
            }
        }
        #[cfg(not(unix))]
        let _ = metadata;

        let content = std::fs::read_to_string(path).map_err(|e| CollectorError::Credential {
            kind: CredentialErrorKind::Unreadable {
                path: path.to_path_buf(),
                message: e.to_string(),
            },
        })?;

        let file: CredentialsFile =
            toml::from_str(&content).map_err(|e| CollectorError::Credential {
                kind: CredentialErrorKind::Malformed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                },
            })?;

        let registry = Self::from_entries(
            file.devices
                .into_iter()
                .map(|(id, secret)| (id, DeviceSecret::from(secret.as_str()))),
        )?;

        info!(
            devices = registry.len(),
            path = %path.display(),
            "Credential registry loaded"
        );

        Ok(registry)
    }

    /// Look up a device's secret.
    ///
    /// Exact, case-sensitive equality on the device id. Returns `None` for
    /// an unknown id; an empty registry behaves identically.
    pub fn lookup(&self, device_id: &str) -> Option<&DeviceSecret> {
        self.devices.get(device_id)
    }

    /// Number of registered devices.
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Whether the registry has no devices.
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
