use bletrace_types::DeviceId;
use sha2::{Digest, Sha256};

/// Identifier policy applied to every persisted row.
///
/// Without a salt the stored identifier is the raw one, and the raw
/// address may additionally be echoed into its own column. With a salt
/// the stored identifier is a keyed digest and the raw address never
/// leaves the process.
#[derive(Debug, Clone)]
pub struct Anonymizer {
    mode: Mode,
}

#[derive(Debug, Clone)]
enum Mode {
    Identity { echo_raw: bool },
    Keyed { salt: String },
}

impl Anonymizer {
    /// Pass identifiers through unchanged. `echo_raw` controls whether
    /// rows also carry the raw address in a dedicated column.
    pub fn identity(echo_raw: bool) -> Self {
        Self {
            mode: Mode::Identity { echo_raw },
        }
    }

    /// Replace identifiers with a salted digest. Raw addresses are
    /// never echoed in this mode.
    pub fn keyed(salt: impl Into<String>) -> Self {
        Self {
            mode: Mode::Keyed { salt: salt.into() },
        }
    }

    /// Build the policy from configuration: a salt wins over the
    /// raw-address preference.
    pub fn from_salt(salt: Option<String>, store_raw_address: bool) -> Self {
        match salt {
            Some(salt) if !salt.is_empty() => Self::keyed(salt),
            _ => Self::identity(store_raw_address),
        }
    }

    /// Stored form of a device identifier. Deterministic for a fixed
    /// salt, so the same device maps to the same id across restarts.
    pub fn stored_id(&self, device: &DeviceId) -> String {
        match &self.mode {
            Mode::Identity { .. } => device.as_str().to_string(),
            Mode::Keyed { salt } => {
                let mut hasher = Sha256::new();
                hasher.update(salt.as_bytes());
                hasher.update(device.as_str().as_bytes());
                let digest = format!("{:x}", hasher.finalize());
                digest[..16].to_string()
            }
        }
    }

    /// Whether persisted rows carry the raw address column.
    pub fn echoes_raw(&self) -> bool {
        match &self.mode {
            Mode::Identity { echo_raw } => *echo_raw,
            Mode::Keyed { .. } => false,
        }
    }
}
