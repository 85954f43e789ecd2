use crate::{Error, Result};
use bletrace_engine::Anonymizer;
use bletrace_store::RowSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Resolve the workspace directory path based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. BLETRACE_PATH environment variable (with tilde expansion)
/// 3. XDG data directory (recommended default)
/// 4. ~/.bletrace (fallback for systems without XDG)
pub fn resolve_workspace_path(explicit_path: Option<&str>) -> Result<PathBuf> {
    // Priority 1: Explicit path
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }

    // Priority 2: BLETRACE_PATH environment variable
    if let Ok(env_path) = std::env::var("BLETRACE_PATH") {
        return Ok(expand_tilde(&env_path));
    }

    // Priority 3: XDG data directory (recommended default)
    if let Some(data_dir) = dirs::data_dir() {
        return Ok(data_dir.join("bletrace"));
    }

    // Priority 4: Fallback to ~/.bletrace (last resort for systems without XDG)
    if let Some(home) = std::env::var_os("HOME") {
        return Ok(PathBuf::from(home).join(".bletrace"));
    }

    Err(Error::Config(
        "Could not determine workspace path: no HOME directory or XDG data directory found"
            .to_string(),
    ))
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = std::env::var_os("HOME")
    {
        return PathBuf::from(home).join(stripped);
    }
    PathBuf::from(path)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seconds of silence after which a device's session is closed.
    pub session_timeout_secs: u64,
    /// Seconds between eviction sweeps.
    pub flush_interval_secs: u64,
    /// Minimum spacing in seconds between raw-log rows for one device.
    pub throttle_window_secs: u64,
    /// Secret mixed into device identifiers before hashing. Unset or
    /// empty means identifiers are stored as advertised.
    pub salt: Option<String>,
    /// Keep the raw address column in rows when no salt is set.
    pub store_raw_address: bool,
    /// Partition directory. Defaults to `data` under the workspace path.
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_timeout_secs: 120,
            flush_interval_secs: 5,
            throttle_window_secs: 5,
            salt: None,
            store_raw_address: true,
            data_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::default_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validated()
    }

    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn default_path() -> Result<PathBuf> {
        Ok(resolve_workspace_path(None)?.join("config.toml"))
    }

    /// Config file in effect: an explicit path wins, otherwise the
    /// workspace default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Result<PathBuf> {
        match explicit {
            Some(path) => Ok(expand_tilde(path)),
            None => Self::default_path(),
        }
    }

    /// Reject interval values that would wedge the timers.
    pub fn validated(self) -> Result<Self> {
        if self.session_timeout_secs == 0 {
            return Err(Error::Config("session_timeout_secs must be nonzero".to_string()));
        }
        if self.flush_interval_secs == 0 {
            return Err(Error::Config("flush_interval_secs must be nonzero".to_string()));
        }
        if self.throttle_window_secs == 0 {
            return Err(Error::Config("throttle_window_secs must be nonzero".to_string()));
        }
        Ok(self)
    }

    /// Salt in effect: the BLETRACE_SALT environment variable wins over
    /// the config file, so the secret can stay off disk.
    pub fn effective_salt(&self) -> Option<String> {
        if let Ok(salt) = std::env::var("BLETRACE_SALT")
            && !salt.is_empty()
        {
            return Some(salt);
        }
        self.salt.clone()
    }

    /// Partition directory in effect, explicit flag first.
    pub fn resolve_data_dir(&self, explicit: Option<&str>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(expand_tilde(path));
        }
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        Ok(resolve_workspace_path(None)?.join("data"))
    }

    /// Identifier policy derived from this configuration.
    pub fn anonymizer(&self) -> Anonymizer {
        Anonymizer::from_salt(self.effective_salt(), self.store_raw_address)
    }

    /// CSV column set derived from this configuration.
    pub fn row_schema(&self) -> RowSchema {
        RowSchema::for_raw_echo(self.anonymizer().echoes_raw())
    }

    pub fn session_timeout(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.session_timeout_secs as i64)
    }

    pub fn throttle_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.throttle_window_secs as i64)
    }

    pub fn flush_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.flush_interval_secs)
    }
}
