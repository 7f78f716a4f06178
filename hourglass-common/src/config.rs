//! Configuration loading and root folder resolution

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Name of the SQLite database file inside the root folder
pub const DATABASE_FILE: &str = "hourglass.db";

/// Default HTTP listen port
pub const DEFAULT_PORT: u16 = 5800;

/// Application settings loaded from `config.toml`
///
/// Every field has a default so a missing or partial file is never fatal.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub sheets: SheetsConfig,
}

/// `[server]` section
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// `[sheets]` section - spreadsheet mirror configuration
///
/// The mirror is an export target only; when disabled (or when no
/// credentials file is configured) the rest of the application runs
/// unaffected.
#[derive(Debug, Clone, Deserialize)]
pub struct SheetsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub spreadsheet_id: String,
    /// Path to a JSON file containing a pre-issued `access_token`.
    /// Token issuance for the service account is outside this application.
    #[serde(default)]
    pub credentials_path: Option<PathBuf>,
    #[serde(default = "default_sheets_base_url")]
    pub base_url: String,
    #[serde(default = "default_sync_interval")]
    pub sync_interval_secs: u64,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            spreadsheet_id: String::new(),
            credentials_path: None,
            base_url: default_sheets_base_url(),
            sync_interval_secs: default_sync_interval(),
        }
    }
}

fn default_sheets_base_url() -> String {
    "https://sheets.googleapis.com".to_string()
}

fn default_sync_interval() -> u64 {
    5
}

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. `root_folder` key in the TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&Path>, env_var_name: &str) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = locate_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml_content.parse::<toml::Table>() {
                if let Some(root_folder) = config.get("root_folder").and_then(|v| v.as_str()) {
                    return PathBuf::from(root_folder);
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Load `config.toml` from the platform config directory, falling back to
/// defaults when the file is absent or unreadable.
pub fn load_app_config() -> AppConfig {
    let Ok(path) = locate_config_file() else {
        return AppConfig::default();
    };

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str::<AppConfig>(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring malformed config file {}: {}", path.display(), e);
                AppConfig::default()
            }
        },
        Err(_) => AppConfig::default(),
    }
}

/// Parse an `AppConfig` from TOML text
pub fn parse_app_config(content: &str) -> Result<AppConfig> {
    toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config file: {}", e)))
}

/// Get configuration file path for the platform
pub fn locate_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/hourglass/config.toml first, then /etc/hourglass/config.toml
        let user_config = dirs::config_dir().map(|d| d.join("hourglass").join("config.toml"));
        let system_config = PathBuf::from("/etc/hourglass/config.toml");

        if let Some(path) = user_config {
            if path.exists() {
                return Ok(path);
            }
        }
        if system_config.exists() {
            return Ok(system_config);
        }
        return Err(Error::Config("No config file found".to_string()));
    }

    let config_path = dirs::config_dir()
        .map(|d| d.join("hourglass").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

    if config_path.exists() {
        Ok(config_path)
    } else {
        Err(Error::Config(format!(
            "Config file not found: {:?}",
            config_path
        )))
    }
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/hourglass (or /var/lib/hourglass for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("hourglass"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/hourglass"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/hourglass
        dirs::data_dir()
            .map(|d| d.join("hourglass"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/hourglass"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\hourglass
        dirs::data_local_dir()
            .map(|d| d.join("hourglass"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\hourglass"))
    } else {
        PathBuf::from("./hourglass_data")
    }
}

/// Ensure the root folder exists and return the database path inside it
pub fn prepare_root_folder(root_folder: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(root_folder)?;
    Ok(root_folder.join(DATABASE_FILE))
}
