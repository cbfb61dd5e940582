//! Configuration schema definitions.
//!
//! This module defines the settings of the installer service itself (not
//! the installer document it edits). All types derive Serde traits for
//! deserialization from a TOML file.

use serde::{Deserialize, Serialize};

/// Root configuration for the installer service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Installer document location.
    pub document: DocumentConfig,

    /// Install/uninstall scripts and streaming behaviour.
    pub actions: ActionsConfig,

    /// Cross-origin policy for the browser frontend.
    pub cors: CorsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request limits.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5001").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5001".to_string(),
        }
    }
}

/// Installer document location.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Path to the YAML document served by `/config`.
    pub path: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            path: "egs-installer-config.yaml".to_string(),
        }
    }
}

/// Install/uninstall action configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ActionsConfig {
    /// Script run by `POST /install`.
    pub install_script: String,

    /// Script run by `POST /uninstall`.
    pub uninstall_script: String,

    /// Flag passed before the document path.
    pub config_flag: String,

    /// Command prefix placed before the script (e.g., `["bash"]`).
    pub launcher: Vec<String>,

    /// Kill a running script when its client disconnects.
    pub kill_on_disconnect: bool,

    /// Output events buffered per run.
    pub stream_channel_capacity: usize,
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            install_script: "./egs-installer.sh".to_string(),
            uninstall_script: "./egs-uninstall.sh".to_string(),
            config_flag: "--input-yaml".to_string(),
            launcher: Vec::new(),
            kill_on_disconnect: false,
            stream_channel_capacity: 256,
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Origins allowed to call the API.
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout for `/config` and `/health` in seconds.
    /// Install/uninstall streams are never timed out.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error), used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Log format: "text" or "json".
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
