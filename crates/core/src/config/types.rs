use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::gif::GifConfig;
use crate::invoker::InvokerConfig;
use crate::segmenter::SegmenterConfig;
use crate::session::ReaperConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub invoker: InvokerConfig,
    #[serde(default)]
    pub segmenter: SegmenterConfig,
    #[serde(default)]
    pub gif: GifConfig,
    #[serde(default)]
    pub reaper: ReaperConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory holding per-session workspaces.
    #[serde(default = "default_sessions_dir")]
    pub sessions_dir: PathBuf,
    /// Maximum accepted upload size in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            sessions_dir: default_sessions_dir(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    5000
}

fn default_sessions_dir() -> PathBuf {
    PathBuf::from("sessions")
}

fn default_max_upload_bytes() -> usize {
    500 * 1024 * 1024 // 500 MB
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_sections() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.sessions_dir, PathBuf::from("sessions"));
        assert_eq!(config.server.max_upload_bytes, 500 * 1024 * 1024);
        assert_eq!(config.segmenter.max_clip_duration_secs, 6);
        assert_eq!(config.gif.max_size_bytes, 20 * 1024 * 1024);
        assert!(config.reaper.enabled);
    }
}
