//! Service configuration, built once at startup and passed down.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;

/// CORS origins allowed when none are given on the command line.
/// Covers the local dev servers the frontend is typically served from.
const DEFAULT_ORIGINS: [&str; 6] = [
    "http://localhost:3000",
    "http://localhost:5173",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:5173",
    "http://127.0.0.1:8080",
    "http://localhost:8080",
];

/// Runtime configuration for the facewhiz service.
///
/// Constructed once in `main`; the core never reads it — the acceptance
/// threshold reaches the match engine per call.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub addr: String,
    pub data_dir: PathBuf,
    pub uploads_dir: PathBuf,
    pub default_threshold: f32,
    pub allowed_origins: Vec<String>,
}

impl ServiceConfig {
    pub fn new(
        addr: String,
        data_dir: PathBuf,
        default_threshold: f32,
        origins: Vec<String>,
    ) -> Self {
        let allowed_origins = if origins.is_empty() {
            DEFAULT_ORIGINS.iter().map(|s| s.to_string()).collect()
        } else {
            origins
        };
        let uploads_dir = data_dir.join("uploads");
        Self {
            addr,
            data_dir,
            uploads_dir,
            default_threshold,
            allowed_origins,
        }
    }

    /// Database file path inside the data directory.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("facewhiz.redb")
    }

    /// Parse the listen address; ":3000" binds all interfaces.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let addr = if self.addr.starts_with(':') {
            format!("0.0.0.0{}", self.addr)
        } else {
            self.addr.clone()
        };
        Ok(addr.parse()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_port_binds_all_interfaces() {
        let cfg = ServiceConfig::new(":3000".into(), PathBuf::from("data"), 0.5, Vec::new());
        assert_eq!(cfg.socket_addr().unwrap().to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn full_address_is_kept() {
        let cfg = ServiceConfig::new(
            "127.0.0.1:8080".into(),
            PathBuf::from("data"),
            0.5,
            Vec::new(),
        );
        assert_eq!(cfg.socket_addr().unwrap().to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn default_origins_apply_when_none_given() {
        let cfg = ServiceConfig::new(":3000".into(), PathBuf::from("data"), 0.5, Vec::new());
        assert_eq!(cfg.allowed_origins.len(), DEFAULT_ORIGINS.len());

        let cfg = ServiceConfig::new(
            ":3000".into(),
            PathBuf::from("data"),
            0.5,
            vec!["https://faces.example.com".into()],
        );
        assert_eq!(cfg.allowed_origins, ["https://faces.example.com"]);
    }

    #[test]
    fn paths_derive_from_data_dir() {
        let cfg = ServiceConfig::new(":3000".into(), PathBuf::from("/var/fw"), 0.5, Vec::new());
        assert_eq!(cfg.db_path(), PathBuf::from("/var/fw/facewhiz.redb"));
        assert_eq!(cfg.uploads_dir, PathBuf::from("/var/fw/uploads"));
    }
}
