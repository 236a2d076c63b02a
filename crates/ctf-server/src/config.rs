//! Server configuration

use std::net::SocketAddr;

use clap::Parser;
use ctf_blob::ObjectStore;

use crate::db::Database;
use crate::store::DocumentStore;

/// Command line / environment options for the server binary.
#[derive(Parser, Debug, Clone)]
#[command(name = "ctf-server")]
#[command(about = "CTF Board server")]
pub struct ServerArgs {
    /// Database connection string, e.g. `sqlite://ctf.db?mode=rwc`
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Listen address
    #[arg(long, default_value = "0.0.0.0:3001", env = "LISTEN_ADDR")]
    pub addr: SocketAddr,

    /// Max upload size in MB
    #[arg(long, default_value_t = 50, env = "MAX_UPLOAD_MB")]
    pub max_upload_mb: u64,

    /// Max pooled database connections
    #[arg(long, default_value_t = 5, env = "DB_MAX_CONNECTIONS")]
    pub max_connections: u32,
}

/// Configuration for the CTF Board server
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    /// Database connection string
    pub database_url: String,
    /// Address the HTTP listener binds to
    pub addr: SocketAddr,
    /// Max upload size in MB
    pub max_upload_mb: u64,
    /// Max pooled database connections
    pub max_connections: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            addr: SocketAddr::from(([0, 0, 0, 0], 3001)),
            max_upload_mb: 50,
            max_connections: 5,
        }
    }
}

impl From<ServerArgs> for ServerConfig {
    fn from(args: ServerArgs) -> Self {
        Self {
            database_url: args.database_url,
            addr: args.addr,
            max_upload_mb: args.max_upload_mb,
            max_connections: args.max_connections,
        }
    }
}

impl ServerConfig {
    /// Upload limit in bytes
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_mb * 1024 * 1024
    }
}

/// App state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
    pub documents: DocumentStore,
    pub objects: ObjectStore,
}

impl AppState {
    /// Build the handler state on top of an already connected database.
    ///
    /// The object store shares the document store's pool.
    pub async fn new(config: ServerConfig, db: &Database) -> anyhow::Result<Self> {
        let objects = ObjectStore::new(db.pool().clone())
            .await?
            .with_max_size(config.max_upload_bytes());

        Ok(Self {
            config,
            documents: DocumentStore::new(db.pool().clone()),
            objects,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.addr.port(), 3001);
        assert_eq!(config.max_upload_mb, 50);
        assert_eq!(config.max_upload_bytes(), 50 * 1024 * 1024);
    }

    #[test]
    fn test_args_with_explicit_values() {
        let args = ServerArgs::try_parse_from([
            "ctf-server",
            "--database-url",
            "sqlite://ctf.db?mode=rwc",
            "--addr",
            "127.0.0.1:8080",
            "--max-upload-mb",
            "10",
            "--max-connections",
            "2",
        ])
        .unwrap();

        let config = ServerConfig::from(args);
        assert_eq!(config.database_url, "sqlite://ctf.db?mode=rwc");
        assert_eq!(config.addr.port(), 8080);
        assert_eq!(config.max_upload_bytes(), 10 * 1024 * 1024);
        assert_eq!(config.max_connections, 2);
    }

    #[test]
    fn test_partial_override() {
        let config = ServerConfig {
            max_upload_mb: 1,
            ..Default::default()
        };
        assert_eq!(config.max_upload_bytes(), 1024 * 1024);
        assert_eq!(config.max_connections, 5);
    }
}
