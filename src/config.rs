use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug, Default)]
#[command(name = "linkhash", about = "A multi-user URL shortener")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, env = "LINKHASH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long, env = "LINKHASH_HOST")]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long, env = "LINKHASH_PORT")]
    pub port: Option<u16>,

    /// Path to data directory
    #[arg(long, env = "LINKHASH_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Path to the SQLite database file
    #[arg(long, env = "LINKHASH_DATABASE")]
    pub database: Option<PathBuf>,

    /// Administrator account ensured at startup
    #[arg(long, env = "LINKHASH_ADMIN_USERNAME")]
    pub admin_username: Option<String>,

    #[arg(long, env = "LINKHASH_ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Base used when rendering short URLs; falls back to the request Host header.
    pub public_url: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AuthConfig {
    pub cookie_name: String,
    pub session_hours: u64,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            public_url: None,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            cookie_name: "linkhash_session".to_string(),
            session_hours: 168,
            admin_username: None,
            admin_password: None,
        }
    }
}

impl Config {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let data_dir = Self::data_dir(cli);
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| data_dir.join("config.toml"));

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };

        // CLI and environment overrides
        if let Some(ref host) = cli.host {
            config.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            config.server.port = port;
        }
        if let Some(ref database) = cli.database {
            config.database.path = Some(database.clone());
        }
        if let Some(ref username) = cli.admin_username {
            config.auth.admin_username = Some(username.clone());
        }
        if let Some(ref password) = cli.admin_password {
            config.auth.admin_password = Some(password.clone());
        }

        if config.database.path.is_none() {
            config.database.path = Some(data_dir.join("linkhash.db"));
        }

        Ok(config)
    }

    pub fn data_dir(cli: &Cli) -> PathBuf {
        cli.data_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".linkhash")
        })
    }

    pub fn db_path(&self) -> &Path {
        self.database
            .path
            .as_deref()
            .unwrap_or_else(|| Path::new("linkhash.db"))
    }

    /// Credentials for the administrator account, when both halves are set.
    pub fn admin_credentials(&self) -> Option<(&str, &str)> {
        match (&self.auth.admin_username, &self.auth.admin_password) {
            (Some(username), Some(password)) => Some((username, password)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_in(dir: &Path) -> Cli {
        Cli {
            data_dir: Some(dir.to_path_buf()),
            ..Cli::default()
        }
    }

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert!(config.server.public_url.is_none());
        assert_eq!(config.auth.cookie_name, "linkhash_session");
        assert_eq!(config.auth.session_hours, 168);
        assert!(config.database.path.is_none());
        assert!(config.admin_credentials().is_none());
    }

    #[test]
    fn data_dir_uses_cli_override() {
        let cli = cli_in(Path::new("/tmp/test-linkhash"));
        assert_eq!(Config::data_dir(&cli), PathBuf::from("/tmp/test-linkhash"));
    }

    #[test]
    fn data_dir_defaults_to_dot_linkhash() {
        let dir = Config::data_dir(&Cli::default());
        assert!(dir.ends_with(".linkhash"));
    }

    #[test]
    fn load_with_no_config_file_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load(&cli_in(tmp.path())).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.db_path(), tmp.path().join("linkhash.db"));
    }

    #[test]
    fn load_applies_cli_overrides() {
        let tmp = tempfile::tempdir().unwrap();
        let cli = Cli {
            host: Some("127.0.0.1".to_string()),
            port: Some(8080),
            database: Some(tmp.path().join("other.db")),
            ..cli_in(tmp.path())
        };
        let config = Config::load(&cli).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.db_path(), tmp.path().join("other.db"));
    }

    #[test]
    fn load_reads_toml_file() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = tmp.path().join("config.toml");
        std::fs::write(
            &config_path,
            r#"
[server]
host = "192.168.1.1"
port = 9000
public_url = "https://sho.rt"

[auth]
cookie_name = "my_cookie"
session_hours = 24
admin_username = "root"
admin_password = "hunter2"
"#,
        )
        .unwrap();

        let cli = Cli {
            config: Some(config_path),
            ..cli_in(tmp.path())
        };
        let config = Config::load(&cli).unwrap();
        assert_eq!(config.server.host, "192.168.1.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.public_url.as_deref(), Some("https://sho.rt"));
        assert_eq!(config.auth.cookie_name, "my_cookie");
        assert_eq!(config.auth.session_hours, 24);
        assert_eq!(config.admin_credentials(), Some(("root", "hunter2")));
    }

    #[test]
    fn cli_overrides_beat_toml_values() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = tmp.path().join("config.toml");
        std::fs::write(
            &config_path,
            r#"
[server]
host = "192.168.1.1"
port = 9000

[auth]
admin_username = "root"
admin_password = "from-file"
"#,
        )
        .unwrap();

        let cli = Cli {
            config: Some(config_path),
            host: Some("10.0.0.1".to_string()),
            port: Some(4000),
            admin_password: Some("from-env".to_string()),
            ..cli_in(tmp.path())
        };
        let config = Config::load(&cli).unwrap();
        assert_eq!(config.server.host, "10.0.0.1");
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.admin_credentials(), Some(("root", "from-env")));
    }

    #[test]
    fn admin_credentials_need_both_halves() {
        let mut config = Config::default();
        config.auth.admin_username = Some("root".to_string());
        assert!(config.admin_credentials().is_none());
    }
}
