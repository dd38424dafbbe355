use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::cli::Cli;

/// Directory name used under the user and system config directories.
pub const APP_DIR: &str = "ch-optimizer";
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct Settings {
    pub clickhouse: ClickHouseConfig,
    pub daemon: DaemonConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClickHouseConfig {
    /// Native protocol DSN, see clickhouse-rs `Options` for the accepted parameters
    pub server_dsn: String,
    /// Partitions merged more recently than this are left alone
    #[serde(with = "humantime_serde")]
    pub optimize_interval: Duration,
}

impl Default for ClickHouseConfig {
    fn default() -> Self {
        Self {
            server_dsn: "tcp://localhost:9000?execute_timeout=3600s&query_timeout=600s"
                .to_string(),
            optimize_interval: Duration::from_secs(72 * 3600),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DaemonConfig {
    pub one_shot: bool,
    #[serde(with = "humantime_serde")]
    pub loop_interval: Duration,
    /// Only report how many partitions would be merged. Implies `one_shot`.
    pub dry_run: bool,
    #[serde(default)]
    pub on_connect_failure: ConnectPolicy,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            one_shot: false,
            loop_interval: Duration::from_secs(3600),
            dry_run: false,
            on_connect_failure: ConnectPolicy::default(),
        }
    }
}

/// What the daemon does when the engine cannot be reached at cycle start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectPolicy {
    /// Terminate the process.
    #[default]
    Exit,
    /// Count the cycle as failed and try again after the loop interval.
    Retry,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log file path, `-` for stdout
    pub output: String,
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            output: "-".to_string(),
            level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Renders the settings the same way they are read from a config file.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn defaults_toml() -> Result<String, toml::ser::Error> {
        Self::default().to_toml()
    }

    /// True when the scheduler must stop after the first cycle.
    pub fn is_one_shot(&self) -> bool {
        self.daemon.one_shot || self.daemon.dry_run
    }
}

/// Config files consulted when no `--config` is given, lowest precedence first.
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![Path::new("/etc").join(APP_DIR).join(CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join(APP_DIR).join(CONFIG_FILE));
    }
    paths
}

/// Builds the effective settings: defaults, then config file(s), then CLI flags.
pub fn load_settings(cli: &Cli) -> Result<Settings, config::ConfigError> {
    let defaults =
        Settings::defaults_toml().map_err(|e| config::ConfigError::Foreign(Box::new(e)))?;

    let mut builder = config::Config::builder().add_source(config::File::from_str(
        &defaults,
        config::FileFormat::Toml,
    ));

    builder = match &cli.config {
        Some(path) => builder.add_source(
            config::File::from(path.as_path())
                .format(config::FileFormat::Toml)
                .required(true),
        ),
        None => default_config_paths()
            .into_iter()
            .fold(builder, |b, path| {
                b.add_source(
                    config::File::from(path)
                        .format(config::FileFormat::Toml)
                        .required(false),
                )
            }),
    };

    for (key, value) in cli.overrides() {
        builder = builder.set_override(key, value)?;
    }

    let mut settings: Settings = builder.build()?.try_deserialize()?;

    if settings.daemon.dry_run {
        settings.daemon.one_shot = true;
    }

    Ok(settings)
}
