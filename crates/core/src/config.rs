use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::{Coordinate, Geofence};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub office: OfficeConfig,
    pub bot: BotConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

/// Office reference point and geofence tolerance. Managed externally;
/// read-only input to the geofence evaluator.
#[derive(Clone, Debug)]
pub struct OfficeConfig {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_m: f64,
}

impl OfficeConfig {
    pub fn geofence(&self) -> Result<Geofence, ConfigError> {
        let center = Coordinate::new(self.latitude, self.longitude)
            .map_err(|error| ConfigError::Validation(format!("office reference point: {error}")))?;
        Ok(Geofence::new(center, self.radius_m))
    }
}

#[derive(Clone, Debug)]
pub struct BotConfig {
    /// Bearer token for outbound message delivery to the chat backend.
    pub token: SecretString,
    /// REST endpoint of the chat backend; when unset, replies are dropped
    /// (noop dispatch, used in development).
    pub api_base_url: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub office_latitude: Option<f64>,
    pub office_longitude: Option<f64>,
    pub office_radius_m: Option<f64>,
    pub bot_token: Option<String>,
    pub bot_api_base_url: Option<String>,
    pub server_port: Option<u16>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://tabel.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            office: OfficeConfig { latitude: 57.1521, longitude: 65.5921, radius_m: 100.0 },
            bot: BotConfig { token: String::new().into(), api_base_url: None },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                graceful_shutdown_secs: 15,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("tabel.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(office) = patch.office {
            if let Some(latitude) = office.latitude {
                self.office.latitude = latitude;
            }
            if let Some(longitude) = office.longitude {
                self.office.longitude = longitude;
            }
            if let Some(radius_m) = office.radius_m {
                self.office.radius_m = radius_m;
            }
        }

        if let Some(bot) = patch.bot {
            if let Some(token_value) = bot.token {
                self.bot.token = token_value.into();
            }
            if let Some(api_base_url) = bot.api_base_url {
                self.bot.api_base_url = Some(api_base_url);
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("TABEL_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("TABEL_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_u32("TABEL_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("TABEL_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("TABEL_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("TABEL_OFFICE_LATITUDE") {
            self.office.latitude = parse_f64("TABEL_OFFICE_LATITUDE", &value)?;
        }
        if let Some(value) = read_env("TABEL_OFFICE_LONGITUDE") {
            self.office.longitude = parse_f64("TABEL_OFFICE_LONGITUDE", &value)?;
        }
        if let Some(value) = read_env("TABEL_OFFICE_RADIUS_M") {
            self.office.radius_m = parse_f64("TABEL_OFFICE_RADIUS_M", &value)?;
        }

        if let Some(value) = read_env("TABEL_BOT_TOKEN") {
            self.bot.token = value.into();
        }
        if let Some(value) = read_env("TABEL_BOT_API_BASE_URL") {
            self.bot.api_base_url = Some(value);
        }

        if let Some(value) = read_env("TABEL_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("TABEL_SERVER_PORT") {
            self.server.port = parse_u16("TABEL_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("TABEL_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("TABEL_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        let log_level = read_env("TABEL_LOGGING_LEVEL").or_else(|| read_env("TABEL_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format = read_env("TABEL_LOGGING_FORMAT").or_else(|| read_env("TABEL_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(latitude) = overrides.office_latitude {
            self.office.latitude = latitude;
        }
        if let Some(longitude) = overrides.office_longitude {
            self.office.longitude = longitude;
        }
        if let Some(radius_m) = overrides.office_radius_m {
            self.office.radius_m = radius_m;
        }
        if let Some(bot_token) = overrides.bot_token {
            self.bot.token = bot_token.into();
        }
        if let Some(api_base_url) = overrides.bot_api_base_url {
            self.bot.api_base_url = Some(api_base_url);
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_office(&self.office)?;
        validate_bot(&self.bot)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("tabel.toml"), PathBuf::from("config/tabel.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_office(office: &OfficeConfig) -> Result<(), ConfigError> {
    office.geofence()?;

    if !office.radius_m.is_finite() || office.radius_m <= 0.0 {
        return Err(ConfigError::Validation(
            "office.radius_m must be a positive number of meters".to_string(),
        ));
    }

    Ok(())
}

fn validate_bot(bot: &BotConfig) -> Result<(), ConfigError> {
    if let Some(base_url) = &bot.api_base_url {
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::Validation(
                "bot.api_base_url must start with http:// or https://".to_string(),
            ));
        }

        if bot.token.expose_secret().trim().is_empty() {
            return Err(ConfigError::Validation(
                "bot.token is required when bot.api_base_url is set".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation(
            "server.port must be greater than zero".to_string(),
        ));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.parse::<f64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    office: Option<OfficePatch>,
    bot: Option<BotPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct OfficePatch {
    latitude: Option<f64>,
    longitude: Option<f64>,
    radius_m: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct BotPatch {
    token: Option<String>,
    api_base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
