//! Layered configuration: built-in defaults, then the TOML file, then
//! `NETPRICE_*` environment variables, then explicit overrides.
//!
//! Every setting is addressed by its dotted key (`database.url`). The key names
//! the TOML entry and is what [`ResolvedConfig::source_of`] reports on.

use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use toml::{Table, Value};

pub const DEFAULT_CONFIG_FILE: &str = "netprice.toml";
pub const FALLBACK_CONFIG_FILE: &str = "config/netprice.toml";

/// A configurable value and the environment variables that set it, highest
/// priority first.
#[derive(Clone, Copy, Debug)]
pub struct Setting {
    pub key: &'static str,
    pub env_keys: &'static [&'static str],
}

pub const SETTINGS: &[Setting] = &[
    Setting { key: "database.url", env_keys: &["NETPRICE_DATABASE_URL"] },
    Setting { key: "database.max_connections", env_keys: &["NETPRICE_DATABASE_MAX_CONNECTIONS"] },
    Setting { key: "database.timeout_secs", env_keys: &["NETPRICE_DATABASE_TIMEOUT_SECS"] },
    Setting { key: "logging.level", env_keys: &["NETPRICE_LOGGING_LEVEL", "NETPRICE_LOG_LEVEL"] },
    Setting {
        key: "logging.format",
        env_keys: &["NETPRICE_LOGGING_FORMAT", "NETPRICE_LOG_FORMAT"],
    },
    Setting {
        key: "pricing.default_tenant",
        env_keys: &["NETPRICE_PRICING_DEFAULT_TENANT", "NETPRICE_TENANT"],
    },
    Setting { key: "pricing.audit", env_keys: &["NETPRICE_PRICING_AUDIT"] },
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub pricing: PricingConfig,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PricingConfig {
    /// Tenant used when a request does not name one.
    pub default_tenant: Option<String>,
    /// Attach the audit trail of each evaluation to its output.
    pub audit: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Pretty => "pretty",
            Self::Json => "json",
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => {
                Err(format!("unsupported log format `{other}` (expected compact|pretty|json)"))
            }
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub default_tenant: Option<String>,
}

impl ConfigOverrides {
    fn into_entries(self) -> Vec<(&'static str, String)> {
        [
            ("database.url", self.database_url),
            ("logging.level", self.log_level),
            ("logging.format", self.log_format.map(|format| format.as_str().to_string())),
            ("pricing.default_tenant", self.default_tenant),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|value| (key, value)))
        .collect()
    }
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

/// Where the effective value of a setting came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SettingSource {
    Default,
    File(PathBuf),
    Env(&'static str),
    Override,
}

impl fmt::Display for SettingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("default"),
            Self::File(path) => write!(f, "file ({})", path.display()),
            Self::Env(key) => write!(f, "env ({key})"),
            Self::Override => f.write_str("override"),
        }
    }
}

/// Effective configuration together with the origin of every setting.
#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    pub config: AppConfig,
    pub file: Option<PathBuf>,
    sources: BTreeMap<&'static str, SettingSource>,
}

impl ResolvedConfig {
    pub fn source_of(&self, key: &str) -> SettingSource {
        self.sources.get(key).cloned().unwrap_or(SettingSource::Default)
    }
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
    #[error("invalid value `{value}` for `{key}` from {origin}: {reason}")]
    InvalidSetting { key: &'static str, value: String, origin: SettingSource, reason: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://netprice.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
            pricing: PricingConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        Self::resolve(options).map(|resolved| resolved.config)
    }

    pub fn resolve(options: LoadOptions) -> Result<ResolvedConfig, ConfigError> {
        let mut resolved = ResolvedConfig {
            config: Self::default(),
            file: resolve_config_path(options.config_path.as_deref()),
            sources: BTreeMap::new(),
        };

        if let Some(path) = resolved.file.clone() {
            let table = read_table(&path)?;
            for setting in SETTINGS {
                let Some(value) = lookup(&table, setting.key) else {
                    continue;
                };
                let source = SettingSource::File(path.clone());
                let raw = scalar_text(value).ok_or_else(|| ConfigError::InvalidSetting {
                    key: setting.key,
                    value: value.to_string(),
                    origin: source.clone(),
                    reason: "expected a string, integer or boolean".to_string(),
                })?;
                resolved.set(setting.key, &raw, source)?;
            }
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        for setting in SETTINGS {
            let found =
                setting.env_keys.iter().find_map(|key| read_env(key).map(|raw| (*key, raw)));
            if let Some((env_key, raw)) = found {
                resolved.set(setting.key, &raw, SettingSource::Env(env_key))?;
            }
        }

        for (key, raw) in options.overrides.into_entries() {
            resolved.set(key, &raw, SettingSource::Override)?;
        }

        resolved.config.validate()?;
        Ok(resolved)
    }

    /// Display form of one setting, `None` for an unknown key.
    pub fn value_of(&self, key: &str) -> Option<String> {
        let value = match key {
            "database.url" => self.database.url.clone(),
            "database.max_connections" => self.database.max_connections.to_string(),
            "database.timeout_secs" => self.database.timeout_secs.to_string(),
            "logging.level" => self.logging.level.clone(),
            "logging.format" => self.logging.format.as_str().to_string(),
            "pricing.default_tenant" => {
                self.pricing.default_tenant.clone().unwrap_or_else(|| "<unset>".to_string())
            }
            "pricing.audit" => self.pricing.audit.to_string(),
            _ => return None,
        };
        Some(value)
    }

    fn assign(&mut self, key: &str, raw: &str) -> Result<(), String> {
        match key {
            "database.url" => self.database.url = raw.trim().to_string(),
            "database.max_connections" => self.database.max_connections = parse_count(raw)?,
            "database.timeout_secs" => self.database.timeout_secs = parse_count(raw)?,
            "logging.level" => self.logging.level = raw.trim().to_ascii_lowercase(),
            "logging.format" => self.logging.format = raw.parse()?,
            "pricing.default_tenant" => {
                let tenant = raw.trim();
                self.pricing.default_tenant = (!tenant.is_empty()).then(|| tenant.to_string());
            }
            "pricing.audit" => self.pricing.audit = parse_flag(raw)?,
            other => return Err(format!("unknown setting `{other}`")),
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_logging(&self.logging)?;
        validate_pricing(&self.pricing)?;
        Ok(())
    }
}

impl ResolvedConfig {
    fn set(
        &mut self,
        key: &'static str,
        raw: &str,
        source: SettingSource,
    ) -> Result<(), ConfigError> {
        if let Err(reason) = self.config.assign(key, raw) {
            return Err(ConfigError::InvalidSetting {
                key,
                value: raw.to_string(),
                origin: source,
                reason,
            });
        }
        self.sources.insert(key, source);
        Ok(())
    }
}

/// Config file that [`AppConfig::load`] would read, if any.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from(FALLBACK_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

/// Whether `key` names a known setting.
pub fn is_known_setting(key: &str) -> bool {
    SETTINGS.iter().any(|setting| setting.key == key)
}

fn read_table(path: &Path) -> Result<Table, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<Table>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn lookup<'a>(table: &'a Table, key: &str) -> Option<&'a Value> {
    let (section, field) = key.split_once('.')?;
    table.get(section)?.get(field)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Integer(number) => Some(number.to_string()),
        Value::Boolean(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Expands `${VAR}` references from the process environment.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find('}').ok_or(ConfigError::UnterminatedInterpolation)?;
        let var = &after[..end];
        let value = env::var(var)
            .map_err(|_| ConfigError::MissingEnvInterpolation { var: var.to_string() })?;
        output.push_str(&value);
        rest = &after[end + 1..];
    }
    output.push_str(rest);

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.as_str();
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
    if !(1..=300).contains(&database.timeout_secs) {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    match logging.level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn validate_pricing(pricing: &PricingConfig) -> Result<(), ConfigError> {
    match &pricing.default_tenant {
        Some(tenant) if tenant.chars().any(char::is_whitespace) => Err(ConfigError::Validation(
            format!("pricing.default_tenant `{tenant}` must not contain whitespace"),
        )),
        _ => Ok(()),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_count<T: FromStr>(raw: &str) -> Result<T, String> {
    raw.trim().parse().map_err(|_| "expected a non-negative integer".to_string())
}

fn parse_flag(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err("expected true or false".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};

    use tempfile::TempDir;

    use super::{
        is_known_setting, AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat,
        SettingSource, SETTINGS,
    };

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    /// Runs `body` with `vars` set, restoring a clean slate afterwards.
    fn with_vars<T>(
        vars: &[(&str, &str)],
        body: impl FnOnce() -> Result<T, String>,
    ) -> Result<T, String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        for (key, value) in vars {
            env::set_var(key, value);
        }
        let result = body();
        for (key, _) in vars {
            env::remove_var(key);
        }
        result
    }

    fn write_config(dir: &TempDir, contents: &str) -> Result<PathBuf, String> {
        let path = dir.path().join("netprice.toml");
        fs::write(&path, contents).map_err(|err| err.to_string())?;
        Ok(path)
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_are_valid_without_any_file() -> Result<(), String> {
        with_vars(&[], || {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let resolved = AppConfig::resolve(LoadOptions {
                config_path: Some(dir.path().join("absent.toml")),
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            let config = &resolved.config;
            ensure(config.database.url == "sqlite://netprice.db", "default database url")?;
            ensure(config.database.max_connections == 5, "default pool size")?;
            ensure(config.logging.format == LogFormat::Compact, "default log format")?;
            ensure(config.pricing.default_tenant.is_none(), "no default tenant")?;
            ensure(!config.pricing.audit, "audit is off by default")?;
            ensure(
                SETTINGS
                    .iter()
                    .all(|setting| resolved.source_of(setting.key) == SettingSource::Default),
                "every setting should come from defaults",
            )
        })
    }

    #[test]
    fn every_setting_has_a_display_value() {
        let config = AppConfig::default();
        for setting in SETTINGS {
            assert!(config.value_of(setting.key).is_some(), "{} has no value", setting.key);
            assert!(is_known_setting(setting.key));
        }
        assert_eq!(config.value_of("pricing.default_tenant").as_deref(), Some("<unset>"));
        assert!(!is_known_setting("server.bind_address"));
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        with_vars(&[("TEST_NETPRICE_DB_PATH", "/var/lib/netprice/conditions.db")], || {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = write_config(
                &dir,
                r#"
[database]
url = "sqlite://${TEST_NETPRICE_DB_PATH}"
max_connections = 2

[pricing]
default_tenant = "demo"
audit = true
"#,
            )?;

            let resolved = AppConfig::resolve(LoadOptions {
                config_path: Some(path.clone()),
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            let config = &resolved.config;
            ensure(
                config.database.url == "sqlite:///var/lib/netprice/conditions.db",
                "database url should be interpolated from environment",
            )?;
            ensure(config.database.max_connections == 2, "pool size should come from file")?;
            ensure(config.pricing.default_tenant.as_deref() == Some("demo"), "tenant from file")?;
            ensure(config.pricing.audit, "audit flag from file")?;
            ensure(
                resolved.source_of("pricing.audit") == SettingSource::File(path),
                "audit flag should be attributed to the file",
            )
        })
    }

    #[test]
    fn missing_interpolation_variable_is_reported() -> Result<(), String> {
        with_vars(&[], || {
            env::remove_var("TEST_NETPRICE_UNSET");
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = write_config(&dir, "[database]\nurl = \"${TEST_NETPRICE_UNSET}\"\n")?;

            let error = match AppConfig::load(LoadOptions {
                config_path: Some(path),
                ..LoadOptions::default()
            }) {
                Ok(_) => return Err("expected interpolation failure".to_string()),
                Err(error) => error,
            };
            ensure(
                matches!(
                    error,
                    ConfigError::MissingEnvInterpolation { ref var } if var == "TEST_NETPRICE_UNSET"
                ),
                "error should name the missing variable",
            )
        })
    }

    #[test]
    fn unterminated_interpolation_is_reported() -> Result<(), String> {
        with_vars(&[], || {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = write_config(&dir, "[database]\nurl = \"sqlite://${OPEN\"\n")?;

            let error = AppConfig::load(LoadOptions {
                config_path: Some(path),
                ..LoadOptions::default()
            });
            ensure(
                matches!(error, Err(ConfigError::UnterminatedInterpolation)),
                "unterminated expression should be reported",
            )
        })
    }

    #[test]
    fn env_aliases_are_supported_and_attributed() -> Result<(), String> {
        with_vars(
            &[
                ("NETPRICE_LOG_LEVEL", "WARN"),
                ("NETPRICE_LOG_FORMAT", "json"),
                ("NETPRICE_TENANT", "demo"),
            ],
            || {
                let resolved = AppConfig::resolve(LoadOptions::default())
                    .map_err(|err| format!("config load failed: {err}"))?;

                ensure(resolved.config.logging.level == "warn", "level from env alias")?;
                ensure(resolved.config.logging.format == LogFormat::Json, "format from env")?;
                ensure(
                    resolved.config.pricing.default_tenant.as_deref() == Some("demo"),
                    "tenant from env alias",
                )?;
                ensure(
                    resolved.source_of("logging.format")
                        == SettingSource::Env("NETPRICE_LOG_FORMAT"),
                    "format should name the alias that set it",
                )
            },
        )
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        with_vars(
            &[
                ("NETPRICE_DATABASE_URL", "sqlite://from-env.db"),
                ("NETPRICE_DATABASE_TIMEOUT_SECS", "12"),
            ],
            || {
                let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
                let path = write_config(
                    &dir,
                    r#"
[database]
url = "sqlite://from-file.db"
timeout_secs = 45
max_connections = 3

[logging]
level = "warn"
"#,
                )?;

                let resolved = AppConfig::resolve(LoadOptions {
                    config_path: Some(path),
                    overrides: ConfigOverrides {
                        database_url: Some("sqlite://from-override.db".to_string()),
                        log_level: Some("debug".to_string()),
                        ..ConfigOverrides::default()
                    },
                    ..LoadOptions::default()
                })
                .map_err(|err| format!("config load failed: {err}"))?;

                let config = &resolved.config;
                ensure(config.database.url == "sqlite://from-override.db", "override url wins")?;
                ensure(config.database.timeout_secs == 12, "env timeout wins over file")?;
                ensure(config.database.max_connections == 3, "file pool size wins over default")?;
                ensure(config.logging.level == "debug", "override log level wins")?;
                ensure(
                    resolved.source_of("database.timeout_secs")
                        == SettingSource::Env("NETPRICE_DATABASE_TIMEOUT_SECS"),
                    "timeout attributed to env",
                )?;
                ensure(
                    resolved.source_of("database.url") == SettingSource::Override,
                    "url attributed to override",
                )
            },
        )
    }

    #[test]
    fn invalid_values_name_setting_and_source() -> Result<(), String> {
        with_vars(&[("NETPRICE_DATABASE_MAX_CONNECTIONS", "many")], || {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => return Err("expected invalid setting".to_string()),
                Err(error) => error,
            };
            ensure(
                matches!(
                    error,
                    ConfigError::InvalidSetting {
                        key: "database.max_connections",
                        origin: SettingSource::Env("NETPRICE_DATABASE_MAX_CONNECTIONS"),
                        ..
                    }
                ),
                "error should name the setting and the variable",
            )
        })?;

        with_vars(&[("NETPRICE_PRICING_AUDIT", "sometimes")], || {
            ensure(
                matches!(
                    AppConfig::load(LoadOptions::default()),
                    Err(ConfigError::InvalidSetting { key: "pricing.audit", .. })
                ),
                "audit flag must be a boolean",
            )
        })
    }

    #[test]
    fn non_scalar_file_value_is_rejected() -> Result<(), String> {
        with_vars(&[], || {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = write_config(&dir, "[database]\nurl = [\"sqlite://a.db\"]\n")?;

            let error = AppConfig::load(LoadOptions {
                config_path: Some(path),
                ..LoadOptions::default()
            });
            ensure(
                matches!(error, Err(ConfigError::InvalidSetting { key: "database.url", .. })),
                "array value should be rejected",
            )
        })
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        with_vars(&[("NETPRICE_DATABASE_URL", "postgres://localhost/netprice")], || {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            ensure(
                matches!(
                    error,
                    ConfigError::Validation(ref message) if message.contains("database.url")
                ),
                "validation failure should mention database.url",
            )
        })?;

        with_vars(&[("NETPRICE_PRICING_DEFAULT_TENANT", "two words")], || {
            ensure(
                matches!(AppConfig::load(LoadOptions::default()), Err(ConfigError::Validation(_))),
                "tenant with whitespace is rejected",
            )
        })
    }

    #[test]
    fn required_file_must_exist() -> Result<(), String> {
        with_vars(&[], || {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;

            let error = match AppConfig::load(LoadOptions {
                config_path: Some(dir.path().join("netprice.toml")),
                require_file: true,
                ..LoadOptions::default()
            }) {
                Ok(_) => return Err("expected missing file failure".to_string()),
                Err(error) => error,
            };
            ensure(matches!(error, ConfigError::MissingConfigFile(_)), "missing file is reported")
        })
    }
}
