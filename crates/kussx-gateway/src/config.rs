//! Process configuration.
//!
//! Values are looked up by name in two layers: a snapshot of the process
//! environment and an optional flat JSON document. An environment value
//! always wins over a document value of the same name.

use kussx_codec::{CodecSettings, Salt};
use kussx_shortener::ServiceSettings;
use kussx_storage::RedisSettings;
use std::collections::HashMap;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const SALT: &str = "KUSSX_SALT";
pub const KEY_MIN_LENGTH: &str = "KUSSX_KEY_MIN_LENGTH";
pub const STORE_BACKEND: &str = "KUSSX_STORE_BACKEND";
pub const REDIS_HOST: &str = "KUSSX_REDIS_HOST";
pub const REDIS_PORT: &str = "KUSSX_REDIS_PORT";
pub const REDIS_AUTH_PASSWORD: &str = "KUSSX_REDIS_AUTH_PASSWORD";
pub const STORE_TIMEOUT_MS: &str = "KUSSX_STORE_TIMEOUT_MS";
pub const API_HOST: &str = "KUSSX_API_HOST";
pub const API_PORT: &str = "KUSSX_API_PORT";
pub const MAX_ALLOCATION_ATTEMPTS: &str = "KUSSX_MAX_ALLOCATION_ATTEMPTS";
pub const ACCESS_WORKERS: &str = "KUSSX_ACCESS_WORKERS";
pub const ACCESS_QUEUE_CAPACITY: &str = "KUSSX_ACCESS_QUEUE_CAPACITY";
pub const LOG_FORMAT: &str = "KUSSX_LOG_FORMAT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config document: {0}")]
    InvalidDocument(String),
    #[error("invalid value for {name}: '{value}' ({reason})")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },
}

/// Layered name/value resolver.
#[derive(Debug, Clone, Default)]
pub struct Configuration {
    document: HashMap<String, String>,
    env: HashMap<String, String>,
}

impl Configuration {
    pub fn new(document: HashMap<String, String>, env: HashMap<String, String>) -> Self {
        Self { document, env }
    }

    /// Reads the document at `path` (if any) and snapshots the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let document = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
                parse_document(&raw)?
            }
            None => HashMap::new(),
        };

        Ok(Self::new(document, std::env::vars().collect()))
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.env
            .get(name)
            .or_else(|| self.document.get(name))
            .map(String::as_str)
    }

    pub fn get_str_or(&self, name: &str, default: &str) -> String {
        self.get_str_or_else(name, || default.to_string())
    }

    pub fn get_str_or_else(&self, name: &str, default: impl FnOnce() -> String) -> String {
        self.get_str(name).map(str::to_string).unwrap_or_else(default)
    }

    /// Parses the value of `name`, or returns `default` if it is unset.
    pub fn get_parsed<T>(&self, name: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.get_str(name) {
            None => Ok(default),
            Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
                name: name.to_string(),
                value: value.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

/// A flat JSON object; strings are taken as-is, numbers and booleans in
/// their JSON spelling, `null` as absent.
fn parse_document(raw: &str) -> Result<HashMap<String, String>, ConfigError> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| ConfigError::InvalidDocument(e.to_string()))?;

    let serde_json::Value::Object(entries) = value else {
        return Err(ConfigError::InvalidDocument(
            "top level must be an object".to_string(),
        ));
    };

    let mut document = HashMap::with_capacity(entries.len());
    for (name, value) in entries {
        let value = match value {
            serde_json::Value::Null => continue,
            serde_json::Value::String(s) => s,
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Bool(b) => b.to_string(),
            _ => {
                return Err(ConfigError::InvalidDocument(format!(
                    "'{name}' must be a string, number or boolean"
                )))
            }
        };
        document.insert(name, value);
    }
    Ok(document)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Redis,
    InMemory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "redis" => Ok(Self::Redis),
            "in-memory" => Ok(Self::InMemory),
            other => Err(format!("expected 'redis' or 'in-memory', got '{other}'")),
        }
    }
}

impl Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::Redis => write!(f, "redis"),
            StoreBackend::InMemory => write!(f, "in-memory"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("expected 'text' or 'json', got '{other}'")),
        }
    }
}

/// Typed, validated settings for the `kussx` binary.
#[derive(Debug, Clone)]
pub struct Settings {
    pub salt: Salt,
    /// No salt was configured and `salt` was drawn for this process.
    pub salt_generated: bool,
    pub key_min_length: usize,
    pub store_backend: StoreBackend,
    pub redis: RedisSettings,
    pub api_host: String,
    pub api_port: u16,
    pub service: ServiceSettings,
    pub log_format: LogFormat,
}

impl Settings {
    pub fn from_config(config: &Configuration) -> Result<Self, ConfigError> {
        let mut redis = RedisSettings::builder()
            .host(config.get_str_or(REDIS_HOST, "localhost"))
            .port(config.get_parsed(REDIS_PORT, 6379)?)
            .timeout(Duration::from_millis(
                config.get_parsed(STORE_TIMEOUT_MS, 2000)?,
            ))
            .build();
        redis.password = config
            .get_str(REDIS_AUTH_PASSWORD)
            .filter(|password| !password.is_empty())
            .map(str::to_string);

        let service = ServiceSettings::builder()
            .max_allocation_attempts(positive(config, MAX_ALLOCATION_ATTEMPTS, 5)?)
            .access_workers(positive(config, ACCESS_WORKERS, 4)?)
            .access_queue_capacity(positive(config, ACCESS_QUEUE_CAPACITY, 1024)?)
            .build();

        let (salt, salt_generated) = match config.get_str(SALT).filter(|salt| !salt.is_empty()) {
            Some(salt) => (Salt::from(salt), false),
            None => (Salt::generate(), true),
        };

        Ok(Self {
            salt,
            salt_generated,
            key_min_length: config.get_parsed(KEY_MIN_LENGTH, 0)?,
            store_backend: config.get_parsed(STORE_BACKEND, StoreBackend::Redis)?,
            redis,
            api_host: config.get_str_or(API_HOST, "0.0.0.0"),
            api_port: config.get_parsed(API_PORT, 8080)?,
            service,
            log_format: config.get_parsed(LOG_FORMAT, LogFormat::Text)?,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }

    pub fn codec_settings(&self) -> CodecSettings {
        CodecSettings::builder()
            .salt(self.salt.clone())
            .min_length(self.key_min_length)
            .build()
    }
}

fn positive<T>(config: &Configuration, name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + Default + PartialEq + Display,
    T::Err: Display,
{
    let value = config.get_parsed(name, default)?;
    if value == T::default() {
        return Err(ConfigError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn config(document: &[(&str, &str)], env: &[(&str, &str)]) -> Configuration {
        Configuration::new(map(document), map(env))
    }

    #[test]
    fn environment_overrides_document() {
        let config = config(
            &[(API_PORT, "9000"), (API_HOST, "127.0.0.1")],
            &[(API_PORT, "9100")],
        );

        assert_eq!(config.get_str(API_PORT), Some("9100"));
        assert_eq!(config.get_str(API_HOST), Some("127.0.0.1"));
        assert_eq!(config.get_str(REDIS_HOST), None);
        assert_eq!(config.get_str_or(REDIS_HOST, "localhost"), "localhost");
    }

    #[test]
    fn get_parsed_reports_bad_values() {
        let config = config(&[], &[(API_PORT, "eighty")]);

        let err = config.get_parsed::<u16>(API_PORT, 8080).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref name, .. } if name == API_PORT));
        assert_eq!(config.get_parsed::<u16>(REDIS_PORT, 6379).unwrap(), 6379);
    }

    #[test]
    fn document_accepts_scalars() {
        let document = parse_document(
            r#"{"KUSSX_API_PORT": 9000, "KUSSX_SALT": "pepper", "KUSSX_REDIS_AUTH_PASSWORD": null, "X": true}"#,
        )
        .unwrap();

        assert_eq!(document.get(API_PORT).map(String::as_str), Some("9000"));
        assert_eq!(document.get(SALT).map(String::as_str), Some("pepper"));
        assert_eq!(document.get("X").map(String::as_str), Some("true"));
        assert!(!document.contains_key(REDIS_AUTH_PASSWORD));
    }

    #[test]
    fn document_rejects_nested_values() {
        assert!(matches!(
            parse_document(r#"{"KUSSX_API_PORT": [1]}"#),
            Err(ConfigError::InvalidDocument(_))
        ));
        assert!(matches!(
            parse_document("[]"),
            Err(ConfigError::InvalidDocument(_))
        ));
        assert!(matches!(
            parse_document("not json"),
            Err(ConfigError::InvalidDocument(_))
        ));
    }

    #[test]
    fn settings_defaults() {
        let settings = Settings::from_config(&Configuration::default()).unwrap();

        assert!(settings.salt_generated);
        assert_eq!(settings.key_min_length, 0);
        assert_eq!(settings.store_backend, StoreBackend::Redis);
        assert_eq!(settings.redis.host, "localhost");
        assert_eq!(settings.redis.port, 6379);
        assert_eq!(settings.redis.password, None);
        assert_eq!(settings.redis.timeout, Duration::from_millis(2000));
        assert_eq!(settings.listen_addr(), "0.0.0.0:8080");
        assert_eq!(settings.service.max_allocation_attempts, 5);
        assert_eq!(settings.service.access_workers, 4);
        assert_eq!(settings.service.access_queue_capacity, 1024);
        assert_eq!(settings.log_format, LogFormat::Text);
    }

    #[test]
    fn settings_from_both_layers() {
        let config = config(
            &[
                (SALT, "from-document"),
                (STORE_BACKEND, "redis"),
                (REDIS_HOST, "cache"),
                (KEY_MIN_LENGTH, "6"),
            ],
            &[
                (SALT, "from-env"),
                (STORE_BACKEND, "in-memory"),
                (REDIS_AUTH_PASSWORD, "hunter2"),
                (STORE_TIMEOUT_MS, "250"),
                (LOG_FORMAT, "json"),
            ],
        );

        let settings = Settings::from_config(&config).unwrap();

        assert_eq!(settings.salt, Salt::from("from-env"));
        assert!(!settings.salt_generated);
        assert_eq!(settings.key_min_length, 6);
        assert_eq!(settings.store_backend, StoreBackend::InMemory);
        assert_eq!(settings.redis.host, "cache");
        assert_eq!(settings.redis.password.as_deref(), Some("hunter2"));
        assert_eq!(settings.redis.timeout, Duration::from_millis(250));
        assert_eq!(settings.log_format, LogFormat::Json);
    }

    #[test]
    fn empty_salt_and_password_count_as_unset() {
        let config = config(&[], &[(SALT, ""), (REDIS_AUTH_PASSWORD, "")]);

        let settings = Settings::from_config(&config).unwrap();

        assert!(settings.salt_generated);
        assert_ne!(settings.salt, Salt::from(""));
        assert_eq!(settings.redis.password, None);
    }

    #[test]
    fn zero_sized_service_settings_are_rejected() {
        for name in [MAX_ALLOCATION_ATTEMPTS, ACCESS_WORKERS, ACCESS_QUEUE_CAPACITY] {
            let config = config(&[], &[(name, "0")]);
            assert!(matches!(
                Settings::from_config(&config),
                Err(ConfigError::InvalidValue { .. })
            ));
        }
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let config = config(&[], &[(STORE_BACKEND, "mysql")]);
        assert!(matches!(
            Settings::from_config(&config),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn configured_salt_is_stable() {
        let config = config(&[], &[(SALT, "pepper")]);
        let settings = Settings::from_config(&config).unwrap();

        let first = kussx_codec::KeyCodec::new(settings.codec_settings()).unwrap();
        let second = kussx_codec::KeyCodec::new(settings.codec_settings()).unwrap();

        assert_eq!(first.encode(42), second.encode(42));
    }

    #[test]
    fn generated_salt_is_drawn_once() {
        let settings = Settings::from_config(&Configuration::default()).unwrap();

        let first = kussx_codec::KeyCodec::new(settings.codec_settings()).unwrap();
        let second = kussx_codec::KeyCodec::new(settings.codec_settings()).unwrap();

        assert_eq!(first.encode(42), second.encode(42));
    }

    #[test]
    fn debug_hides_secrets() {
        let config = config(
            &[],
            &[(SALT, "pepper-material"), (REDIS_AUTH_PASSWORD, "hunter2")],
        );
        let settings = Settings::from_config(&config).unwrap();

        let debug = format!("{settings:?}");

        assert!(!debug.contains("pepper-material"));
        assert!(!debug.contains("hunter2"));
    }
}
