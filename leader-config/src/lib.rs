//! Loader for the bot configuration: YAML files plus environment overlays.
//!
//! Sources are merged in the order they are added, with `LEADER__`-prefixed
//! environment variables always applied last (`LEADER__STREAM__STATS_PASS`
//! overrides `stream.stats_pass`). String values may contain `${VAR}`
//! placeholders, which are expanded after merging.
//!
//! Every section has defaults, so an empty document is a valid configuration;
//! the stats command simply stays disabled until `stream.stats_url` is set.
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::path::Path;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const DEFAULT_TIMEOUT_SECS: u64 = 2;

#[derive(Debug, Default, Deserialize)]
pub struct LeaderConfig {
    pub version: Option<String>,
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct BotConfig {
    #[serde(default = "default_nick")]
    pub nick: String,
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            nick: default_nick(),
            command_prefix: default_command_prefix(),
        }
    }
}

/// Where the SHOUTcast status XML lives and how to log in to it.
#[derive(Debug, Default, Deserialize)]
pub struct StreamConfig {
    #[serde(default)]
    pub stats_url: String,
    #[serde(default)]
    pub stats_user: String,
    #[serde(default)]
    pub stats_pass: String,
}

impl StreamConfig {
    /// `(user, pass)` when both are set; a half-configured pair means no auth.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        if self.stats_user.is_empty() || self.stats_pass.is_empty() {
            None
        } else {
            Some((&self.stats_user, &self.stats_pass))
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.stats_url.trim().is_empty()
    }
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs", deserialize_with = "secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_timeout_secs", deserialize_with = "secs")]
    pub io_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: DEFAULT_TIMEOUT_SECS,
            io_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

fn default_nick() -> String {
    "Leader-1".into()
}
fn default_command_prefix() -> String {
    "!".into()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

// Environment overrides always arrive as strings.
fn secs<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Text(String),
    }
    match Raw::deserialize(d)? {
        Raw::Num(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder over the `config` crate wiring.
pub struct LeaderConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    env_prefix: String,
}

impl Default for LeaderConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl LeaderConfigLoader {
    /// ```
    /// use leader_config::LeaderConfigLoader;
    ///
    /// let config = LeaderConfigLoader::new()
    ///     .with_yaml_str("version: '1'\nbot:\n  nick: Mighty")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.bot.nick, "Mighty");
    /// assert_eq!(config.bot.command_prefix, "!");
    /// assert_eq!(config.http.io_timeout_secs, 2);
    /// ```
    pub fn new() -> Self {
        Self::with_env_prefix("LEADER")
    }

    /// Same as [`LeaderConfigLoader::new`] but reading `<prefix>__` variables.
    pub fn with_env_prefix(prefix: &str) -> Self {
        Self {
            builder: Config::builder(),
            env_prefix: prefix.to_string(),
        }
    }

    /// Attach a file that must exist; format is inferred from its suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is silently skipped when missing, so a bot can run
    /// from environment variables alone.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self.builder.add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Merge all sources, expand `${VAR}` placeholders and deserialize.
    ///
    /// ```
    /// use leader_config::LeaderConfigLoader;
    ///
    /// unsafe { std::env::set_var("DOC_STATS_PASS", "hunter2"); }
    ///
    /// let config = LeaderConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// stream:
    ///   stats_url: "http://radio.example.com:8000/admin.cgi?mode=viewxml"
    ///   stats_user: admin
    ///   stats_pass: "${DOC_STATS_PASS}"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.stream.credentials(), Some(("admin", "hunter2")));
    ///
    /// unsafe { std::env::remove_var("DOC_STATS_PASS"); }
    /// ```
    pub fn load(self) -> Result<LeaderConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(Environment::with_prefix(&self.env_prefix).separator("__"))
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        // An empty document deserializes to unit rather than a map.
        if v.is_null() {
            v = Value::Object(Default::default());
        }

        let typed: LeaderConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        if typed.http.connect_timeout_secs == 0 || typed.http.io_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "http timeouts must be at least one second".into(),
            ));
        }

        Ok(typed)
    }
}
