use crate::domain::model::{User, UserId};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{ConnectError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub workflow: WorkflowConfig,
    #[serde(default)]
    pub users: Vec<SeedUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

fn default_bind_addr() -> String {
    DEFAULT_BIND_ADDR.to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowConfig {
    #[serde(default)]
    pub allow_self_connection: bool,
}

/// A directory entry plus the bearer token issued to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUser {
    pub id: String,
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub token: String,
}

impl SeedUser {
    pub fn to_user(&self) -> User {
        User {
            id: UserId::new(&self.id),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ConnectError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content);
        Ok(toml::from_str(&processed)?)
    }

    pub fn tokens(&self) -> impl Iterator<Item = (String, UserId)> + '_ {
        self.users
            .iter()
            .map(|u| (u.token.clone(), UserId::new(&u.id)))
    }

    pub fn directory_users(&self) -> impl Iterator<Item = User> + '_ {
        self.users.iter().map(SeedUser::to_user)
    }
}

fn env_var_pattern() -> &'static Regex {
    static ENV_VAR: OnceLock<Regex> = OnceLock::new();
    ENV_VAR.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("static pattern compiles")
    })
}

/// Replaces `${VAR}` with the environment value; unknown variables are left as-is
/// and rejected later by `validate()`.
fn substitute_env_vars(content: &str) -> String {
    env_var_pattern()
        .replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
}

fn validate_resolved(field_name: &str, value: &str) -> Result<()> {
    if env_var_pattern().is_match(value) {
        return Err(ConnectError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "unresolved environment variable".to_string(),
        });
    }
    Ok(())
}

impl ConfigProvider for TomlConfig {
    fn bind_addr(&self) -> &str {
        &self.server.bind_addr
    }

    fn allow_self_connection(&self) -> bool {
        self.workflow.allow_self_connection
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_resolved("server.bind_addr", &self.server.bind_addr)?;
        validation::validate_socket_addr("server.bind_addr", &self.server.bind_addr)?;

        if let Some(level) = &self.logging.level {
            validate_resolved("logging.level", level)?;
            validation::validate_one_of("logging.level", level, &LOG_LEVELS)?;
        }

        for user in &self.users {
            validate_resolved("users.id", &user.id)?;
            validate_resolved("users.first_name", &user.first_name)?;
            validate_resolved("users.last_name", &user.last_name)?;
            validate_resolved("users.token", &user.token)?;
            validation::validate_non_empty_string("users.id", &user.id)?;
            validation::validate_non_empty_string("users.first_name", &user.first_name)?;
            validation::validate_non_empty_string("users.token", &user.token)?;
        }
        validation::validate_unique("users.id", self.users.iter().map(|u| u.id.as_str()))?;
        validation::validate_unique("users.token", self.users.iter().map(|u| u.token.as_str()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[server]
bind_addr = "0.0.0.0:8080"

[logging]
level = "debug"
json = true

[workflow]
allow_self_connection = true

[[users]]
id = "u-alice"
first_name = "Alice"
last_name = "Smith"
token = "alice-token"

[[users]]
id = "u-bob"
first_name = "Bob"
token = "bob-token"
"#;

    #[test]
    fn test_parse_full_config() {
        let config = TomlConfig::from_toml_str(SAMPLE).unwrap();

        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert!(config.allow_self_connection());
        assert!(config.logging.json);
        assert_eq!(config.users.len(), 2);
        assert_eq!(config.users[1].last_name, "");
        assert!(config.validate().is_ok());

        let tokens: Vec<_> = config.tokens().collect();
        assert_eq!(tokens[0], ("alice-token".to_string(), UserId::new("u-alice")));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config.bind_addr(), DEFAULT_BIND_ADDR);
        assert!(!config.allow_self_connection());
        assert!(config.users.is_empty());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("LINKUP_TEST_TOKEN", "from-env");

        let content = r#"
[[users]]
id = "u1"
first_name = "Env"
token = "${LINKUP_TEST_TOKEN}"
"#;
        let config = TomlConfig::from_toml_str(content).unwrap();
        assert_eq!(config.users[0].token, "from-env");

        std::env::remove_var("LINKUP_TEST_TOKEN");
    }

    #[test]
    fn test_unset_env_var_fails_validation() {
        std::env::remove_var("LINKUP_UNSET_TOKEN");

        let content = r#"
[[users]]
id = "u1"
first_name = "Env"
token = "${LINKUP_UNSET_TOKEN}"
"#;
        let config = TomlConfig::from_toml_str(content).unwrap();
        assert_eq!(config.users[0].token, "${LINKUP_UNSET_TOKEN}");

        match config.validate().unwrap_err() {
            ConnectError::InvalidConfigValueError { field, reason, .. } => {
                assert_eq!(field, "users.token");
                assert_eq!(reason, "unresolved environment variable");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unresolved_bind_addr_fails_validation() {
        let content = "[server]\nbind_addr = \"${LINKUP_UNSET_ADDR}\"\n";
        std::env::remove_var("LINKUP_UNSET_ADDR");

        let config = TomlConfig::from_toml_str(content).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("unresolved environment variable"));
    }

    #[test]
    fn test_duplicate_tokens_fail_validation() {
        let content = r#"
[[users]]
id = "u1"
first_name = "One"
token = "same"

[[users]]
id = "u2"
first_name = "Two"
token = "same"
"#;
        let config = TomlConfig::from_toml_str(content).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("users.token"));
    }

    #[test]
    fn test_bad_toml_is_reported() {
        let err = TomlConfig::from_toml_str("[server").unwrap_err();
        assert!(matches!(err, ConnectError::TomlError(_)));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.users[0].first_name, "Alice");
    }
}
