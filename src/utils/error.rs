use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConnectError {
    #[error("status is not valid: {value} (allowed: {allowed})")]
    InvalidStatus { value: String, allowed: String },

    #[error("you can not send a connection request to yourself")]
    SelfConnection,

    #[error("user not exist: {user_id}")]
    UserNotFound { user_id: String },

    #[error("connection request not found: {request_id}")]
    RequestNotFound { request_id: String },

    #[error("Validation error on {field}: {reason}")]
    ValidationError { field: String, reason: String },

    #[error("a connection between these users already exists")]
    DuplicateConnection,

    #[error("missing or unknown credentials")]
    Unauthorized,

    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Caller,
    Auth,
    Storage,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ConnectError {
    pub fn invalid_status(value: &str, allowed: &[&str]) -> Self {
        Self::InvalidStatus {
            value: value.to_string(),
            allowed: allowed.join(", "),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidStatus { .. }
            | Self::SelfConnection
            | Self::UserNotFound { .. }
            | Self::RequestNotFound { .. }
            | Self::ValidationError { .. }
            | Self::DuplicateConnection => ErrorCategory::Caller,
            Self::Unauthorized => ErrorCategory::Auth,
            Self::StorageError { .. } => ErrorCategory::Storage,
            Self::TomlError(_)
            | Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Caller | ErrorCategory::Auth => ErrorSeverity::Low,
            ErrorCategory::Storage => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Stable machine-readable code, used in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidStatus { .. } => "invalid_status",
            Self::SelfConnection => "self_connection",
            Self::UserNotFound { .. } => "user_not_found",
            Self::RequestNotFound { .. } => "request_not_found",
            Self::ValidationError { .. } => "validation_error",
            Self::DuplicateConnection => "duplicate_connection",
            Self::Unauthorized => "unauthorized",
            Self::StorageError { .. } => "storage_error",
            Self::IoError(_) => "internal_error",
            Self::TomlError(_)
            | Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. } => "config_error",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Caller | ErrorCategory::Auth => self.to_string(),
            ErrorCategory::Storage => "the request could not be stored, try again".to_string(),
            ErrorCategory::Configuration => format!("configuration problem: {}", self),
            ErrorCategory::System => "internal error".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::InvalidStatus { .. } => "use one of the allowed status values",
            Self::SelfConnection => "pick another user as the target",
            Self::UserNotFound { .. } => "check the target user id",
            Self::RequestNotFound { .. } => {
                "check the request id; it may already have been reviewed"
            }
            Self::ValidationError { .. } => "check the request parameters",
            Self::DuplicateConnection => "the existing connection request is kept",
            Self::Unauthorized => "send a valid bearer token",
            Self::StorageError { .. } => "retry the request later",
            Self::TomlError(_) => "fix the TOML syntax in the config file",
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. } => "review the configuration file and CLI flags",
            Self::IoError(_) => "check file paths and permissions",
        }
    }
}

impl ErrorSeverity {
    /// Process exit code; low-severity failures still count as success.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Low => 0,
            Self::Medium => 2,
            Self::High => 1,
            Self::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConnectError>;
