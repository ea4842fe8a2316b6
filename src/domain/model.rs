use crate::utils::error::{ConnectError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Directory record. Credentials live with the auth gate, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
}

impl User {
    pub fn display_name(&self) -> &str {
        &self.first_name
    }
}

/// The verified caller, produced only by an [`AuthGate`](crate::domain::ports::AuthGate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    user_id: UserId,
}

impl Identity {
    pub(crate) fn verified(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Interested,
    Ignored,
    Accepted,
    Rejected,
}

impl ConnectionStatus {
    pub const SENDABLE: [&'static str; 2] = ["ignored", "interested"];
    pub const REVIEWABLE: [&'static str; 2] = ["accepted", "rejected"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Interested => "interested",
            Self::Ignored => "ignored",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status a sender may choose when creating a request.
    pub fn parse_sendable(value: &str) -> Result<Self> {
        match value.parse::<Self>() {
            Ok(status @ (Self::Interested | Self::Ignored)) => Ok(status),
            _ => Err(ConnectError::invalid_status(value, &Self::SENDABLE)),
        }
    }

    /// Parses a status a recipient may set when reviewing a request.
    pub fn parse_reviewable(value: &str) -> Result<Self> {
        match value.parse::<Self>() {
            Ok(status @ (Self::Accepted | Self::Rejected)) => Ok(status),
            _ => Err(ConnectError::invalid_status(value, &Self::REVIEWABLE)),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Interested)
    }

    pub fn can_transition_to(&self, next: ConnectionStatus) -> bool {
        matches!(
            (self, next),
            (Self::Interested, Self::Accepted) | (Self::Interested, Self::Rejected)
        )
    }
}

impl FromStr for ConnectionStatus {
    type Err = ConnectError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "interested" => Ok(Self::Interested),
            "ignored" => Ok(Self::Ignored),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(ConnectError::invalid_status(
                other,
                &["interested", "ignored", "accepted", "rejected"],
            )),
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRequest {
    pub id: RequestId,
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    pub status: ConnectionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConnectionRequest {
    pub fn involves(&self, user_id: &UserId) -> bool {
        &self.from_user_id == user_id || &self.to_user_id == user_id
    }

    /// The other side of the relationship, seen from `user_id`.
    pub fn counterpart(&self, user_id: &UserId) -> &UserId {
        if &self.from_user_id == user_id {
            &self.to_user_id
        } else {
            &self.from_user_id
        }
    }
}

/// Direction-free key for a pair of users; `(a, b)` and `(b, a)` map to the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PairKey(UserId, UserId);

impl PairKey {
    pub fn new(a: &UserId, b: &UserId) -> Self {
        if a <= b {
            Self(a.clone(), b.clone())
        } else {
            Self(b.clone(), a.clone())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created {
        request: ConnectionRequest,
        target: User,
    },
    AlreadyExists {
        existing: Option<ConnectionRequest>,
    },
}

impl CreateOutcome {
    pub fn message(&self) -> String {
        match self {
            Self::Created { request, target } => format!(
                "you are {} {}'s account",
                request.status,
                target.display_name()
            ),
            Self::AlreadyExists { .. } => "connection was made before".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedRequest {
    pub request: ConnectionRequest,
    pub from_user: User,
}
