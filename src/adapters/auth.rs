use crate::domain::model::{Identity, UserId};
use crate::domain::ports::AuthGate;
use crate::utils::error::{ConnectError, Result};
use async_trait::async_trait;
use std::collections::HashMap;

/// Auth gate backed by a fixed token table, loaded from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenAuth {
    tokens: HashMap<String, UserId>,
}

impl StaticTokenAuth {
    pub fn new(tokens: impl IntoIterator<Item = (String, UserId)>) -> Self {
        Self {
            tokens: tokens.into_iter().collect(),
        }
    }
}

#[async_trait]
impl AuthGate for StaticTokenAuth {
    async fn authenticate(&self, token: &str) -> Result<Identity> {
        self.tokens
            .get(token)
            .cloned()
            .map(Identity::verified)
            .ok_or(ConnectError::Unauthorized)
    }
}
