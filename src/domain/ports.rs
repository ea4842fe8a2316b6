use crate::domain::model::{ConnectionRequest, ConnectionStatus, Identity, RequestId, User, UserId};
use crate::utils::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_id(&self, user_id: &UserId) -> Result<Option<User>>;
}

/// Persistence for connection requests.
///
/// Implementations must keep at most one record per unordered pair of users
/// and report a second `create` for the same pair as
/// [`ConnectError::DuplicateConnection`](crate::utils::error::ConnectError::DuplicateConnection).
#[async_trait]
pub trait ConnectionRequestStore: Send + Sync {
    async fn find_existing(&self, a: &UserId, b: &UserId) -> Result<Option<ConnectionRequest>>;

    async fn create(
        &self,
        from_user_id: &UserId,
        to_user_id: &UserId,
        status: ConnectionStatus,
    ) -> Result<ConnectionRequest>;

    async fn find_pending_reviewable(
        &self,
        request_id: &RequestId,
        to_user_id: &UserId,
    ) -> Result<Option<ConnectionRequest>>;

    async fn update_status(
        &self,
        record: &ConnectionRequest,
        new_status: ConnectionStatus,
    ) -> Result<ConnectionRequest>;

    async fn list_received(
        &self,
        to_user_id: &UserId,
        status: ConnectionStatus,
    ) -> Result<Vec<ConnectionRequest>>;

    async fn list_connections(&self, user_id: &UserId) -> Result<Vec<ConnectionRequest>>;
}

#[async_trait]
pub trait AuthGate: Send + Sync {
    /// Resolves a bearer token to the identity it was issued to.
    async fn authenticate(&self, token: &str) -> Result<Identity>;
}

pub trait ConfigProvider: Send + Sync {
    fn bind_addr(&self) -> &str;
    fn allow_self_connection(&self) -> bool;
}
