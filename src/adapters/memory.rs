use crate::domain::model::{
    ConnectionRequest, ConnectionStatus, PairKey, RequestId, User, UserId,
};
use crate::domain::ports::{ConnectionRequestStore, UserDirectory};
use crate::utils::error::{ConnectError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<RequestId, (u64, ConnectionRequest)>,
    pairs: HashMap<PairKey, RequestId>,
    next_seq: u64,
}

impl Inner {
    fn sorted(&self, mut keep: impl FnMut(&ConnectionRequest) -> bool) -> Vec<ConnectionRequest> {
        let mut hits: Vec<_> = self
            .records
            .values()
            .filter(|(_, record)| keep(record))
            .collect();
        hits.sort_by_key(|(seq, _)| *seq);
        hits.into_iter().map(|(_, record)| record.clone()).collect()
    }
}

/// Connection requests held in process memory.
///
/// The pair index and the records are updated under one write lock, so the
/// unordered-pair uniqueness holds even when callers race past `find_existing`.
#[derive(Debug, Default)]
pub struct MemoryConnectionStore {
    inner: RwLock<Inner>,
}

impl MemoryConnectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn require_id(field: &str, id: &UserId) -> Result<()> {
    if id.is_blank() {
        return Err(ConnectError::ValidationError {
            field: field.to_string(),
            reason: "user id is required".to_string(),
        });
    }
    Ok(())
}

#[async_trait]
impl ConnectionRequestStore for MemoryConnectionStore {
    async fn find_existing(&self, a: &UserId, b: &UserId) -> Result<Option<ConnectionRequest>> {
        let inner = self.inner.read().await;
        Ok(inner
            .pairs
            .get(&PairKey::new(a, b))
            .and_then(|id| inner.records.get(id))
            .map(|(_, record)| record.clone()))
    }

    async fn create(
        &self,
        from_user_id: &UserId,
        to_user_id: &UserId,
        status: ConnectionStatus,
    ) -> Result<ConnectionRequest> {
        require_id("fromUserId", from_user_id)?;
        require_id("toUserId", to_user_id)?;

        let mut inner = self.inner.write().await;
        let key = PairKey::new(from_user_id, to_user_id);
        if inner.pairs.contains_key(&key) {
            return Err(ConnectError::DuplicateConnection);
        }

        let now = Utc::now();
        let record = ConnectionRequest {
            id: RequestId::generate(),
            from_user_id: from_user_id.clone(),
            to_user_id: to_user_id.clone(),
            status,
            created_at: now,
            updated_at: now,
        };

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.pairs.insert(key, record.id.clone());
        inner
            .records
            .insert(record.id.clone(), (seq, record.clone()));
        Ok(record)
    }

    async fn find_pending_reviewable(
        &self,
        request_id: &RequestId,
        to_user_id: &UserId,
    ) -> Result<Option<ConnectionRequest>> {
        let inner = self.inner.read().await;
        Ok(inner
            .records
            .get(request_id)
            .map(|(_, record)| record)
            .filter(|record| {
                &record.to_user_id == to_user_id && record.status == ConnectionStatus::Interested
            })
            .cloned())
    }

    async fn update_status(
        &self,
        record: &ConnectionRequest,
        new_status: ConnectionStatus,
    ) -> Result<ConnectionRequest> {
        let mut inner = self.inner.write().await;
        let not_found = || ConnectError::RequestNotFound {
            request_id: record.id.to_string(),
        };
        let (_, stored) = inner.records.get_mut(&record.id).ok_or_else(not_found)?;

        // re-checked under the write lock so only one concurrent review wins
        if !stored.status.can_transition_to(new_status) {
            return Err(not_found());
        }

        stored.status = new_status;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn list_received(
        &self,
        to_user_id: &UserId,
        status: ConnectionStatus,
    ) -> Result<Vec<ConnectionRequest>> {
        let inner = self.inner.read().await;
        Ok(inner.sorted(|record| &record.to_user_id == to_user_id && record.status == status))
    }

    async fn list_connections(&self, user_id: &UserId) -> Result<Vec<ConnectionRequest>> {
        let inner = self.inner.read().await;
        Ok(inner.sorted(|record| {
            record.status == ConnectionStatus::Accepted && record.involves(user_id)
        }))
    }
}

#[derive(Debug, Default)]
pub struct MemoryUserDirectory {
    users: RwLock<HashMap<UserId, User>>,
}

impl MemoryUserDirectory {
    pub fn from_users(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: RwLock::new(users.into_iter().map(|u| (u.id.clone(), u)).collect()),
        }
    }

    pub async fn remove(&self, user_id: &UserId) -> Option<User> {
        self.users.write().await.remove(user_id)
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find_by_id(&self, user_id: &UserId) -> Result<Option<User>> {
        Ok(self.users.read().await.get(user_id).cloned())
    }
}
