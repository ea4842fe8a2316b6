use crate::domain::model::{
    ConnectionRequest, ConnectionStatus, CreateOutcome, Identity, ReceivedRequest, RequestId,
    User, UserId,
};
use crate::domain::ports::{ConnectionRequestStore, UserDirectory};
use crate::utils::error::{ConnectError, Result};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct WorkflowSettings {
    pub allow_self_connection: bool,
}

/// Applies the connection-request rules on top of a store and a user directory.
#[derive(Clone)]
pub struct ConnectionWorkflow {
    store: Arc<dyn ConnectionRequestStore>,
    directory: Arc<dyn UserDirectory>,
    settings: WorkflowSettings,
}

impl ConnectionWorkflow {
    pub fn new(
        store: Arc<dyn ConnectionRequestStore>,
        directory: Arc<dyn UserDirectory>,
        settings: WorkflowSettings,
    ) -> Self {
        Self {
            store,
            directory,
            settings,
        }
    }

    pub async fn create_request(
        &self,
        caller: &Identity,
        target_user_id: &UserId,
        status: &str,
    ) -> Result<CreateOutcome> {
        let status = ConnectionStatus::parse_sendable(status).inspect_err(|e| {
            tracing::warn!("Rejected connection request from {}: {}", caller.user_id(), e);
        })?;
        let from = caller.user_id();

        if from == target_user_id && !self.settings.allow_self_connection {
            tracing::warn!("User {} tried to connect to themselves", from);
            return Err(ConnectError::SelfConnection);
        }

        let target = self
            .directory
            .find_by_id(target_user_id)
            .await?
            .ok_or_else(|| ConnectError::UserNotFound {
                user_id: target_user_id.to_string(),
            })?;

        if let Some(existing) = self.store.find_existing(from, target_user_id).await? {
            tracing::debug!(
                "Connection between {} and {} already recorded as {}",
                from,
                target_user_id,
                existing.id
            );
            return Ok(CreateOutcome::AlreadyExists {
                existing: Some(existing),
            });
        }

        match self.store.create(from, target_user_id, status).await {
            Ok(request) => {
                tracing::info!(
                    "Connection request {} created: {} -> {} ({})",
                    request.id,
                    request.from_user_id,
                    request.to_user_id,
                    request.status
                );
                Ok(CreateOutcome::Created { request, target })
            }
            // another caller won the race between the lookup and the insert
            Err(ConnectError::DuplicateConnection) => {
                tracing::debug!("Concurrent create for {} and {}", from, target_user_id);
                let existing = self.store.find_existing(from, target_user_id).await?;
                Ok(CreateOutcome::AlreadyExists { existing })
            }
            Err(e) => Err(e),
        }
    }

    pub async fn review_request(
        &self,
        caller: &Identity,
        request_id: &RequestId,
        status: &str,
    ) -> Result<ConnectionRequest> {
        let status = ConnectionStatus::parse_reviewable(status)?;

        let pending = self
            .store
            .find_pending_reviewable(request_id, caller.user_id())
            .await?
            .ok_or_else(|| ConnectError::RequestNotFound {
                request_id: request_id.to_string(),
            })?;

        let updated = self.store.update_status(&pending, status).await?;
        tracing::info!(
            "Connection request {} reviewed by {}: {}",
            updated.id,
            caller.user_id(),
            updated.status
        );
        Ok(updated)
    }

    pub async fn received_requests(&self, caller: &Identity) -> Result<Vec<ReceivedRequest>> {
        let pending = self
            .store
            .list_received(caller.user_id(), ConnectionStatus::Interested)
            .await?;

        let mut received = Vec::with_capacity(pending.len());
        for request in pending {
            match self.directory.find_by_id(&request.from_user_id).await? {
                Some(from_user) => received.push(ReceivedRequest { request, from_user }),
                None => tracing::warn!(
                    "Skipping request {}: sender {} no longer exists",
                    request.id,
                    request.from_user_id
                ),
            }
        }
        Ok(received)
    }

    pub async fn connections(&self, caller: &Identity) -> Result<Vec<User>> {
        let me = caller.user_id();
        let accepted = self.store.list_connections(me).await?;

        let mut users = Vec::with_capacity(accepted.len());
        for request in accepted {
            let other = request.counterpart(me);
            match self.directory.find_by_id(other).await? {
                Some(user) => users.push(user),
                None => tracing::warn!(
                    "Skipping connection {}: user {} no longer exists",
                    request.id,
                    other
                ),
            }
        }
        Ok(users)
    }
}
