use crate::core::workflow::ConnectionWorkflow;
use crate::domain::model::{
    ConnectionRequest, CreateOutcome, Identity, ReceivedRequest, RequestId, User, UserId,
};
use crate::domain::ports::AuthGate;
use crate::utils::error::ConnectError;
use axum::{
    extract::{FromRequestParts, Path, State},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub workflow: ConnectionWorkflow,
    pub auth: Arc<dyn AuthGate>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse<T: Serialize> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl MessageResponse<()> {
    fn text(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }
}

impl<T: Serialize> MessageResponse<T> {
    fn with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
        }
    }
}

impl IntoResponse for ConnectError {
    fn into_response(self) -> Response {
        let status = match &self {
            ConnectError::InvalidStatus { .. } | ConnectError::SelfConnection => {
                StatusCode::BAD_REQUEST
            }
            ConnectError::ValidationError { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ConnectError::UserNotFound { .. } | ConnectError::RequestNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            ConnectError::DuplicateConnection => StatusCode::CONFLICT,
            ConnectError::Unauthorized => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {} (Category: {:?})", self, self.category());
        }

        let body = json!({
            "message": self.user_friendly_message(),
            "code": self.code(),
        });
        (status, Json(body)).into_response()
    }
}

/// Extracts the credential from an `Authorization` value; the scheme is case-insensitive.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim_start().split_once(char::is_whitespace)?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// The authenticated caller of a request, resolved by the configured [`AuthGate`].
pub struct Caller(pub Identity);

impl FromRequestParts<AppState> for Caller {
    type Rejection = ConnectError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or(ConnectError::Unauthorized)?;

        let identity = state.auth.authenticate(token).await?;
        Ok(Caller(identity))
    }
}

async fn send_request(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path((status, user_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse<()>>, ConnectError> {
    let outcome = state
        .workflow
        .create_request(&caller, &UserId::new(user_id), &status)
        .await?;

    if let CreateOutcome::AlreadyExists { .. } = &outcome {
        tracing::debug!("Create request from {} short-circuited", caller.user_id());
    }
    Ok(Json(MessageResponse::text(outcome.message())))
}

async fn review_request(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path((status, request_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse<ConnectionRequest>>, ConnectError> {
    let updated = state
        .workflow
        .review_request(&caller, &RequestId::new(request_id), &status)
        .await?;

    let message = format!("connection {}", updated.status);
    Ok(Json(MessageResponse::with_data(message, updated)))
}

async fn received_requests(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> Result<Json<MessageResponse<Vec<ReceivedRequest>>>, ConnectError> {
    let received = state.workflow.received_requests(&caller).await?;
    let message = format!("{} pending connection requests", received.len());
    Ok(Json(MessageResponse::with_data(message, received)))
}

async fn connections(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> Result<Json<MessageResponse<Vec<User>>>, ConnectError> {
    let users = state.workflow.connections(&caller).await?;
    let message = format!("{} connections", users.len());
    Ok(Json(MessageResponse::with_data(message, users)))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/connection/{status}/{user_id}", post(send_request))
        .route("/connection/review/{status}/{request_id}", post(review_request))
        .route("/user/requests/received", get(received_requests))
        .route("/user/connections", get(connections))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_error_status_codes() {
        let cases = [
            (
                ConnectError::invalid_status("x", &["accepted"]),
                StatusCode::BAD_REQUEST,
            ),
            (
                ConnectError::UserNotFound {
                    user_id: "u".to_string(),
                },
                StatusCode::NOT_FOUND,
            ),
            (ConnectError::Unauthorized, StatusCode::UNAUTHORIZED),
            (
                ConnectError::StorageError {
                    message: "down".to_string(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[tokio::test]
    async fn test_error_body_carries_message_and_code() {
        let response = ConnectError::RequestNotFound {
            request_id: "r1".to_string(),
        }
        .into_response();

        let body = body_json(response).await;
        assert_eq!(body["code"], "request_not_found");
        assert_eq!(body["message"], "connection request not found: r1");
    }

    #[test]
    fn test_bearer_scheme_is_case_insensitive() {
        assert_eq!(bearer_token("Bearer alice-token"), Some("alice-token"));
        assert_eq!(bearer_token("bearer alice-token"), Some("alice-token"));
        assert_eq!(bearer_token("BEARER  alice-token "), Some("alice-token"));
        assert_eq!(bearer_token("Basic YWxpY2U6cHc="), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("alice-token"), None);
    }
}
