//! Ping handler for health checks

use anyhow::Result;
use async_nats::{Client, Subscriber};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use uuid::Uuid;

use super::publish_json;
use crate::types::{ErrorResponse, Request, SuccessResponse};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PingPayload {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PongResponse {
    pub service: String,
    pub version: String,
    pub message: String,
    pub timestamp: String,
}

fn pong(payload: PingPayload) -> PongResponse {
    PongResponse {
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        message: payload
            .message
            .map(|m| format!("Pong: {}", m))
            .unwrap_or_else(|| "Pong".to_string()),
        timestamp: chrono::Utc::now().to_rfc3339(),
    }
}

/// Handle hos.ping messages
pub async fn handle_ping(client: Client, mut subscriber: Subscriber) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received ping message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                error!("Ping message without reply subject");
                continue;
            }
        };

        let request: Request<PingPayload> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse ping request: {}", e);
                let error = ErrorResponse::new(
                    Uuid::nil(),
                    "INVALID_REQUEST",
                    format!("Failed to parse request: {}", e),
                );
                publish_json(&client, reply, &error).await?;
                continue;
            }
        };

        let response = SuccessResponse::new(request.id, pong(request.payload));
        publish_json(&client, reply, &response).await?;

        debug!("Sent pong response");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pong_echoes_message() {
        let response = pong(PingPayload { message: Some("hello".to_string()) });
        assert_eq!(response.message, "Pong: hello");
        assert_eq!(response.service, "hos-planner");
    }

    #[test]
    fn test_pong_without_message() {
        assert_eq!(pong(PingPayload::default()).message, "Pong");
    }

    #[test]
    fn test_ping_request_parses_without_message() {
        let json = r#"{
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "timestamp": "2025-11-17T06:30:00Z",
            "payload": {}
        }"#;
        let request: Request<PingPayload> = serde_json::from_str(json).unwrap();
        assert!(request.payload.message.is_none());
    }
}
