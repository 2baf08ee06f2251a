use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Only the two conversational roles are accepted from clients; the system
/// turn is always the server's own persona.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatReportRequest {
    pub messages: Vec<ChatTurn>,
}
