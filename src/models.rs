use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Stored Records ---

/// Admin
///
/// An administrator account from the `admins` table. The password hash never
/// leaves the server: it is skipped on serialization.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Admin {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an admin account (startup bootstrap).
#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub email: String,
    pub password_hash: String,
    pub name: String,
}

/// QaPair
///
/// A question/answer training pair owned by one agent (the admin's subject id).
/// Serialized with the console's `_id` / camelCase field names.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, PartialEq)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct QaPair {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub question: String,
    pub answer: String,
    pub agent_id: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// FileRecord
///
/// Metadata for a knowledge-base document. `file_path` is the object key in
/// storage; records registered through `POST /api/admin/files` have none.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, PartialEq)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub file_name: String,
    pub file_url: String,
    pub file_path: Option<String>,
    pub file_size: i64,
    pub file_type: String,
    pub uploaded_by: Option<String>,
    #[ts(type = "string")]
    pub uploaded_at: DateTime<Utc>,
}

/// Input for inserting a file record.
#[derive(Debug, Clone, Default)]
pub struct NewFileRecord {
    pub file_name: String,
    pub file_url: String,
    pub file_path: Option<String>,
    pub file_size: i64,
    pub file_type: String,
    pub uploaded_by: Option<String>,
}

// --- Request Payloads ---

/// LoginRequest
///
/// Body of `POST /api/admin/login`. Missing fields deserialize as empty and
/// are rejected with 400 by the handler.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    #[serde(default)]
    #[schema(example = "admin@awaken.com")]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateQaRequest {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

/// UpdateQaRequest
///
/// Only the answer is editable; the question is the AI service's lookup key.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateQaRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CreateFileRequest {
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub file_url: String,
    pub file_size: Option<i64>,
    pub file_type: Option<String>,
}

/// One completed exchange of a chat conversation.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct ChatTurn {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub conversation_history: Vec<ChatTurn>,
}

// --- Response Payloads ---

/// Plain acknowledgement: `{"success": true, "message": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

impl SuccessResponse {
    pub fn new(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
        }
    }
}

/// `{"success": true, "data": ...}` envelope used by list/create endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Public part of an admin account.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct AdminProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ProfileResponse {
    pub success: bool,
    pub user: AdminProfile,
}

/// Returned after deleting a metadata record so the caller can clean up the
/// stored object itself.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct FileDeletedResponse {
    pub success: bool,
    pub message: String,
    pub file_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ChatResponse {
    pub success: bool,
    pub response: String,
}
