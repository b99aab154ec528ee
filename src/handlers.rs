use crate::{
    AppState,
    ai::EmbeddingSource,
    auth::AuthUser,
    cookies,
    error::ApiError,
    models::{
        AdminProfile, ChatRequest, ChatResponse, CreateFileRequest, CreateQaRequest,
        DataResponse, FileDeletedResponse, FileRecord, LoginRequest, NewFileRecord,
        ProfileResponse, QaPair, SuccessResponse, UpdateQaRequest,
    },
    password,
    storage::sanitize_key,
};
use axum::{
    Json,
    extract::{Multipart, Query, State},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

/// Largest document accepted by the upload relay: 10 MiB.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// MIME types the AI service can embed: PDF, DOC, DOCX, TXT and MD.
pub const ALLOWED_UPLOAD_TYPES: [&str; 5] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
    "text/markdown",
];

const CHAT_FALLBACK_REPLY: &str = "I'm sorry, I couldn't generate a response.";

/// IdQuery
///
/// `?id=` parameter of the DELETE endpoints.
#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IdQuery {
    pub id: Option<String>,
}

fn parse_id(raw: Option<&str>, missing: &'static str) -> Result<Uuid, ApiError> {
    let raw = raw
        .filter(|id| !id.is_empty())
        .ok_or(ApiError::BadRequest(missing))?;
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest("Invalid ID"))
}

// --- Session ---

/// login
///
/// [Public Route] Verifies `{email, password}` against the stored Argon2 hash
/// and, on success, issues a 24h token inside the `awaken-tk` cookie.
/// Unknown email and wrong password produce the same 401.
#[utoipa::path(
    post,
    path = "/api/admin/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in, session cookie set", body = SuccessResponse),
        (status = 400, description = "Missing email or password"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<SuccessResponse>), ApiError> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest("Email and password are required"));
    }

    let admin = state
        .repo
        .find_admin_by_email(&payload.email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    let valid = password::verify_password(&payload.password, &admin.password_hash)
        .unwrap_or_else(|e| {
            tracing::error!(admin_id = %admin.id, error = %e, "stored password hash unreadable");
            false
        });
    if !valid {
        return Err(ApiError::InvalidCredentials);
    }

    let token = state.tokens.issue(&admin.id.to_string())?;
    tracing::info!(admin_id = %admin.id, "admin signed in");

    let jar = cookies::attach(jar, token, state.config.secure_cookies());
    Ok((jar, Json(SuccessResponse::new("Login successful"))))
}

/// logout
///
/// [Public Route] Clears the session cookie. Always succeeds, whether or not
/// a session existed. Tokens already issued stay valid until they expire.
#[utoipa::path(
    post,
    path = "/api/admin/logout",
    responses((status = 200, description = "Cookie cleared", body = SuccessResponse))
)]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<SuccessResponse>) {
    let jar = cookies::clear(jar, state.config.secure_cookies());
    (jar, Json(SuccessResponse::new("Logged out successfully")))
}

/// get_profile
///
/// [Authenticated Route] The signed-in admin's account, without the hash.
#[utoipa::path(
    get,
    path = "/api/admin/profile",
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_profile(
    AuthUser { id }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let admin_id = Uuid::parse_str(&id).map_err(|_| ApiError::NotFound("User not found"))?;
    let admin = state
        .repo
        .get_admin(admin_id)
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;

    Ok(Json(ProfileResponse {
        success: true,
        user: AdminProfile {
            id: admin.id,
            email: admin.email,
            name: admin.name,
        },
    }))
}

// --- Q&A Training Pairs ---

/// list_qa
///
/// [Authenticated Route] The caller's Q&A pairs, newest first.
#[utoipa::path(
    get,
    path = "/api/admin/qa",
    responses((status = 200, description = "Q&A pairs", body = DataResponse<Vec<QaPair>>))
)]
pub async fn list_qa(
    AuthUser { id }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<DataResponse<Vec<QaPair>>>, ApiError> {
    let pairs = state.repo.list_qa(&id).await?;
    Ok(Json(DataResponse::new(pairs)))
}

/// create_qa
///
/// [Authenticated Route] Registers the pair with the AI service first; the
/// local record is only written once the AI service accepted it.
#[utoipa::path(
    post,
    path = "/api/admin/qa",
    request_body = CreateQaRequest,
    responses(
        (status = 200, description = "Created", body = DataResponse<QaPair>),
        (status = 400, description = "Question and answer are required"),
        (status = 500, description = "AI service rejected the pair")
    )
)]
pub async fn create_qa(
    AuthUser { id }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateQaRequest>,
) -> Result<Json<DataResponse<QaPair>>, ApiError> {
    if payload.question.is_empty() || payload.answer.is_empty() {
        return Err(ApiError::BadRequest("Question and answer are required"));
    }

    state
        .ai
        .create_questions(&id, &payload.question, &payload.answer)
        .await
        .map_err(|e| ApiError::upstream("Failed to save to AI server", e))?;

    let pair = state
        .repo
        .create_qa(&id, &payload.question, &payload.answer)
        .await?;
    Ok(Json(DataResponse::new(pair)))
}

/// update_qa
///
/// [Authenticated Route] Owner-Only. Replaces the answer. The stored question is what the
/// AI service uses to find its copy of the pair.
#[utoipa::path(
    put,
    path = "/api/admin/qa",
    request_body = UpdateQaRequest,
    responses(
        (status = 200, description = "Updated", body = SuccessResponse),
        (status = 400, description = "ID and answer are required"),
        (status = 404, description = "Q&A not found")
    )
)]
pub async fn update_qa(
    AuthUser { id }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<UpdateQaRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    if payload.answer.is_empty() {
        return Err(ApiError::BadRequest("ID and answer are required"));
    }
    let qa_id = parse_id(Some(payload.id.as_str()), "ID and answer are required")?;

    let existing = state
        .repo
        .get_owned_qa(qa_id, &id)
        .await?
        .ok_or(ApiError::NotFound("Q&A not found"))?;

    state
        .ai
        .update_answer(&id, &existing.question, &payload.answer)
        .await
        .map_err(|e| ApiError::upstream("Failed to update in AI server", e))?;

    if !state
        .repo
        .update_qa_answer(qa_id, &id, &payload.answer)
        .await?
    {
        return Err(ApiError::NotFound("Q&A not found"));
    }
    Ok(Json(SuccessResponse::new("Q&A updated successfully")))
}

/// delete_qa
///
/// [Authenticated Route] Owner-Only. Removes the pair from the AI service,
/// then locally. Another agent's pair is reported as not found.
#[utoipa::path(
    delete,
    path = "/api/admin/qa",
    params(IdQuery),
    responses(
        (status = 200, description = "Deleted", body = SuccessResponse),
        (status = 404, description = "Q&A not found")
    )
)]
pub async fn delete_qa(
    AuthUser { id }: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let qa_id = parse_id(query.id.as_deref(), "ID is required")?;

    let existing = state
        .repo
        .get_owned_qa(qa_id, &id)
        .await?
        .ok_or(ApiError::NotFound("Q&A not found"))?;

    state
        .ai
        .delete_question(&id, &existing.question)
        .await
        .map_err(|e| ApiError::upstream("Failed to delete from AI server", e))?;

    if !state.repo.delete_qa(qa_id, &id).await? {
        return Err(ApiError::NotFound("Q&A not found"));
    }
    Ok(Json(SuccessResponse::new("Q&A deleted successfully")))
}

// --- File Metadata ---

/// list_files
///
/// [Authenticated Route] Every file record, newest first.
#[utoipa::path(
    get,
    path = "/api/admin/files",
    responses((status = 200, description = "Files", body = DataResponse<Vec<FileRecord>>))
)]
pub async fn list_files(
    _user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<DataResponse<Vec<FileRecord>>>, ApiError> {
    let files = state.repo.list_files().await?;
    Ok(Json(DataResponse::new(files)))
}

/// create_file
///
/// [Authenticated Route] Registers a document that was stored elsewhere.
#[utoipa::path(
    post,
    path = "/api/admin/files",
    request_body = CreateFileRequest,
    responses(
        (status = 200, description = "Saved", body = DataResponse<FileRecord>),
        (status = 400, description = "File name and URL are required")
    )
)]
pub async fn create_file(
    _user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateFileRequest>,
) -> Result<Json<DataResponse<FileRecord>>, ApiError> {
    if payload.file_name.is_empty() || payload.file_url.is_empty() {
        return Err(ApiError::BadRequest("File name and URL are required"));
    }

    let record = state
        .repo
        .create_file(NewFileRecord {
            file_name: payload.file_name,
            file_url: payload.file_url,
            file_path: None,
            file_size: payload.file_size.unwrap_or(0),
            file_type: payload.file_type.unwrap_or_else(|| "unknown".to_string()),
            uploaded_by: None,
        })
        .await?;
    Ok(Json(DataResponse::new(record)))
}

/// delete_file
///
/// [Authenticated Route] Deletes only the metadata record and hands back its
/// URL; the stored object is left for the caller to remove.
#[utoipa::path(
    delete,
    path = "/api/admin/files",
    params(IdQuery),
    responses(
        (status = 200, description = "Deleted", body = FileDeletedResponse),
        (status = 404, description = "File not found")
    )
)]
pub async fn delete_file(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Json<FileDeletedResponse>, ApiError> {
    let file_id = parse_id(query.id.as_deref(), "ID is required")?;

    let file = state
        .repo
        .get_file(file_id)
        .await?
        .ok_or(ApiError::NotFound("File not found"))?;

    state.repo.delete_file(file_id).await?;
    Ok(Json(FileDeletedResponse {
        success: true,
        message: "File deleted successfully".to_string(),
        file_url: file.file_url,
    }))
}

// --- Upload Relay ---

struct UploadedFile {
    name: String,
    content_type: String,
    bytes: Vec<u8>,
}

async fn read_file_field(multipart: &mut Multipart) -> Result<Option<UploadedFile>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("Malformed multipart body"))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|_| ApiError::BadRequest("File size too large. Maximum size is 10MB."))?;
        return Ok(Some(UploadedFile {
            name,
            content_type,
            bytes: bytes.to_vec(),
        }));
    }
    Ok(None)
}

/// upload_file
///
/// [Authenticated Route] Relays a document to object storage, records it,
/// then asks the AI service to embed it. An embedding failure is logged but
/// does not fail the upload.
#[utoipa::path(
    post,
    path = "/api/admin/upload",
    request_body(content = String, content_type = "multipart/form-data", description = "Multipart field `file`"),
    responses(
        (status = 200, description = "Uploaded", body = DataResponse<FileRecord>),
        (status = 400, description = "Missing file, disallowed type or too large")
    )
)]
pub async fn upload_file(
    AuthUser { id }: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<DataResponse<FileRecord>>, ApiError> {
    let file = read_file_field(&mut multipart)
        .await?
        .ok_or(ApiError::BadRequest("No file provided"))?;

    if !ALLOWED_UPLOAD_TYPES.contains(&file.content_type.as_str()) {
        return Err(ApiError::BadRequest(
            "File type not allowed. Only PDF, DOC, DOCX, TXT, and MD files are supported.",
        ));
    }
    if file.bytes.len() > MAX_UPLOAD_BYTES {
        return Err(ApiError::BadRequest(
            "File size too large. Maximum size is 10MB.",
        ));
    }

    let file_path = format!(
        "uploads/{}_{}",
        Utc::now().timestamp_millis(),
        sanitize_key(&file.name).replace('/', "_")
    );
    let file_size = file.bytes.len() as i64;

    tracing::info!(admin_id = %id, %file_path, file_size, "uploading document");
    let file_url = state
        .storage
        .upload_object(&file_path, file.bytes, &file.content_type)
        .await?;

    let record = state
        .repo
        .create_file(NewFileRecord {
            file_name: file.name,
            file_url,
            file_path: Some(file_path),
            file_size,
            file_type: file.content_type,
            uploaded_by: Some(id.clone()),
        })
        .await?;

    let sources = vec![EmbeddingSource {
        file_name: record.file_name.clone(),
        download_url: record.file_url.clone(),
    }];
    if let Err(e) = state.ai.create_embeddings(&id, sources).await {
        tracing::warn!(file_id = %record.id, error = %e, "embedding request failed");
    }

    Ok(Json(DataResponse::new(record)))
}

/// delete_upload
///
/// [Authenticated Route] Owner-Only. Removes the stored object, the record,
/// and the document's embeddings. Only a missing record fails the request;
/// storage and AI cleanup failures are logged.
#[utoipa::path(
    delete,
    path = "/api/admin/upload",
    params(IdQuery),
    responses(
        (status = 200, description = "Deleted", body = SuccessResponse),
        (status = 404, description = "File not found or not yours")
    )
)]
pub async fn delete_upload(
    AuthUser { id }: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let file_id = parse_id(query.id.as_deref(), "File ID is required")?;

    let file = state
        .repo
        .get_owned_file(file_id, &id)
        .await?
        .ok_or(ApiError::NotFound("File not found"))?;

    // Records created before object keys were stored follow the upload naming scheme.
    let file_path = file.file_path.clone().unwrap_or_else(|| {
        format!(
            "uploads/{}_{}",
            file.uploaded_at.timestamp_millis(),
            file.file_name
        )
    });

    match state.storage.delete_object(&file_path).await {
        Ok(true) => tracing::info!(%file_path, "stored object deleted"),
        Ok(false) => tracing::warn!(%file_path, "stored object already missing"),
        Err(e) => tracing::error!(%file_path, error = %e, "stored object deletion failed"),
    }

    if !state.repo.delete_owned_file(file_id, &id).await? {
        return Err(ApiError::NotFound("File not found in database"));
    }

    if let Err(e) = state.ai.delete_document(&id, &file.file_name).await {
        tracing::warn!(%file_id, error = %e, "embedding deletion failed");
    }

    Ok(Json(SuccessResponse::new(
        "File deleted successfully from storage, database, and embeddings",
    )))
}

// --- Chat ---

/// chat
///
/// [Authenticated Route] Forwards one chat turn, with the completed
/// exchanges so far, to the AI service under the `admin_<id>` agent.
#[utoipa::path(
    post,
    path = "/api/admin/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Reply", body = ChatResponse),
        (status = 400, description = "Message is required")
    )
)]
pub async fn chat(
    AuthUser { id }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if payload.message.trim().is_empty() {
        return Err(ApiError::BadRequest("Message is required"));
    }

    // Forwarded exactly as typed; only blank input is refused.
    let agent_id = format!("admin_{}", id);
    let reply = state
        .ai
        .chat(&agent_id, &payload.message, &payload.conversation_history)
        .await
        .map_err(|e| ApiError::upstream("Failed to reach AI server", e))?;

    Ok(Json(ChatResponse {
        success: true,
        response: reply.unwrap_or_else(|| CHAT_FALLBACK_REPLY.to_string()),
    }))
}
