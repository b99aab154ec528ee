//! Client for the external AI service.
//!
//! Embedding creation, Q&A indexing and chat completion all live in a
//! separate service reached over plain JSON-over-HTTP `POST` calls. The
//! console only forwards requests and never interprets the results beyond
//! the chat reply text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::models::ChatTurn;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("AI service unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("AI service returned status {0}")]
    Status(u16),
    #[error("simulated AI service failure")]
    Simulated,
}

/// A document the AI service should fetch and embed.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmbeddingSource {
    #[serde(rename = "fileName")]
    pub file_name: String,
    #[serde(rename = "downloadURL")]
    pub download_url: String,
}

#[derive(Debug, Deserialize, Default)]
struct ChatReply {
    response: Option<String>,
}

/// AiService
///
/// One method per endpoint of the AI service. `agent_id` scopes the
/// knowledge base; it is the admin's subject id.
#[async_trait]
pub trait AiService: Send + Sync {
    async fn create_embeddings(
        &self,
        agent_id: &str,
        files: Vec<EmbeddingSource>,
    ) -> Result<(), AiError>;
    async fn delete_document(&self, agent_id: &str, file_name: &str) -> Result<(), AiError>;
    async fn create_questions(
        &self,
        agent_id: &str,
        question: &str,
        answer: &str,
    ) -> Result<(), AiError>;
    async fn update_answer(
        &self,
        agent_id: &str,
        question: &str,
        answer: &str,
    ) -> Result<(), AiError>;
    async fn delete_question(&self, agent_id: &str, question: &str) -> Result<(), AiError>;
    /// Returns the reply text, or `None` when the service answered without one.
    async fn chat(
        &self,
        agent_id: &str,
        message: &str,
        history: &[ChatTurn],
    ) -> Result<Option<String>, AiError>;
}

pub type AiState = Arc<dyn AiService>;

/// HttpAiClient
///
/// `AiService` over `reqwest`. One pooled client for the whole process.
#[derive(Clone)]
pub struct HttpAiClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post(&self, endpoint: &str, body: Value) -> Result<reqwest::Response, AiError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, endpoint))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AiError::Status(response.status().as_u16()));
        }
        Ok(response)
    }
}

#[async_trait]
impl AiService for HttpAiClient {
    async fn create_embeddings(
        &self,
        agent_id: &str,
        files: Vec<EmbeddingSource>,
    ) -> Result<(), AiError> {
        self.post(
            "/create_embeddings",
            json!({ "agent_id": agent_id, "files": files }),
        )
        .await?;
        Ok(())
    }

    async fn delete_document(&self, agent_id: &str, file_name: &str) -> Result<(), AiError> {
        self.post(
            "/delete_single_document",
            json!({ "filename": file_name, "agent_id": agent_id }),
        )
        .await?;
        Ok(())
    }

    async fn create_questions(
        &self,
        agent_id: &str,
        question: &str,
        answer: &str,
    ) -> Result<(), AiError> {
        self.post(
            "/create_questions",
            json!({
                "agent_id": agent_id,
                "user_data": [{ "question": question, "answer": answer }],
            }),
        )
        .await?;
        Ok(())
    }

    async fn update_answer(
        &self,
        agent_id: &str,
        question: &str,
        answer: &str,
    ) -> Result<(), AiError> {
        self.post(
            "/update_single_answer",
            json!({ "agent_id": agent_id, "question": question, "updated_ans": answer }),
        )
        .await?;
        Ok(())
    }

    async fn delete_question(&self, agent_id: &str, question: &str) -> Result<(), AiError> {
        self.post(
            "/delete_single_question",
            json!({ "agent_id": agent_id, "question": question }),
        )
        .await?;
        Ok(())
    }

    async fn chat(
        &self,
        agent_id: &str,
        message: &str,
        history: &[ChatTurn],
    ) -> Result<Option<String>, AiError> {
        let response = self
            .post(
                "/chat",
                json!({
                    "message": message,
                    "conversation_history": history,
                    "agent_id": agent_id,
                }),
            )
            .await?;
        let reply = response.json::<ChatReply>().await.unwrap_or_default();
        Ok(reply.response.filter(|text| !text.is_empty()))
    }
}

/// One recorded call to `MockAiService`: endpoint name plus its payload.
#[derive(Debug, Clone, PartialEq)]
pub struct AiCall {
    pub endpoint: &'static str,
    pub payload: Value,
}

/// MockAiService
///
/// Records every call so tests can assert on what would have been sent.
/// With `should_fail` set, every call fails and nothing is recorded.
#[derive(Clone, Default)]
pub struct MockAiService {
    pub should_fail: bool,
    pub chat_reply: Option<String>,
    calls: Arc<Mutex<Vec<AiCall>>>,
}

impl MockAiService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    pub fn with_chat_reply(reply: &str) -> Self {
        Self {
            chat_reply: Some(reply.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<AiCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    fn record(&self, endpoint: &'static str, payload: Value) -> Result<(), AiError> {
        if self.should_fail {
            return Err(AiError::Simulated);
        }
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(AiCall { endpoint, payload });
        }
        Ok(())
    }
}

#[async_trait]
impl AiService for MockAiService {
    async fn create_embeddings(
        &self,
        agent_id: &str,
        files: Vec<EmbeddingSource>,
    ) -> Result<(), AiError> {
        self.record(
            "create_embeddings",
            json!({ "agent_id": agent_id, "files": files }),
        )
    }

    async fn delete_document(&self, agent_id: &str, file_name: &str) -> Result<(), AiError> {
        self.record(
            "delete_single_document",
            json!({ "filename": file_name, "agent_id": agent_id }),
        )
    }

    async fn create_questions(
        &self,
        agent_id: &str,
        question: &str,
        answer: &str,
    ) -> Result<(), AiError> {
        self.record(
            "create_questions",
            json!({
                "agent_id": agent_id,
                "user_data": [{ "question": question, "answer": answer }],
            }),
        )
    }

    async fn update_answer(
        &self,
        agent_id: &str,
        question: &str,
        answer: &str,
    ) -> Result<(), AiError> {
        self.record(
            "update_single_answer",
            json!({ "agent_id": agent_id, "question": question, "updated_ans": answer }),
        )
    }

    async fn delete_question(&self, agent_id: &str, question: &str) -> Result<(), AiError> {
        self.record(
            "delete_single_question",
            json!({ "agent_id": agent_id, "question": question }),
        )
    }

    async fn chat(
        &self,
        agent_id: &str,
        message: &str,
        history: &[ChatTurn],
    ) -> Result<Option<String>, AiError> {
        self.record(
            "chat",
            json!({
                "message": message,
                "conversation_history": history,
                "agent_id": agent_id,
            }),
        )?;
        Ok(self.chat_reply.clone())
    }
}
