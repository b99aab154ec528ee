#![allow(dead_code)]

use async_trait::async_trait;
use awaken_console::{
    AppConfig, AppState, MockAiService, MockStorageService,
    ai::AiState,
    models::{Admin, FileRecord, NewAdmin, NewFileRecord, QaPair},
    password,
    repository::{Repository, RepositoryState},
    storage::StorageState,
    token::TokenCodec,
};
use chrono::{Duration, Utc};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const ADMIN_EMAIL: &str = "admin@awaken.com";
pub const ADMIN_PASSWORD: &str = "admin123";

// --- In-Memory Repository ---

#[derive(Default)]
pub struct InMemoryRepo {
    pub admins: Mutex<Vec<Admin>>,
    pub qa: Mutex<Vec<QaPair>>,
    pub files: Mutex<Vec<FileRecord>>,
}

impl InMemoryRepo {
    /// Inserts an admin with an Argon2 hash of `password` and returns it.
    pub fn with_admin(&self, email: &str, password: &str) -> Admin {
        let admin = Admin {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password::hash_password(password).unwrap(),
            name: "Admin".to_string(),
            created_at: Utc::now(),
        };
        self.admins.lock().unwrap().push(admin.clone());
        admin
    }

    pub fn insert_file(&self, file: FileRecord) {
        self.files.lock().unwrap().push(file);
    }
}

#[async_trait]
impl Repository for InMemoryRepo {
    async fn find_admin_by_email(&self, email: &str) -> Result<Option<Admin>, sqlx::Error> {
        let admins = self.admins.lock().unwrap();
        Ok(admins.iter().find(|a| a.email == email).cloned())
    }

    async fn get_admin(&self, id: Uuid) -> Result<Option<Admin>, sqlx::Error> {
        let admins = self.admins.lock().unwrap();
        Ok(admins.iter().find(|a| a.id == id).cloned())
    }

    async fn count_admins(&self) -> Result<i64, sqlx::Error> {
        Ok(self.admins.lock().unwrap().len() as i64)
    }

    async fn create_admin(&self, admin: NewAdmin) -> Result<Admin, sqlx::Error> {
        let admin = Admin {
            id: Uuid::new_v4(),
            email: admin.email,
            password_hash: admin.password_hash,
            name: admin.name,
            created_at: Utc::now(),
        };
        self.admins.lock().unwrap().push(admin.clone());
        Ok(admin)
    }

    async fn list_qa(&self, agent_id: &str) -> Result<Vec<QaPair>, sqlx::Error> {
        let qa = self.qa.lock().unwrap();
        let mut pairs: Vec<QaPair> = qa.iter().filter(|q| q.agent_id == agent_id).cloned().collect();
        pairs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(pairs)
    }

    async fn get_owned_qa(
        &self,
        id: Uuid,
        agent_id: &str,
    ) -> Result<Option<QaPair>, sqlx::Error> {
        let qa = self.qa.lock().unwrap();
        Ok(qa
            .iter()
            .find(|q| q.id == id && q.agent_id == agent_id)
            .cloned())
    }

    async fn create_qa(
        &self,
        agent_id: &str,
        question: &str,
        answer: &str,
    ) -> Result<QaPair, sqlx::Error> {
        let mut qa = self.qa.lock().unwrap();
        // Strictly increasing timestamps keep "newest first" deterministic.
        let created_at = Utc::now() + Duration::milliseconds(qa.len() as i64);
        let pair = QaPair {
            id: Uuid::new_v4(),
            question: question.to_string(),
            answer: answer.to_string(),
            agent_id: agent_id.to_string(),
            created_at,
            updated_at: created_at,
        };
        qa.push(pair.clone());
        Ok(pair)
    }

    async fn update_qa_answer(
        &self,
        id: Uuid,
        agent_id: &str,
        answer: &str,
    ) -> Result<bool, sqlx::Error> {
        let mut qa = self.qa.lock().unwrap();
        match qa.iter_mut().find(|q| q.id == id && q.agent_id == agent_id) {
            Some(pair) => {
                pair.answer = answer.to_string();
                pair.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_qa(&self, id: Uuid, agent_id: &str) -> Result<bool, sqlx::Error> {
        let mut qa = self.qa.lock().unwrap();
        let before = qa.len();
        qa.retain(|q| !(q.id == id && q.agent_id == agent_id));
        Ok(qa.len() < before)
    }

    async fn list_files(&self) -> Result<Vec<FileRecord>, sqlx::Error> {
        let mut files = self.files.lock().unwrap().clone();
        files.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(files)
    }

    async fn create_file(&self, file: NewFileRecord) -> Result<FileRecord, sqlx::Error> {
        let mut files = self.files.lock().unwrap();
        let record = FileRecord {
            id: Uuid::new_v4(),
            file_name: file.file_name,
            file_url: file.file_url,
            file_path: file.file_path,
            file_size: file.file_size,
            file_type: file.file_type,
            uploaded_by: file.uploaded_by,
            uploaded_at: Utc::now() + Duration::milliseconds(files.len() as i64),
        };
        files.push(record.clone());
        Ok(record)
    }

    async fn get_file(&self, id: Uuid) -> Result<Option<FileRecord>, sqlx::Error> {
        let files = self.files.lock().unwrap();
        Ok(files.iter().find(|f| f.id == id).cloned())
    }

    async fn get_owned_file(
        &self,
        id: Uuid,
        owner: &str,
    ) -> Result<Option<FileRecord>, sqlx::Error> {
        let files = self.files.lock().unwrap();
        Ok(files
            .iter()
            .find(|f| f.id == id && f.uploaded_by.as_deref() == Some(owner))
            .cloned())
    }

    async fn delete_file(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut files = self.files.lock().unwrap();
        let before = files.len();
        files.retain(|f| f.id != id);
        Ok(files.len() < before)
    }

    async fn delete_owned_file(&self, id: Uuid, owner: &str) -> Result<bool, sqlx::Error> {
        let mut files = self.files.lock().unwrap();
        let before = files.len();
        files.retain(|f| !(f.id == id && f.uploaded_by.as_deref() == Some(owner)));
        Ok(files.len() < before)
    }
}

// --- State Scaffolding ---

pub struct TestContext {
    pub state: AppState,
    pub repo: Arc<InMemoryRepo>,
    pub storage: MockStorageService,
    pub ai: MockAiService,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_services(MockStorageService::new(), MockAiService::new())
    }

    pub fn with_services(storage: MockStorageService, ai: MockAiService) -> Self {
        Self::with_config(storage, ai, AppConfig::default())
    }

    pub fn with_config(storage: MockStorageService, ai: MockAiService, config: AppConfig) -> Self {
        let repo = Arc::new(InMemoryRepo::default());
        let tokens = Arc::new(TokenCodec::new(&config.jwt_secret).unwrap());
        let state = AppState {
            repo: repo.clone() as RepositoryState,
            storage: Arc::new(storage.clone()) as StorageState,
            ai: Arc::new(ai.clone()) as AiState,
            tokens,
            config,
        };
        Self {
            state,
            repo,
            storage,
            ai,
        }
    }

    pub fn token_for(&self, subject: &str) -> String {
        self.state.tokens.issue(subject).unwrap()
    }

    /// `Cookie` header value carrying a fresh session for `subject`.
    pub fn session_cookie(&self, subject: &str) -> String {
        format!("awaken-tk={}", self.token_for(subject))
    }
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
