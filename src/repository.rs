use crate::models::{Admin, FileRecord, NewAdmin, NewFileRecord, QaPair};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// Abstract contract for all persistence the console needs: admin accounts,
/// Q&A pairs and file metadata. Handlers only see this trait, which lets the
/// integration tests swap in an in-memory implementation.
///
/// **Send + Sync + async_trait** make `Arc<dyn Repository>` shareable across
/// Axum's task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Admin Accounts ---
    async fn find_admin_by_email(&self, email: &str) -> Result<Option<Admin>, sqlx::Error>;
    async fn get_admin(&self, id: Uuid) -> Result<Option<Admin>, sqlx::Error>;
    async fn count_admins(&self) -> Result<i64, sqlx::Error>;
    async fn create_admin(&self, admin: NewAdmin) -> Result<Admin, sqlx::Error>;

    // --- Q&A Pairs ---
    // Newest first, scoped to one agent.
    async fn list_qa(&self, agent_id: &str) -> Result<Vec<QaPair>, sqlx::Error>;
    /// Owner-Only lookup: matches only pairs belonging to `agent_id`.
    async fn get_owned_qa(&self, id: Uuid, agent_id: &str)
    -> Result<Option<QaPair>, sqlx::Error>;
    async fn create_qa(
        &self,
        agent_id: &str,
        question: &str,
        answer: &str,
    ) -> Result<QaPair, sqlx::Error>;
    // Both scoped to `agent_id`; false when no row matched.
    async fn update_qa_answer(
        &self,
        id: Uuid,
        agent_id: &str,
        answer: &str,
    ) -> Result<bool, sqlx::Error>;
    async fn delete_qa(&self, id: Uuid, agent_id: &str) -> Result<bool, sqlx::Error>;

    // --- File Metadata ---
    async fn list_files(&self) -> Result<Vec<FileRecord>, sqlx::Error>;
    async fn create_file(&self, file: NewFileRecord) -> Result<FileRecord, sqlx::Error>;
    async fn get_file(&self, id: Uuid) -> Result<Option<FileRecord>, sqlx::Error>;
    /// Owner-Only lookup: matches only records uploaded by `owner`.
    async fn get_owned_file(&self, id: Uuid, owner: &str)
    -> Result<Option<FileRecord>, sqlx::Error>;
    async fn delete_file(&self, id: Uuid) -> Result<bool, sqlx::Error>;
    async fn delete_owned_file(&self, id: Uuid, owner: &str) -> Result<bool, sqlx::Error>;
}

/// RepositoryState
///
/// The concrete type used to share persistence access across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// `Repository` backed by PostgreSQL. The schema lives in `migrations/`.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const ADMIN_COLUMNS: &str = "id, email, password_hash, name, created_at";
const QA_COLUMNS: &str = "id, question, answer, agent_id, created_at, updated_at";
const FILE_COLUMNS: &str =
    "id, file_name, file_url, file_path, file_size, file_type, uploaded_by, uploaded_at";

#[async_trait]
impl Repository for PostgresRepository {
    async fn find_admin_by_email(&self, email: &str) -> Result<Option<Admin>, sqlx::Error> {
        sqlx::query_as::<_, Admin>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_admin(&self, id: Uuid) -> Result<Option<Admin>, sqlx::Error> {
        sqlx::query_as::<_, Admin>(&format!("SELECT {ADMIN_COLUMNS} FROM admins WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn count_admins(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM admins")
            .fetch_one(&self.pool)
            .await
    }

    async fn create_admin(&self, admin: NewAdmin) -> Result<Admin, sqlx::Error> {
        sqlx::query_as::<_, Admin>(&format!(
            "INSERT INTO admins (id, email, password_hash, name, created_at) \
             VALUES ($1, $2, $3, $4, NOW()) RETURNING {ADMIN_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(admin.email)
        .bind(admin.password_hash)
        .bind(admin.name)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_qa(&self, agent_id: &str) -> Result<Vec<QaPair>, sqlx::Error> {
        sqlx::query_as::<_, QaPair>(&format!(
            "SELECT {QA_COLUMNS} FROM qa_pairs WHERE agent_id = $1 ORDER BY created_at DESC"
        ))
        .bind(agent_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_owned_qa(
        &self,
        id: Uuid,
        agent_id: &str,
    ) -> Result<Option<QaPair>, sqlx::Error> {
        sqlx::query_as::<_, QaPair>(&format!(
            "SELECT {QA_COLUMNS} FROM qa_pairs WHERE id = $1 AND agent_id = $2"
        ))
        .bind(id)
        .bind(agent_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_qa(
        &self,
        agent_id: &str,
        question: &str,
        answer: &str,
    ) -> Result<QaPair, sqlx::Error> {
        sqlx::query_as::<_, QaPair>(&format!(
            "INSERT INTO qa_pairs (id, question, answer, agent_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, NOW(), NOW()) RETURNING {QA_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(question)
        .bind(answer)
        .bind(agent_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_qa_answer(
        &self,
        id: Uuid,
        agent_id: &str,
        answer: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE qa_pairs SET answer = $1, updated_at = NOW() WHERE id = $2 AND agent_id = $3",
        )
        .bind(answer)
        .bind(id)
        .bind(agent_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_qa(&self, id: Uuid, agent_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM qa_pairs WHERE id = $1 AND agent_id = $2")
            .bind(id)
            .bind(agent_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_files(&self) -> Result<Vec<FileRecord>, sqlx::Error> {
        sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {FILE_COLUMNS} FROM files ORDER BY uploaded_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn create_file(&self, file: NewFileRecord) -> Result<FileRecord, sqlx::Error> {
        sqlx::query_as::<_, FileRecord>(&format!(
            "INSERT INTO files (id, file_name, file_url, file_path, file_size, file_type, uploaded_by, uploaded_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, NOW()) RETURNING {FILE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(file.file_name)
        .bind(file.file_url)
        .bind(file.file_path)
        .bind(file.file_size)
        .bind(file.file_type)
        .bind(file.uploaded_by)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_file(&self, id: Uuid) -> Result<Option<FileRecord>, sqlx::Error> {
        sqlx::query_as::<_, FileRecord>(&format!("SELECT {FILE_COLUMNS} FROM files WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_owned_file(
        &self,
        id: Uuid,
        owner: &str,
    ) -> Result<Option<FileRecord>, sqlx::Error> {
        sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE id = $1 AND uploaded_by = $2"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_file(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_owned_file(&self, id: Uuid, owner: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1 AND uploaded_by = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
