//! Admin Account Repository

use std::sync::Arc;

use shared::models::{ADMINS_COLLECTION, AdminAccount};
use shared::{AppError, AppResult, ErrorCode};

use crate::auth::password::hash_password;
use crate::db::store::{Document, DocumentStore, StoreResult};

pub const MIN_PASSWORD_LENGTH: usize = 8;
const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone)]
pub struct AdminRepository {
    store: Arc<dyn DocumentStore>,
}

impl AdminRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn exists(&self) -> AppResult<bool> {
        Ok(!self.find_all().await?.is_empty())
    }

    async fn find_all(&self) -> AppResult<Vec<AdminAccount>> {
        let docs = self.store.list(ADMINS_COLLECTION, Some("createdAt")).await?;
        Ok(docs
            .iter()
            .map(Document::decode)
            .collect::<StoreResult<_>>()?)
    }

    /// Create the first admin. Only allowed while no admin exists.
    pub async fn create_first(&self, email: &str, password: &str) -> AppResult<AdminAccount> {
        let email = normalize_email(email);
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::validation("A valid email address is required")
                .with_detail("field", "email"));
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::with_message(
                ErrorCode::PasswordTooShort,
                format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
            ));
        }
        if self.exists().await? {
            return Err(AppError::new(ErrorCode::AdminAlreadyExists));
        }

        let account = AdminAccount {
            id: shared::util::new_id(),
            email,
            password_hash: hash_password(password)?,
            role: ADMIN_ROLE.to_string(),
            created_at: shared::util::now_millis(),
        };
        let body = serde_json::to_value(&account)
            .map_err(|e| AppError::internal(format!("Failed to encode admin: {e}")))?;
        // version 0: a concurrent setup for the same id cannot overwrite
        self.store
            .put_versioned(ADMINS_COLLECTION, &account.id, body, 0)
            .await?;

        tracing::info!(admin_id = %account.id, email = %account.email, "Admin account created");
        Ok(account)
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<AdminAccount>> {
        let email = normalize_email(email);
        Ok(self
            .find_all()
            .await?
            .into_iter()
            .find(|a| a.email == email))
    }

    pub async fn get(&self, id: &str) -> AppResult<Option<AdminAccount>> {
        let doc = self.store.get(ADMINS_COLLECTION, id).await?;
        Ok(doc.map(|d| d.decode()).transpose()?)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
