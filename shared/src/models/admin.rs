//! Admin Account Model

use serde::{Deserialize, Serialize};

pub const ADMINS_COLLECTION: &str = "admins";

/// Stored admin account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminAccount {
    pub id: String,
    pub email: String,
    /// Argon2 PHC string
    pub password_hash: String,
    pub role: String,
    pub created_at: i64,
}

/// Admin as exposed over the API (no hash)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminInfo {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl From<&AdminAccount> for AdminInfo {
    fn from(account: &AdminAccount) -> Self {
        Self {
            id: account.id.clone(),
            email: account.email.clone(),
            role: account.role.clone(),
        }
    }
}

/// Login / first-admin setup payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Successful login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: i64,
    pub admin: AdminInfo,
}

/// Whether the first-run setup still has to create an admin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupStatus {
    pub admin_exists: bool,
}
