//! Settings Repository (Singleton)
//!
//! The whole storefront configuration lives in one document
//! (`settings/main`). Reads fill in every missing field from the default
//! template; writes merge a partial patch and are conditional on the
//! version that was read.

use std::sync::Arc;

use serde_json::Value;
use shared::models::{
    SETTINGS_COLLECTION, SETTINGS_ID, SettingChange, SettingsDocument, merge_json,
};
use shared::{AppError, AppResult, ChangeAction, ErrorCode, ResourceKind};

use super::settings_patch::normalize_patch;
use crate::db::store::{DocumentStore, StoreError};
use crate::message::ChangeBus;

#[derive(Debug, Clone)]
pub struct SettingsRepository {
    store: Arc<dyn DocumentStore>,
    bus: ChangeBus,
}

impl SettingsRepository {
    pub fn new(store: Arc<dyn DocumentStore>, bus: ChangeBus) -> Self {
        Self { store, bus }
    }

    /// Current settings, default-filled. Creates the document on first read.
    pub async fn get(&self) -> AppResult<SettingsDocument> {
        Ok(self.load().await?.0)
    }

    /// Settings together with the version token of the stored document
    pub async fn load(&self) -> AppResult<(SettingsDocument, u64)> {
        if let Some(found) = self.read_existing().await? {
            return Ok(found);
        }

        let defaults = SettingsDocument::default();
        let body = serde_json::to_value(&defaults)
            .map_err(|e| AppError::internal(format!("Failed to encode default settings: {e}")))?;

        match self
            .store
            .put_versioned(SETTINGS_COLLECTION, SETTINGS_ID, body, 0)
            .await
        {
            Ok(version) => {
                tracing::info!("Settings document created from defaults");
                Ok((defaults, version))
            }
            Err(StoreError::VersionConflict { .. }) => {
                // another reader created it first
                self.read_existing()
                    .await?
                    .ok_or_else(|| AppError::database("Settings document vanished after creation"))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn read_existing(&self) -> AppResult<Option<(SettingsDocument, u64)>> {
        let Some(doc) = self.store.get(SETTINGS_COLLECTION, SETTINGS_ID).await? else {
            return Ok(None);
        };
        let settings = SettingsDocument::from_stored(&doc.body).map_err(|e| {
            tracing::error!(error = %e, "Stored settings do not match the schema");
            AppError::database(format!("Stored settings are invalid: {e}"))
        })?;
        Ok(Some((settings, doc.version)))
    }

    /// Merge a partial patch into the stored settings.
    ///
    /// Nothing is persisted or published when the patch is invalid. A
    /// concurrent write between read and persist yields `SettingsConflict`.
    pub async fn update(&self, patch: &Value) -> AppResult<SettingsDocument> {
        let patch = normalize_patch(patch)?;
        let (current, version) = self.load().await?;

        let mut merged = serde_json::to_value(&current)
            .map_err(|e| AppError::internal(format!("Failed to encode settings: {e}")))?;
        merge_json(&mut merged, &patch);
        merged["updatedAt"] = Value::from(shared::util::now_millis());

        let updated: SettingsDocument = serde_json::from_value(merged).map_err(|e| {
            AppError::with_message(ErrorCode::SettingsInvalid, format!("Invalid settings: {e}"))
        })?;
        let body = serde_json::to_value(&updated)
            .map_err(|e| AppError::internal(format!("Failed to encode settings: {e}")))?;

        let new_version = self
            .store
            .put_versioned(SETTINGS_COLLECTION, SETTINGS_ID, body, version)
            .await
            .map_err(|e| match e {
                StoreError::VersionConflict { .. } => {
                    tracing::warn!(expected = version, "Settings changed concurrently, update rejected");
                    AppError::with_message(
                        ErrorCode::SettingsConflict,
                        "Settings were changed by someone else, reload and try again",
                    )
                }
                other => other.into(),
            })?;

        tracing::info!(version = new_version, "Settings updated");
        self.bus.notify(
            ResourceKind::Settings,
            ChangeAction::Updated,
            Some(SETTINGS_ID.to_string()),
        );
        Ok(updated)
    }

    /// Single-field edit from the admin form
    pub async fn apply_change(&self, change: &SettingChange) -> AppResult<SettingsDocument> {
        if change.key.trim().is_empty() {
            return Err(AppError::with_message(
                ErrorCode::RequiredField,
                "Setting key is required",
            ));
        }
        self.update(&change.to_patch()).await
    }
}
