//! Domain service for buyer requirements.
//!
//! Handlers talk to [`RequirementService`] only; the store, the listing
//! cache and the spreadsheet writer stay behind it.

use crate::domain::RequirementId;
use crate::models::{BulkUpdateSummary, NewRequirement, RequirementPatch, RequirementRecord};
use crate::services::export::DateFilter;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RequirementError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Requirement not found: {0}")]
    NotFound(RequirementId),

    #[error("Database error: {0}")]
    Persistence(String),

    #[error("Requirement {id} is missing {field}")]
    MalformedRecord {
        id: RequirementId,
        field: &'static str,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for RequirementError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl From<anyhow::Error> for RequirementError {
    fn from(err: anyhow::Error) -> Self {
        Self::Persistence(format!("{err:#}"))
    }
}

/// A generated spreadsheet ready to be sent as an attachment.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub file_name: &'static str,
    pub content_type: &'static str,
    pub rows: usize,
    pub bytes: Vec<u8>,
}

#[async_trait::async_trait]
pub trait RequirementService: Send + Sync {
    /// Persists a new requirement and clears the cached listing.
    async fn create(&self, input: NewRequirement) -> Result<RequirementRecord, RequirementError>;

    /// Lists every requirement, served from the cache while it is fresh.
    async fn list(&self) -> Result<Arc<Vec<RequirementRecord>>, RequirementError>;

    async fn get(&self, id: RequirementId) -> Result<RequirementRecord, RequirementError>;

    /// Shallow-merges `patch` into one requirement.
    async fn update(
        &self,
        id: RequirementId,
        patch: RequirementPatch,
    ) -> Result<RequirementRecord, RequirementError>;

    /// Applies the same patch to every requirement.
    async fn update_all(
        &self,
        patch: RequirementPatch,
    ) -> Result<BulkUpdateSummary, RequirementError>;

    /// Removes a requirement, returning its last state.
    async fn delete(&self, id: RequirementId) -> Result<RequirementRecord, RequirementError>;

    /// Builds an `.xlsx` export of the requirements matching `filter`.
    async fn export(&self, filter: DateFilter) -> Result<ExportFile, RequirementError>;
}
