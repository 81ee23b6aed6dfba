//! `SeaORM` implementation of the `RequirementService` trait.

use async_trait::async_trait;
use chrono::FixedOffset;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::{Clock, TtlCache};
use crate::config::Config;
use crate::constants::{cache::ALL_REQUIREMENTS_KEY, export};
use crate::db::Store;
use crate::domain::RequirementId;
use crate::models::{BulkUpdateSummary, NewRequirement, RequirementPatch, RequirementRecord};
use crate::services::export::{DateFilter, build_rows, filter_records, write_workbook};
use crate::services::requirement_service::{ExportFile, RequirementError, RequirementService};

pub type ListingCache = TtlCache<Arc<Vec<RequirementRecord>>>;

pub struct SeaOrmRequirementService {
    store: Store,
    cache: Arc<ListingCache>,
    clock: Arc<dyn Clock>,
    populate_on_read: bool,
    report_offset: FixedOffset,
}

impl SeaOrmRequirementService {
    #[must_use]
    pub fn new(
        store: Store,
        cache: Arc<ListingCache>,
        clock: Arc<dyn Clock>,
        config: &Config,
    ) -> Self {
        Self {
            store,
            cache,
            clock,
            populate_on_read: config.cache.populate_on_read,
            report_offset: config.export.offset(),
        }
    }

    /// Cache failures are logged and never fail the request.
    fn invalidate_listing(&self) {
        match self.cache.delete(ALL_REQUIREMENTS_KEY) {
            Ok(existed) => debug!(existed, "Cleared requirements listing cache"),
            Err(e) => warn!("Error clearing requirements cache: {e}"),
        }
    }

    fn cached_listing(&self) -> Option<Arc<Vec<RequirementRecord>>> {
        match self.cache.get(ALL_REQUIREMENTS_KEY) {
            Ok(hit) => hit,
            Err(e) => {
                warn!("Error reading requirements cache: {e}");
                None
            }
        }
    }
}

#[async_trait]
impl RequirementService for SeaOrmRequirementService {
    async fn create(&self, input: NewRequirement) -> Result<RequirementRecord, RequirementError> {
        input.validate().map_err(RequirementError::Validation)?;

        let record = self.store.add_requirement(&input, self.clock.now()).await?;
        self.invalidate_listing();

        info!(id = %record.id, "Requirement created");
        Ok(record)
    }

    async fn list(&self) -> Result<Arc<Vec<RequirementRecord>>, RequirementError> {
        if let Some(records) = self.cached_listing() {
            metrics::counter!("requirement_cache_hits_total").increment(1);
            return Ok(records);
        }
        metrics::counter!("requirement_cache_misses_total").increment(1);

        // Observed before the query so a write that lands mid-read drops the fill.
        let generation = if self.populate_on_read {
            self.cache
                .generation(ALL_REQUIREMENTS_KEY)
                .map_err(|e| warn!("Error reading requirements cache: {e}"))
                .ok()
        } else {
            None
        };

        let records = Arc::new(self.store.list_requirements().await?);

        if let Some(generation) = generation {
            match self
                .cache
                .set_if_generation(ALL_REQUIREMENTS_KEY, generation, records.clone())
            {
                Ok(true) => debug!(count = records.len(), "Cached requirements listing"),
                Ok(false) => debug!("Listing invalidated during read, not caching"),
                Err(e) => warn!("Error filling requirements cache: {e}"),
            }
        }

        Ok(records)
    }

    async fn get(&self, id: RequirementId) -> Result<RequirementRecord, RequirementError> {
        self.store
            .get_requirement(id)
            .await?
            .ok_or(RequirementError::NotFound(id))
    }

    async fn update(
        &self,
        id: RequirementId,
        patch: RequirementPatch,
    ) -> Result<RequirementRecord, RequirementError> {
        patch.validate().map_err(RequirementError::Validation)?;

        // Cleared on failure too; the store may have changed regardless.
        let result = self
            .store
            .update_requirement(id, &patch, self.clock.now())
            .await;
        self.invalidate_listing();
        let record = result?.ok_or(RequirementError::NotFound(id))?;

        info!(id = %id, "Requirement updated");
        Ok(record)
    }

    async fn update_all(
        &self,
        patch: RequirementPatch,
    ) -> Result<BulkUpdateSummary, RequirementError> {
        patch.validate().map_err(RequirementError::Validation)?;

        let result = self
            .store
            .update_all_requirements(&patch, self.clock.now())
            .await;
        self.invalidate_listing();
        let summary = result?;

        info!(
            matched = summary.matched_count,
            modified = summary.modified_count,
            "Bulk requirement update finished"
        );
        Ok(summary)
    }

    async fn delete(&self, id: RequirementId) -> Result<RequirementRecord, RequirementError> {
        let record = self
            .store
            .remove_requirement(id)
            .await?
            .ok_or(RequirementError::NotFound(id))?;
        self.invalidate_listing();

        info!(id = %id, "Requirement deleted");
        Ok(record)
    }

    async fn export(&self, filter: DateFilter) -> Result<ExportFile, RequirementError> {
        let records = self.store.list_requirements().await?;
        let today = self
            .clock
            .now()
            .with_timezone(&self.report_offset)
            .date_naive();

        let matched = filter_records(&records, filter, today, self.report_offset);
        let rows = build_rows(&matched, self.report_offset)?;
        let row_count = rows.len();

        let bytes = tokio::task::spawn_blocking(move || write_workbook(&rows))
            .await
            .map_err(|e| RequirementError::Internal(format!("Export task failed: {e}")))?
            .map_err(|e| RequirementError::Internal(format!("Failed to write workbook: {e}")))?;

        info!(?filter, rows = row_count, bytes = bytes.len(), "Requirements exported");

        Ok(ExportFile {
            file_name: export::FILE_NAME,
            content_type: export::CONTENT_TYPE,
            rows: row_count,
            bytes,
        })
    }
}
