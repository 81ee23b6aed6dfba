use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, NotSet,
    PaginatorTrait, QueryFilter, QueryOrder, Set, UpdateMany,
};

use crate::domain::{RequirementId, SellOrRent};
use crate::entities::{prelude::*, requirements};
use crate::models::{
    BulkUpdateSummary, NewRequirement, NumericRange, PropertyDetails, RequirementPatch,
    RequirementRecord,
};

/// Repository for buyer requirements
pub struct RequirementRepository {
    conn: DatabaseConnection,
}

impl RequirementRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    // ========================================================================
    // Model Conversion Helpers
    // ========================================================================

    fn map_model(m: requirements::Model) -> Result<RequirementRecord> {
        let property_details = match (
            m.property_type,
            m.area_min,
            m.area_max,
            m.budget_min,
            m.budget_max,
            m.sell_or_rent.as_deref().and_then(SellOrRent::parse),
        ) {
            (
                Some(property_type),
                Some(area_min),
                Some(area_max),
                Some(budget_min),
                Some(budget_max),
                Some(sell_or_rent),
            ) => Some(PropertyDetails {
                property_type,
                area_sqft: NumericRange::new(area_min, area_max),
                budget: NumericRange::new(budget_min, budget_max),
                sell_or_rent,
            }),
            _ => None,
        };

        Ok(RequirementRecord {
            id: RequirementId::new(m.id),
            role: m.person_role,
            name: m.person_name,
            phone: m.person_phone,
            email: m.person_email,
            submitted_at: parse_timestamp(&m.submitted_at)?,
            property_details,
            condition: serde_json::from_str(&m.condition)
                .with_context(|| format!("Corrupt Condition on requirement {}", m.id))?,
            residential_availability: serde_json::from_str(&m.residential_availability)
                .with_context(|| {
                    format!("Corrupt ResidentialAvailability on requirement {}", m.id)
                })?,
            commercial_availability: serde_json::from_str(&m.commercial_availability)
                .with_context(|| {
                    format!("Corrupt CommercialAvailability on requirement {}", m.id)
                })?,
            facing: serde_json::from_str(&m.facing)
                .with_context(|| format!("Corrupt Facing on requirement {}", m.id))?,
            created_at: parse_timestamp(&m.created_at)?,
            updated_at: parse_timestamp(&m.updated_at)?,
        })
    }

    /// Column assignments for the fields `patch` sets. Nested values replace
    /// the stored ones wholesale.
    fn patch_assignments(patch: &RequirementPatch) -> Result<Vec<(requirements::Column, SimpleExpr)>> {
        use requirements::Column;

        let mut sets = Vec::new();

        if let Some(role) = &patch.role {
            sets.push((Column::PersonRole, Expr::value(role.clone())));
        }
        if let Some(name) = &patch.name {
            sets.push((Column::PersonName, Expr::value(name.clone())));
        }
        if let Some(phone) = &patch.phone {
            sets.push((Column::PersonPhone, Expr::value(phone.clone())));
        }
        if let Some(email) = &patch.email {
            sets.push((Column::PersonEmail, Expr::value(email.clone())));
        }
        if let Some(submitted_at) = patch.submitted_at {
            sets.push((Column::SubmittedAt, Expr::value(submitted_at.to_rfc3339())));
        }
        if let Some(details) = &patch.property_details {
            sets.extend([
                (Column::PropertyType, Expr::value(details.property_type.clone())),
                (Column::AreaMin, Expr::value(details.area_sqft.min)),
                (Column::AreaMax, Expr::value(details.area_sqft.max)),
                (Column::BudgetMin, Expr::value(details.budget.min)),
                (Column::BudgetMax, Expr::value(details.budget.max)),
                (Column::SellOrRent, Expr::value(details.sell_or_rent.as_str())),
            ]);
        }
        if let Some(sell_or_rent) = patch.sell_or_rent {
            // Rows without property details stay without them.
            let guarded = Expr::case(Column::PropertyType.is_null(), Expr::col(Column::SellOrRent))
                .finally(Expr::value(sell_or_rent.as_str()));
            sets.push((Column::SellOrRent, guarded.into()));
        }
        if let Some(condition) = &patch.condition {
            sets.push((Column::Condition, Expr::value(serde_json::to_string(condition)?)));
        }
        if let Some(residential) = &patch.residential_availability {
            sets.push((
                Column::ResidentialAvailability,
                Expr::value(serde_json::to_string(residential)?),
            ));
        }
        if let Some(commercial) = &patch.commercial_availability {
            sets.push((
                Column::CommercialAvailability,
                Expr::value(serde_json::to_string(commercial)?),
            ));
        }
        if let Some(facing) = &patch.facing {
            sets.push((Column::Facing, Expr::value(serde_json::to_string(facing)?)));
        }

        Ok(sets)
    }

    /// A single `UPDATE` that writes only the patched columns, and only on
    /// rows where at least one of them differs. Each row is changed
    /// atomically, so concurrent patches to different fields both land.
    fn patch_statement(
        patch: &RequirementPatch,
        now: DateTime<Utc>,
    ) -> Result<UpdateMany<Requirements>> {
        let assignments = Self::patch_assignments(patch)?;
        anyhow::ensure!(!assignments.is_empty(), "Patch sets no columns");

        // `IS NOT` also treats NULL as a distinct value.
        let changed = assignments
            .iter()
            .fold(Condition::any(), |cond, (column, value)| {
                cond.add(Expr::col(*column).is_not(value.clone()))
            });

        let statement = assignments.into_iter().fold(
            Requirements::update_many().filter(changed),
            |statement, (column, value)| statement.col_expr(column, value),
        );

        Ok(statement.col_expr(
            requirements::Column::UpdatedAt,
            Expr::value(now.to_rfc3339()),
        ))
    }

    // ========================================================================
    // Requirement Operations
    // ========================================================================

    pub async fn insert(
        &self,
        input: &NewRequirement,
        now: DateTime<Utc>,
    ) -> Result<RequirementRecord> {
        let details = &input.property_details;
        let timestamp = now.to_rfc3339();

        let active_model = requirements::ActiveModel {
            id: NotSet,
            person_role: Set(input.role.clone()),
            person_name: Set(input.name.clone()),
            person_phone: Set(input.phone.clone()),
            person_email: Set(input.email.clone()),
            submitted_at: Set(input.submitted_at.unwrap_or(now).to_rfc3339()),
            property_type: Set(Some(details.property_type.clone())),
            area_min: Set(Some(details.area_sqft.min)),
            area_max: Set(Some(details.area_sqft.max)),
            budget_min: Set(Some(details.budget.min)),
            budget_max: Set(Some(details.budget.max)),
            sell_or_rent: Set(Some(details.sell_or_rent.as_str().to_string())),
            condition: Set(serde_json::to_string(&input.condition)?),
            residential_availability: Set(serde_json::to_string(
                &input.residential_availability,
            )?),
            commercial_availability: Set(serde_json::to_string(&input.commercial_availability)?),
            facing: Set(serde_json::to_string(&input.facing)?),
            created_at: Set(timestamp.clone()),
            updated_at: Set(timestamp),
        };

        let model = active_model
            .insert(&self.conn)
            .await
            .context("Failed to insert requirement")?;

        Self::map_model(model)
    }

    pub async fn get(&self, id: RequirementId) -> Result<Option<RequirementRecord>> {
        let model = Requirements::find_by_id(id.value())
            .one(&self.conn)
            .await
            .context("Failed to query requirement by ID")?;

        model.map(Self::map_model).transpose()
    }

    pub async fn list_all(&self) -> Result<Vec<RequirementRecord>> {
        let models = Requirements::find()
            .order_by_asc(requirements::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list requirements")?;

        models.into_iter().map(Self::map_model).collect()
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(Requirements::find().count(&self.conn).await?)
    }

    pub async fn update(
        &self,
        id: RequirementId,
        patch: &RequirementPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<RequirementRecord>> {
        Self::patch_statement(patch, now)?
            .filter(requirements::Column::Id.eq(id.value()))
            .exec(&self.conn)
            .await
            .with_context(|| format!("Failed to update requirement {id}"))?;

        // Nothing written means either no such row or nothing changed.
        self.get(id).await
    }

    /// Applies `patch` to every row in one statement. Rows the patch leaves
    /// unchanged are matched but not modified.
    pub async fn update_all(
        &self,
        patch: &RequirementPatch,
        now: DateTime<Utc>,
    ) -> Result<BulkUpdateSummary> {
        let matched_count = self.count().await?;

        let result = Self::patch_statement(patch, now)?
            .exec(&self.conn)
            .await
            .context("Failed to update requirements")?;

        Ok(BulkUpdateSummary {
            matched_count,
            modified_count: result.rows_affected,
        })
    }

    pub async fn delete(&self, id: RequirementId) -> Result<Option<RequirementRecord>> {
        let Some(record) = self.get(id).await? else {
            return Ok(None);
        };

        let result = Requirements::delete_by_id(id.value())
            .exec(&self.conn)
            .await
            .with_context(|| format!("Failed to delete requirement {id}"))?;

        Ok((result.rows_affected > 0).then_some(record))
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("Invalid stored timestamp: {value}"))
}
