//! Listing cache behaviour observed through the service.

use chrono::{TimeDelta, TimeZone, Utc};
use milaniume::cache::ManualClock;
use milaniume::config::Config;
use milaniume::constants::cache::ALL_REQUIREMENTS_KEY;
use milaniume::db::Store;
use milaniume::domain::SellOrRent;
use milaniume::models::{
    CommercialAvailability, Condition, Facing, NewRequirement, NumericRange, PropertyDetails,
    RequirementPatch, ResidentialAvailability,
};
use milaniume::services::{DateFilter, RequirementError, RequirementService};
use milaniume::state::SharedState;
use sea_orm::ConnectionTrait;
use std::sync::Arc;

async fn setup(config: Config) -> (SharedState, Arc<ManualClock>) {
    let db_path =
        std::env::temp_dir().join(format!("milaniume-service-test-{}.db", uuid::Uuid::new_v4()));
    let store = Store::new(&format!("sqlite:{}", db_path.display()))
        .await
        .expect("Failed to open store");

    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
    ));
    let state = SharedState::with_store(config, store, clock.clone());
    (state, clock)
}

fn new_requirement(name: &str) -> NewRequirement {
    NewRequirement {
        role: "Buyer".to_string(),
        name: name.to_string(),
        phone: "9000000000".to_string(),
        email: String::new(),
        submitted_at: None,
        property_details: PropertyDetails {
            property_type: "Flat".to_string(),
            area_sqft: NumericRange {
                min: 500.0,
                max: 900.0,
            },
            budget: NumericRange {
                min: 1_000_000.0,
                max: 2_000_000.0,
            },
            sell_or_rent: SellOrRent::Sell,
        },
        condition: Condition::default(),
        residential_availability: ResidentialAvailability::default(),
        commercial_availability: CommercialAvailability::default(),
        facing: Facing::default(),
    }
}

/// Inserts a row behind the service's back so the cache is not cleared.
async fn insert_directly(state: &SharedState, name: &str) {
    state
        .store
        .add_requirement(&new_requirement(name), Utc::now())
        .await
        .unwrap();
}

#[tokio::test]
async fn listing_is_served_from_cache_until_ttl() {
    let (state, clock) = setup(Config::default()).await;
    let service = state.requirement_service.clone();

    service.create(new_requirement("First")).await.unwrap();
    assert_eq!(service.list().await.unwrap().len(), 1);

    insert_directly(&state, "Second").await;
    assert_eq!(service.list().await.unwrap().len(), 1);

    clock.advance(TimeDelta::seconds(1799));
    assert_eq!(service.list().await.unwrap().len(), 1);

    clock.advance(TimeDelta::seconds(1));
    assert_eq!(service.list().await.unwrap().len(), 2);
}

#[tokio::test]
async fn refilled_listing_gets_a_fresh_ttl() {
    let (state, clock) = setup(Config::default()).await;
    let service = state.requirement_service.clone();
    let start = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();

    service.create(new_requirement("First")).await.unwrap();
    assert_eq!(service.list().await.unwrap().len(), 1);

    insert_directly(&state, "Second").await;
    clock.set(start + TimeDelta::minutes(30));
    assert_eq!(service.list().await.unwrap().len(), 2);

    insert_directly(&state, "Third").await;
    clock.set(start + TimeDelta::minutes(59));
    assert_eq!(service.list().await.unwrap().len(), 2);

    clock.set(start + TimeDelta::minutes(60));
    assert_eq!(service.list().await.unwrap().len(), 3);
}

#[tokio::test]
async fn listing_without_population_always_reads_the_store() {
    let mut config = Config::default();
    config.cache.populate_on_read = false;
    let (state, _) = setup(config).await;
    let service = state.requirement_service.clone();

    service.create(new_requirement("First")).await.unwrap();
    assert_eq!(service.list().await.unwrap().len(), 1);

    insert_directly(&state, "Second").await;
    assert_eq!(service.list().await.unwrap().len(), 2);
}

#[tokio::test]
async fn every_write_clears_the_cached_listing() {
    let (state, _) = setup(Config::default()).await;
    let service = state.requirement_service.clone();

    let first = service.create(new_requirement("First")).await.unwrap();
    assert_eq!(service.list().await.unwrap().len(), 1);

    let second = service.create(new_requirement("Second")).await.unwrap();
    assert_eq!(service.list().await.unwrap().len(), 2);

    let patch = RequirementPatch {
        name: Some("First Updated".to_string()),
        ..RequirementPatch::default()
    };
    service.update(first.id, patch).await.unwrap();
    let listing = service.list().await.unwrap();
    assert!(listing.iter().any(|r| r.name == "First Updated"));

    let patch = RequirementPatch {
        sell_or_rent: Some(SellOrRent::Rent),
        ..RequirementPatch::default()
    };
    let summary = service.update_all(patch).await.unwrap();
    assert_eq!(summary.matched_count, 2);
    assert_eq!(summary.modified_count, 2);
    let listing = service.list().await.unwrap();
    assert!(listing.iter().all(|r| {
        r.property_details
            .as_ref()
            .is_some_and(|d| d.sell_or_rent == SellOrRent::Rent)
    }));

    let deleted = service.delete(second.id).await.unwrap();
    assert_eq!(deleted.name, "Second");
    assert_eq!(service.list().await.unwrap().len(), 1);

    assert!(matches!(
        service.get(second.id).await,
        Err(RequirementError::NotFound(id)) if id == second.id
    ));
    assert!(matches!(
        service.delete(second.id).await,
        Err(RequirementError::NotFound(_))
    ));
}

#[tokio::test]
async fn create_defaults_submission_date_to_now() {
    let (state, _) = setup(Config::default()).await;
    let service = state.requirement_service.clone();

    let record = service.create(new_requirement("Now")).await.unwrap();
    assert_eq!(
        record.submitted_at,
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
    );

    let file = service.export(DateFilter::Today).await.unwrap();
    assert_eq!(file.rows, 1);
    assert_eq!(file.file_name, "Requirements.xlsx");
    assert!(file.bytes.starts_with(b"PK"));
}

#[tokio::test]
async fn invalid_writes_are_rejected_before_the_store() {
    let (state, _) = setup(Config::default()).await;
    let service = state.requirement_service.clone();

    let mut input = new_requirement("Blank");
    input.phone = String::new();
    assert!(matches!(
        service.create(input).await,
        Err(RequirementError::Validation(_))
    ));

    assert!(matches!(
        service.update_all(RequirementPatch::default()).await,
        Err(RequirementError::Validation(_))
    ));
    assert!(service.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn patch_replaces_only_the_fields_it_names() {
    let (state, _) = setup(Config::default()).await;
    let service = state.requirement_service.clone();

    let mut input = new_requirement("Asha");
    input.condition.new = true;
    let record = service.create(input).await.unwrap();

    let patch: RequirementPatch = serde_json::from_str(
        r#"{"RequiredPersonName": "Ravi", "Condition": {"Resale": true}, "SellRent": "Rent"}"#,
    )
    .unwrap();
    let updated = service.update(record.id, patch).await.unwrap();

    assert_eq!(updated.name, "Ravi");
    assert_eq!(updated.phone, "9000000000");
    assert!(updated.condition.resale);
    assert!(!updated.condition.new);
    let details = updated.property_details.unwrap();
    assert_eq!(details.sell_or_rent, SellOrRent::Rent);
    assert_eq!(details.property_type, "Flat");
    assert_eq!(details.budget.max, 2_000_000.0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_patches_to_different_fields_both_apply() {
    let (state, _) = setup(Config::default()).await;
    let service = state.requirement_service.clone();
    let record = service.create(new_requirement("Start")).await.unwrap();

    for i in 0..25 {
        let name = RequirementPatch {
            name: Some(format!("name-{i}")),
            ..RequirementPatch::default()
        };
        let phone = RequirementPatch {
            phone: Some(format!("phone-{i}")),
            ..RequirementPatch::default()
        };

        let (a, b) = tokio::join!(
            service.update(record.id, name),
            service.update(record.id, phone)
        );
        a.unwrap();
        b.unwrap();

        let stored = service.get(record.id).await.unwrap();
        assert_eq!(stored.name, format!("name-{i}"));
        assert_eq!(stored.phone, format!("phone-{i}"));
    }
}

#[tokio::test]
async fn failed_bulk_update_still_clears_the_listing() {
    let (state, _) = setup(Config::default()).await;
    let service = state.requirement_service.clone();

    for name in ["A", "B", "C"] {
        service.create(new_requirement(name)).await.unwrap();
    }
    assert_eq!(service.list().await.unwrap().len(), 3);
    assert!(state.listing_cache.get(ALL_REQUIREMENTS_KEY).unwrap().is_some());

    state
        .store
        .conn
        .execute_unprepared(
            "CREATE TRIGGER reject_second BEFORE UPDATE ON requirements \
             WHEN OLD.id = 2 BEGIN SELECT RAISE(ABORT, 'row locked'); END",
        )
        .await
        .unwrap();

    let patch = RequirementPatch {
        sell_or_rent: Some(SellOrRent::Rent),
        ..RequirementPatch::default()
    };
    assert!(matches!(
        service.update_all(patch).await,
        Err(RequirementError::Persistence(_))
    ));
    assert!(state.listing_cache.get(ALL_REQUIREMENTS_KEY).unwrap().is_none());

    let stored = state.store.list_requirements().await.unwrap();
    let listed = service.list().await.unwrap();
    assert_eq!(listed.as_slice(), stored.as_slice());
}

#[tokio::test]
async fn sell_rent_shorthand_skips_rows_without_details() {
    let (state, _) = setup(Config::default()).await;
    let service = state.requirement_service.clone();

    service.create(new_requirement("Complete")).await.unwrap();
    state
        .store
        .conn
        .execute_unprepared(
            "INSERT INTO requirements (person_role, person_name, person_phone, person_email, \
             submitted_at, condition, residential_availability, commercial_availability, facing, \
             created_at, updated_at) VALUES ('Buyer', 'Legacy', '1', '', \
             '2024-05-01T00:00:00+00:00', '{}', '{}', '{}', '{}', \
             '2024-05-01T00:00:00+00:00', '2024-05-01T00:00:00+00:00')",
        )
        .await
        .unwrap();

    let patch = RequirementPatch {
        sell_or_rent: Some(SellOrRent::Rent),
        ..RequirementPatch::default()
    };
    let summary = service.update_all(patch.clone()).await.unwrap();
    assert_eq!(summary.matched_count, 2);
    assert_eq!(summary.modified_count, 1);

    let listing = service.list().await.unwrap();
    let legacy = listing.iter().find(|r| r.name == "Legacy").unwrap();
    assert!(legacy.property_details.is_none());

    // Already Rent everywhere it applies.
    let summary = service.update_all(patch).await.unwrap();
    assert_eq!(summary.modified_count, 0);
}
