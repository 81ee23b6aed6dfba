pub mod export;
pub use export::DateFilter;

pub mod requirement_service;
pub mod requirement_service_impl;
pub use requirement_service::{ExportFile, RequirementError, RequirementService};
pub use requirement_service_impl::{ListingCache, SeaOrmRequirementService};
