pub mod requirement;

pub use requirement::{
    BulkUpdateSummary, CommercialAvailability, Condition, Facing, FlagGroup, NewRequirement,
    NumericRange, PropertyDetails, RequirementPatch, RequirementRecord, ResidentialAvailability,
};
