use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{RequirementId, SellOrRent};

/// Inclusive numeric range. `min <= max` is expected but not enforced here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

impl NumericRange {
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min >= 0.0 && self.max >= 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDetails {
    #[serde(rename = "RequiredPropertyType")]
    pub property_type: String,

    #[serde(rename = "RequiredAreaSqft")]
    pub area_sqft: NumericRange,

    #[serde(rename = "RequiredBudget")]
    pub budget: NumericRange,

    #[serde(rename = "RequiredPropertySellOrRent")]
    pub sell_or_rent: SellOrRent,
}

impl PropertyDetails {
    fn validate(&self) -> Result<(), String> {
        if self.property_type.trim().is_empty() {
            return Err("RequiredPropertyType cannot be empty".to_string());
        }
        if !self.area_sqft.is_valid() {
            return Err("RequiredAreaSqft must hold non-negative numbers".to_string());
        }
        if !self.budget.is_valid() {
            return Err("RequiredBudget must hold non-negative numbers".to_string());
        }
        Ok(())
    }
}

/// A fixed vocabulary of named boolean attributes.
///
/// On the wire a group is a map from attribute name to boolean. The order
/// returned by [`FlagGroup::flags`] is the order used when joining names.
pub trait FlagGroup {
    fn flags(&self) -> Vec<(&'static str, bool)>;

    fn enabled(&self) -> Vec<&'static str> {
        self.flags()
            .into_iter()
            .filter_map(|(name, on)| on.then_some(name))
            .collect()
    }

    fn joined(&self) -> String {
        self.enabled().join(", ")
    }
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Condition {
    #[serde(rename = "New")]
    pub new: bool,
    #[serde(rename = "Resale")]
    pub resale: bool,
    #[serde(rename = "UnderConstruction")]
    pub under_construction: bool,
    #[serde(rename = "ReadyToMove")]
    pub ready_to_move: bool,
    #[serde(rename = "Furnished")]
    pub furnished: bool,
    #[serde(rename = "SemiFurnished")]
    pub semi_furnished: bool,
    #[serde(rename = "Unfurnished")]
    pub unfurnished: bool,
}

impl FlagGroup for Condition {
    fn flags(&self) -> Vec<(&'static str, bool)> {
        vec![
            ("New", self.new),
            ("Resale", self.resale),
            ("UnderConstruction", self.under_construction),
            ("ReadyToMove", self.ready_to_move),
            ("Furnished", self.furnished),
            ("SemiFurnished", self.semi_furnished),
            ("Unfurnished", self.unfurnished),
        ]
    }
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResidentialAvailability {
    #[serde(rename = "1RK")]
    pub one_rk: bool,
    #[serde(rename = "1BHK")]
    pub one_bhk: bool,
    #[serde(rename = "2BHK")]
    pub two_bhk: bool,
    #[serde(rename = "3BHK")]
    pub three_bhk: bool,
    #[serde(rename = "4BHK")]
    pub four_bhk: bool,
    #[serde(rename = "Villa")]
    pub villa: bool,
    #[serde(rename = "RowHouse")]
    pub row_house: bool,
    #[serde(rename = "Penthouse")]
    pub penthouse: bool,
    #[serde(rename = "Plot")]
    pub plot: bool,
}

impl FlagGroup for ResidentialAvailability {
    fn flags(&self) -> Vec<(&'static str, bool)> {
        vec![
            ("1RK", self.one_rk),
            ("1BHK", self.one_bhk),
            ("2BHK", self.two_bhk),
            ("3BHK", self.three_bhk),
            ("4BHK", self.four_bhk),
            ("Villa", self.villa),
            ("RowHouse", self.row_house),
            ("Penthouse", self.penthouse),
            ("Plot", self.plot),
        ]
    }
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CommercialAvailability {
    #[serde(rename = "Office")]
    pub office: bool,
    #[serde(rename = "Shop")]
    pub shop: bool,
    #[serde(rename = "Showroom")]
    pub showroom: bool,
    #[serde(rename = "Warehouse")]
    pub warehouse: bool,
    #[serde(rename = "Industrial")]
    pub industrial: bool,
    #[serde(rename = "Land")]
    pub land: bool,
}

impl FlagGroup for CommercialAvailability {
    fn flags(&self) -> Vec<(&'static str, bool)> {
        vec![
            ("Office", self.office),
            ("Shop", self.shop),
            ("Showroom", self.showroom),
            ("Warehouse", self.warehouse),
            ("Industrial", self.industrial),
            ("Land", self.land),
        ]
    }
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Facing {
    #[serde(rename = "North")]
    pub north: bool,
    #[serde(rename = "South")]
    pub south: bool,
    #[serde(rename = "East")]
    pub east: bool,
    #[serde(rename = "West")]
    pub west: bool,
    #[serde(rename = "NorthEast")]
    pub north_east: bool,
    #[serde(rename = "NorthWest")]
    pub north_west: bool,
    #[serde(rename = "SouthEast")]
    pub south_east: bool,
    #[serde(rename = "SouthWest")]
    pub south_west: bool,
}

impl FlagGroup for Facing {
    fn flags(&self) -> Vec<(&'static str, bool)> {
        vec![
            ("North", self.north),
            ("South", self.south),
            ("East", self.east),
            ("West", self.west),
            ("NorthEast", self.north_east),
            ("NorthWest", self.north_west),
            ("SouthEast", self.south_east),
            ("SouthWest", self.south_west),
        ]
    }
}

/// A persisted buyer requirement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequirementRecord {
    #[serde(rename = "_id")]
    pub id: RequirementId,

    #[serde(rename = "RequiredPersonRole")]
    pub role: String,

    #[serde(rename = "RequiredPersonName")]
    pub name: String,

    #[serde(rename = "RequiredPersonPhone")]
    pub phone: String,

    #[serde(rename = "RequiredPersonEmail")]
    pub email: String,

    #[serde(rename = "RequiredPersonDate")]
    pub submitted_at: DateTime<Utc>,

    /// Absent only on rows written by older clients.
    #[serde(rename = "RequiredPropertyDetails")]
    pub property_details: Option<PropertyDetails>,

    #[serde(rename = "Condition")]
    pub condition: Condition,

    #[serde(rename = "ResidentialAvailability")]
    pub residential_availability: ResidentialAvailability,

    #[serde(rename = "CommercialAvailability")]
    pub commercial_availability: CommercialAvailability,

    #[serde(rename = "Facing")]
    pub facing: Facing,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRequirement {
    #[serde(rename = "RequiredPersonRole")]
    pub role: String,

    #[serde(rename = "RequiredPersonName")]
    pub name: String,

    #[serde(rename = "RequiredPersonPhone")]
    pub phone: String,

    #[serde(rename = "RequiredPersonEmail", default)]
    pub email: String,

    /// Defaults to the time of creation.
    #[serde(rename = "RequiredPersonDate", default)]
    pub submitted_at: Option<DateTime<Utc>>,

    #[serde(rename = "RequiredPropertyDetails")]
    pub property_details: PropertyDetails,

    #[serde(rename = "Condition", default)]
    pub condition: Condition,

    #[serde(rename = "ResidentialAvailability", default)]
    pub residential_availability: ResidentialAvailability,

    #[serde(rename = "CommercialAvailability", default)]
    pub commercial_availability: CommercialAvailability,

    #[serde(rename = "Facing", default)]
    pub facing: Facing,
}

impl NewRequirement {
    pub fn validate(&self) -> Result<(), String> {
        require_text("RequiredPersonRole", &self.role)?;
        require_text("RequiredPersonName", &self.name)?;
        require_text("RequiredPersonPhone", &self.phone)?;
        self.property_details.validate()
    }
}

/// Partial update. Every present field replaces the stored value wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequirementPatch {
    #[serde(rename = "RequiredPersonRole", default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(rename = "RequiredPersonName", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "RequiredPersonPhone", default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(rename = "RequiredPersonEmail", default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(rename = "RequiredPersonDate", default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,

    #[serde(rename = "RequiredPropertyDetails", default, skip_serializing_if = "Option::is_none")]
    pub property_details: Option<PropertyDetails>,

    /// Shorthand for replacing only the sell-or-rent flag inside the details.
    #[serde(rename = "SellRent", default, skip_serializing_if = "Option::is_none")]
    pub sell_or_rent: Option<SellOrRent>,

    #[serde(rename = "Condition", default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,

    #[serde(rename = "ResidentialAvailability", default, skip_serializing_if = "Option::is_none")]
    pub residential_availability: Option<ResidentialAvailability>,

    #[serde(rename = "CommercialAvailability", default, skip_serializing_if = "Option::is_none")]
    pub commercial_availability: Option<CommercialAvailability>,

    #[serde(rename = "Facing", default, skip_serializing_if = "Option::is_none")]
    pub facing: Option<Facing>,
}

impl RequirementPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.is_empty() {
            return Err("Update must contain at least one field".to_string());
        }
        if let Some(role) = &self.role {
            require_text("RequiredPersonRole", role)?;
        }
        if let Some(name) = &self.name {
            require_text("RequiredPersonName", name)?;
        }
        if let Some(phone) = &self.phone {
            require_text("RequiredPersonPhone", phone)?;
        }
        if let Some(details) = &self.property_details {
            details.validate()?;
        }
        if self.property_details.is_some() && self.sell_or_rent.is_some() {
            return Err(
                "SellRent cannot be combined with RequiredPropertyDetails".to_string(),
            );
        }
        Ok(())
    }
}

/// Outcome of a bulk update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdateSummary {
    pub matched_count: u64,
    pub modified_count: u64,
}

fn require_text(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} cannot be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> PropertyDetails {
        PropertyDetails {
            property_type: "Flat".to_string(),
            area_sqft: NumericRange::new(900.0, 1200.0),
            budget: NumericRange::new(4_000_000.0, 6_500_000.0),
            sell_or_rent: SellOrRent::Sell,
        }
    }

    fn record() -> RequirementRecord {
        let now = Utc::now();
        RequirementRecord {
            id: RequirementId::new(1),
            role: "Buyer".to_string(),
            name: "Asha".to_string(),
            phone: "9800000000".to_string(),
            email: "asha@example.com".to_string(),
            submitted_at: now,
            property_details: Some(details()),
            condition: Condition::default(),
            residential_availability: ResidentialAvailability::default(),
            commercial_availability: CommercialAvailability::default(),
            facing: Facing::default(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn flag_group_joins_enabled_names_in_vocabulary_order() {
        let facing = Facing {
            east: true,
            north: true,
            south_west: true,
            ..Facing::default()
        };
        assert_eq!(facing.joined(), "North, East, SouthWest");
        assert_eq!(Facing::default().joined(), "");
    }

    #[test]
    fn flag_group_accepts_wire_map() {
        let parsed: ResidentialAvailability =
            serde_json::from_str(r#"{"2BHK": true, "Villa": false}"#).unwrap();
        assert!(parsed.two_bhk);
        assert!(!parsed.villa);
        assert_eq!(parsed.joined(), "2BHK");
    }

    #[test]
    fn flag_group_rejects_unknown_names() {
        let parsed = serde_json::from_str::<Facing>(r#"{"Up": true}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn new_requirement_parses_frontend_payload() {
        let payload = serde_json::json!({
            "RequiredPersonRole": "Buyer",
            "RequiredPersonName": "Asha",
            "RequiredPersonPhone": "9800000000",
            "RequiredPersonEmail": "asha@example.com",
            "RequiredPropertyDetails": {
                "RequiredPropertyType": "Flat",
                "RequiredAreaSqft": { "min": 900, "max": 1200 },
                "RequiredBudget": { "min": 4000000, "max": 6500000 },
                "RequiredPropertySellOrRent": "Sell"
            },
            "Facing": { "North": true }
        });

        let parsed: NewRequirement = serde_json::from_value(payload).unwrap();
        assert!(parsed.validate().is_ok());
        assert!(parsed.submitted_at.is_none());
        assert!(parsed.facing.north);
        assert_eq!(parsed.property_details, details());
    }

    #[test]
    fn new_requirement_rejects_blank_name() {
        let mut parsed = NewRequirement {
            role: "Buyer".to_string(),
            name: "  ".to_string(),
            phone: "1".to_string(),
            email: String::new(),
            submitted_at: None,
            property_details: details(),
            condition: Condition::default(),
            residential_availability: ResidentialAvailability::default(),
            commercial_availability: CommercialAvailability::default(),
            facing: Facing::default(),
        };
        assert!(parsed.validate().is_err());

        parsed.name = "Asha".to_string();
        parsed.property_details.budget = NumericRange::new(-1.0, 10.0);
        assert!(parsed.validate().is_err());
    }

    #[test]
    fn patch_rejects_unknown_fields_and_empty_bodies() {
        assert!(serde_json::from_str::<RequirementPatch>(r#"{"Colour": "Red"}"#).is_err());

        let empty: RequirementPatch = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
        assert!(empty.validate().is_err());
    }

    #[test]
    fn record_serializes_with_wire_names() {
        let json = serde_json::to_value(record()).unwrap();
        assert_eq!(json["_id"], 1);
        assert_eq!(json["RequiredPersonName"], "Asha");
        assert_eq!(
            json["RequiredPropertyDetails"]["RequiredAreaSqft"]["max"],
            1200.0
        );
        assert_eq!(json["Facing"]["North"], false);
    }
}
