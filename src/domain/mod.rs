//! Domain primitives for the requirements subsystem.
//!
//! Newtypes and small enums shared by the store, the service layer and the
//! HTTP surface, so identifiers and listing intents cannot be mixed up.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned identifier of a requirement.
///
/// # Examples
///
/// ```rust
/// use milaniume::domain::RequirementId;
///
/// let id = RequirementId::new(42);
/// assert_eq!(id.value(), 42);
/// assert_eq!(id.to_string(), "42");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RequirementId(i32);

impl RequirementId {
    /// Creates a new `RequirementId` from a raw i32 value.
    ///
    /// # Panics
    ///
    /// Panics in debug mode if `id` is negative. Production code should validate
    /// before construction.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        debug_assert!(id >= 0, "RequirementId should be non-negative");
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for RequirementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<RequirementId> for i32 {
    fn from(id: RequirementId) -> Self {
        id.0
    }
}

impl From<i32> for RequirementId {
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}

impl Serialize for RequirementId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(self.0)
    }
}

impl<'de> Deserialize<'de> for RequirementId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let id = i32::deserialize(deserializer)?;
        Ok(Self::new(id))
    }
}

/// Whether the buyer wants to purchase or to rent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SellOrRent {
    Sell,
    Rent,
}

impl SellOrRent {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sell => "Sell",
            Self::Rent => "Rent",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Sell" => Some(Self::Sell),
            "Rent" => Some(Self::Rent),
            _ => None,
        }
    }
}

impl fmt::Display for SellOrRent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
