pub use super::requirements::Entity as Requirements;
