use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "requirements")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub person_role: String,

    pub person_name: String,

    pub person_phone: String,

    pub person_email: String,

    /// RFC 3339, UTC
    pub submitted_at: String,

    // Property details are nullable so rows imported from older clients load.
    pub property_type: Option<String>,
    pub area_min: Option<f64>,
    pub area_max: Option<f64>,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
    pub sell_or_rent: Option<String>,

    /// JSON map of flag name to bool
    #[sea_orm(column_type = "Text")]
    pub condition: String,

    #[sea_orm(column_type = "Text")]
    pub residential_availability: String,

    #[sea_orm(column_type = "Text")]
    pub commercial_availability: String,

    #[sea_orm(column_type = "Text")]
    pub facing: String,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
