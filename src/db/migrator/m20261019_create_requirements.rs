use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Requirements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Requirements::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Requirements::PersonRole).string().not_null())
                    .col(ColumnDef::new(Requirements::PersonName).string().not_null())
                    .col(ColumnDef::new(Requirements::PersonPhone).string().not_null())
                    .col(
                        ColumnDef::new(Requirements::PersonEmail)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Requirements::SubmittedAt).string().not_null())
                    .col(ColumnDef::new(Requirements::PropertyType).string().null())
                    .col(ColumnDef::new(Requirements::AreaMin).double().null())
                    .col(ColumnDef::new(Requirements::AreaMax).double().null())
                    .col(ColumnDef::new(Requirements::BudgetMin).double().null())
                    .col(ColumnDef::new(Requirements::BudgetMax).double().null())
                    .col(ColumnDef::new(Requirements::SellOrRent).string().null())
                    .col(
                        ColumnDef::new(Requirements::Condition)
                            .text()
                            .not_null()
                            .default("{}"),
                    )
                    .col(
                        ColumnDef::new(Requirements::ResidentialAvailability)
                            .text()
                            .not_null()
                            .default("{}"),
                    )
                    .col(
                        ColumnDef::new(Requirements::CommercialAvailability)
                            .text()
                            .not_null()
                            .default("{}"),
                    )
                    .col(
                        ColumnDef::new(Requirements::Facing)
                            .text()
                            .not_null()
                            .default("{}"),
                    )
                    .col(ColumnDef::new(Requirements::CreatedAt).string().not_null())
                    .col(ColumnDef::new(Requirements::UpdatedAt).string().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Requirements::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Requirements {
    Table,
    Id,
    PersonRole,
    PersonName,
    PersonPhone,
    PersonEmail,
    SubmittedAt,
    PropertyType,
    AreaMin,
    AreaMax,
    BudgetMin,
    BudgetMax,
    SellOrRent,
    Condition,
    ResidentialAvailability,
    CommercialAvailability,
    Facing,
    CreatedAt,
    UpdatedAt,
}
