//! Migration to create the connector_definitions table.
//!
//! Connector definitions are the catalog of third-party services users can
//! connect to. They carry no owner and are seeded at startup; the OAuth2
//! columns are only meaningful when auth_type is OAUTH2.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ConnectorDefinitions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ConnectorDefinitions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ConnectorDefinitions::Key).text().not_null())
                    .col(ColumnDef::new(ConnectorDefinitions::Name).text().not_null())
                    .col(
                        ColumnDef::new(ConnectorDefinitions::Description)
                            .text()
                            .null(),
                    )
                    .col(ColumnDef::new(ConnectorDefinitions::LogoUrl).text().null())
                    .col(
                        ColumnDef::new(ConnectorDefinitions::AuthType)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConnectorDefinitions::CredentialFieldsSchema)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ConnectorDefinitions::Oauth2ClientId)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ConnectorDefinitions::Oauth2Scopes)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ConnectorDefinitions::Oauth2AuthorizationUrl)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ConnectorDefinitions::Oauth2TokenUrl)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ConnectorDefinitions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ConnectorDefinitions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_connector_definitions_key")
                    .table(ConnectorDefinitions::Table)
                    .col(ConnectorDefinitions::Key)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_connector_definitions_key")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(ConnectorDefinitions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ConnectorDefinitions {
    Table,
    Id,
    Key,
    Name,
    Description,
    LogoUrl,
    AuthType,
    CredentialFieldsSchema,
    Oauth2ClientId,
    Oauth2Scopes,
    Oauth2AuthorizationUrl,
    Oauth2TokenUrl,
    CreatedAt,
    UpdatedAt,
}
