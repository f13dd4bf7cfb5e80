//! Migration to create the user_connections table.
//!
//! A user connection binds one owning user to one connector definition and
//! stores the opaque encrypted-credentials blob produced by the vault.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserConnections::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserConnections::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserConnections::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(UserConnections::ConnectorDefinitionId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserConnections::ConnectionName)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserConnections::EncryptedCredentials)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserConnections::ExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(UserConnections::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(UserConnections::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(UserConnections::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_connections_user_id")
                            .from(UserConnections::Table, UserConnections::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_connections_connector_definition_id")
                            .from(
                                UserConnections::Table,
                                UserConnections::ConnectorDefinitionId,
                            )
                            .to(ConnectorDefinitions::Table, ConnectorDefinitions::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_connections_user_id")
                    .table(UserConnections::Table)
                    .col(UserConnections::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_user_connections_user_id")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(UserConnections::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UserConnections {
    Table,
    Id,
    UserId,
    ConnectorDefinitionId,
    ConnectionName,
    EncryptedCredentials,
    ExpiresAt,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum ConnectorDefinitions {
    Table,
    Id,
}
