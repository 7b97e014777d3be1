use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let create_users_sql = r#"
            CREATE TABLE IF NOT EXISTS core_db.users (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                workspace_id UUID NOT NULL,
                email VARCHAR(255) NOT NULL UNIQUE,
                display_name VARCHAR(255),
                password TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#;

        manager
            .get_connection()
            .execute_unprepared(create_users_sql)
            .await?;

        // Only the SHA-256 digest of a key is stored; lookups are by exact digest.
        // NULL scopes grant nothing.
        let create_api_keys_sql = r#"
            CREATE TABLE IF NOT EXISTS core_db.api_keys (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                workspace_id UUID NOT NULL,
                user_id UUID REFERENCES core_db.users(id) ON DELETE SET NULL,
                name VARCHAR(255) NOT NULL,
                key_hash CHAR(64) NOT NULL UNIQUE,
                key_prefix VARCHAR(32) NOT NULL,
                environment VARCHAR(16) NOT NULL DEFAULT 'live',
                scopes JSONB,
                last_used_at TIMESTAMPTZ,
                expires_at TIMESTAMPTZ,
                revoked_at TIMESTAMPTZ,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#;

        manager
            .get_connection()
            .execute_unprepared(create_api_keys_sql)
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "CREATE INDEX IF NOT EXISTS idx_api_keys_workspace
                 ON core_db.api_keys(workspace_id, created_at DESC)",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS core_db.api_keys")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS core_db.users")
            .await?;

        Ok(())
    }
}
