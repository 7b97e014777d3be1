use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const CREATE_TYPES: [&str; 4] = [
    "CREATE TYPE core_db.integration_name AS ENUM ('airtable', 'gmail')",
    "CREATE TYPE core_db.integration_status AS ENUM ('active', 'paused', 'error', 'disconnected')",
    "CREATE TYPE core_db.sync_direction AS ENUM ('to_external', 'from_external', 'bidirectional')",
    "CREATE TYPE core_db.pitch_status AS ENUM ('draft', 'sent', 'replied')",
];

// Ordered so every referenced table exists first
const CREATE_TABLES: [&str; 6] = [
    r#"
    CREATE TABLE IF NOT EXISTS core_db.integration_connections (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        workspace_id UUID NOT NULL,
        integration_type core_db.integration_name NOT NULL,
        credentials JSONB NOT NULL DEFAULT '{}'::jsonb,
        settings JSONB NOT NULL DEFAULT '{}'::jsonb,
        status core_db.integration_status NOT NULL DEFAULT 'active',
        sync_enabled BOOLEAN NOT NULL DEFAULT TRUE,
        error_count INTEGER NOT NULL DEFAULT 0,
        error_message TEXT,
        last_sync_at TIMESTAMPTZ,
        sync_frequency_minutes INTEGER NOT NULL DEFAULT 15,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

        UNIQUE(workspace_id, integration_type)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS core_db.integration_sync_logs (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        connection_id UUID NOT NULL REFERENCES core_db.integration_connections(id) ON DELETE CASCADE,
        direction core_db.sync_direction NOT NULL,
        records_created INTEGER NOT NULL DEFAULT 0,
        records_updated INTEGER NOT NULL DEFAULT 0,
        records_failed INTEGER NOT NULL DEFAULT 0,
        errors JSONB NOT NULL DEFAULT '[]'::jsonb,
        duration_ms BIGINT NOT NULL DEFAULT 0,
        started_at TIMESTAMPTZ NOT NULL,
        completed_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS core_db.integration_activity_log (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        workspace_id UUID NOT NULL,
        connection_id UUID REFERENCES core_db.integration_connections(id) ON DELETE SET NULL,
        integration_type core_db.integration_name NOT NULL,
        action VARCHAR(64) NOT NULL,
        success BOOLEAN NOT NULL,
        records_affected INTEGER NOT NULL DEFAULT 0,
        error_message TEXT,
        metadata JSONB,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS core_db.workspace_contacts (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        workspace_id UUID NOT NULL,
        email VARCHAR(255) NOT NULL,
        name VARCHAR(255),
        company VARCHAR(255),
        job_title VARCHAR(255),
        tags JSONB NOT NULL DEFAULT '[]'::jsonb,
        metadata JSONB NOT NULL DEFAULT '{}'::jsonb,
        intel_contact_id UUID,
        pitch_contact_id UUID,
        tracker_contact_id UUID,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS core_db.pitches (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        workspace_id UUID NOT NULL,
        contact_id UUID REFERENCES core_db.workspace_contacts(id) ON DELETE SET NULL,
        to_email VARCHAR(255),
        subject TEXT,
        body TEXT NOT NULL,
        status core_db.pitch_status NOT NULL DEFAULT 'draft',
        sent_at TIMESTAMPTZ,
        replied_at TIMESTAMPTZ,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS core_db.gmail_tracked_emails (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        workspace_id UUID NOT NULL,
        connection_id UUID REFERENCES core_db.integration_connections(id) ON DELETE SET NULL,
        pitch_id UUID REFERENCES core_db.pitches(id) ON DELETE SET NULL,
        contact_id UUID REFERENCES core_db.workspace_contacts(id) ON DELETE SET NULL,
        gmail_message_id VARCHAR(255) NOT NULL UNIQUE,
        gmail_thread_id VARCHAR(255) NOT NULL,
        to_email VARCHAR(255) NOT NULL,
        subject TEXT NOT NULL,
        sent_at TIMESTAMPTZ NOT NULL,
        replied_at TIMESTAMPTZ,
        bounced BOOLEAN NOT NULL DEFAULT FALSE,
        last_checked_at TIMESTAMPTZ,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
];

const CREATE_INDEXES: [&str; 4] = [
    // One contact per address per workspace, compared case-insensitively
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_workspace_contacts_workspace_email
     ON core_db.workspace_contacts(workspace_id, LOWER(email))",
    "CREATE INDEX IF NOT EXISTS idx_integration_sync_logs_connection
     ON core_db.integration_sync_logs(connection_id, completed_at DESC)",
    "CREATE INDEX IF NOT EXISTS idx_integration_activity_log_workspace
     ON core_db.integration_activity_log(workspace_id, created_at DESC)",
    "CREATE INDEX IF NOT EXISTS idx_gmail_tracked_emails_awaiting_reply
     ON core_db.gmail_tracked_emails(workspace_id)
     WHERE replied_at IS NULL AND bounced = FALSE",
];

const DROP_TABLES: [&str; 6] = [
    "gmail_tracked_emails",
    "pitches",
    "workspace_contacts",
    "integration_activity_log",
    "integration_sync_logs",
    "integration_connections",
];

const DROP_TYPES: [&str; 4] = [
    "pitch_status",
    "sync_direction",
    "integration_status",
    "integration_name",
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        for sql in CREATE_TYPES.iter().chain(&CREATE_TABLES).chain(&CREATE_INDEXES) {
            db.execute_unprepared(sql).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        for table in DROP_TABLES {
            db.execute_unprepared(&format!("DROP TABLE IF EXISTS core_db.{table}"))
                .await?;
        }
        for type_name in DROP_TYPES {
            db.execute_unprepared(&format!("DROP TYPE IF EXISTS core_db.{type_name}"))
                .await?;
        }

        Ok(())
    }
}
