pub use entity::{
    api_keys, gmail_tracked_emails, integration_activity_log, integration_connections,
    integration_name, integration_status, integration_sync_logs, pitch_status, pitches,
    sync_direction, users, workspace_contacts, Id,
};

pub mod api_key;
pub mod error;
pub mod integration_activity;
pub mod integration_connection;
pub mod integration_sync_log;
pub mod pitch;
pub mod tracked_email;
pub mod user;
pub mod workspace_contact;

use chrono::Utc;
use log::info;
use sea_orm::ConnectionTrait;

/// Workspace the development users are seeded into.
pub const SEED_WORKSPACE_ID: Id = Id::from_u128(0x5eed_0000_0000_4000_8000_0000_0000_0001);

/// Inserts the development users. Users whose email already exists are
/// skipped so the seed can be re-run against a live database.
pub async fn seed_database(db: &impl ConnectionTrait) -> Result<Vec<users::Model>, error::Error> {
    let seeds = [
        ("admin@core-db.dev", "Admin User", "dLxNxnjn&b!2sqkwFbb4s8jX"),
        ("booker@core-db.dev", "Booker", "password"),
    ];

    let mut created = Vec::with_capacity(seeds.len());
    for (email, display_name, password) in seeds {
        if user::find_by_email(db, email).await?.is_some() {
            info!("Seed user {email} already exists, skipping");
            continue;
        }

        let now = Utc::now();
        let model = user::create(
            db,
            users::Model {
                id: Id::new_v4(),
                workspace_id: SEED_WORKSPACE_ID,
                email: email.to_owned(),
                display_name: Some(display_name.to_owned()),
                password: password.to_owned(),
                created_at: now.into(),
                updated_at: now.into(),
            },
        )
        .await?;
        info!("Seeded user {}", model.email);
        created.push(model);
    }

    Ok(created)
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn seeded_user(email: &str) -> users::Model {
        let now = Utc::now();
        users::Model {
            id: Id::new_v4(),
            workspace_id: SEED_WORKSPACE_ID,
            email: email.to_string(),
            display_name: None,
            password: "hash".to_string(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn seed_database_skips_existing_users() -> Result<(), error::Error> {
        let booker = seeded_user("booker@core-db.dev");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // admin lookup finds an existing row
            .append_query_results(vec![vec![seeded_user("admin@core-db.dev")]])
            // booker lookup finds nothing, then the insert returns the new row
            .append_query_results::<users::Model, Vec<users::Model>, _>(vec![vec![]])
            .append_query_results(vec![vec![booker.clone()]])
            .into_connection();

        let created = seed_database(&db).await?;

        assert_eq!(created.len(), 1);
        assert_eq!(created[0].email, booker.email);
        assert_eq!(db.into_transaction_log().len(), 3);
        Ok(())
    }
}
