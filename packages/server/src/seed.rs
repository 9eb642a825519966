use sea_orm::sea_query::{Index, PostgresQueryBuilder};
use sea_orm::*;
use tracing::info;

use crate::config::BootstrapAdminConfig;
use crate::entity::{admin, application, blog_post, profile};
use crate::extractors::auth::Role;
use crate::utils::hash;

/// Create the bootstrap admin (credential row + `super_admin` profile) if absent.
pub async fn seed_bootstrap_admin(
    db: &DatabaseConnection,
    bootstrap: &BootstrapAdminConfig,
) -> anyhow::Result<()> {
    let email = bootstrap.email.trim().to_lowercase();

    let existing = admin::Entity::find()
        .filter(admin::Column::Email.eq(&email))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(());
    }

    let id = uuid::Uuid::now_v7();
    let now = chrono::Utc::now();
    let password_hash = hash::hash_password(&bootstrap.password)?;

    let txn = db.begin().await?;

    admin::ActiveModel {
        id: Set(id),
        email: Set(email.clone()),
        password_hash: Set(password_hash),
        created_at: Set(now),
    }
    .insert(&txn)
    .await?;

    let profile = profile::Entity::find()
        .filter(profile::Column::Email.eq(&email))
        .one(&txn)
        .await?;
    if profile.is_none() {
        profile::ActiveModel {
            id: Set(id),
            email: Set(email.clone()),
            full_name: Set(None),
            role: Set(Role::SuperAdmin.as_str().to_string()),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;
    info!(email = %email, "Seeded bootstrap admin");
    Ok(())
}

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Admin application list: WHERE status = ? ORDER BY created_at DESC
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_application_status_created")
        .table(application::Entity)
        .col(application::Column::Status)
        .col(application::Column::CreatedAt)
        .to_string(PostgresQueryBuilder);
    create_index(db, "idx_application_status_created", &stmt).await;

    // Public blog list: WHERE status = 'published' AND deleted_at IS NULL ORDER BY published_at
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_blog_post_status_published")
        .table(blog_post::Entity)
        .col(blog_post::Column::Status)
        .col(blog_post::Column::PublishedAt)
        .to_string(PostgresQueryBuilder);
    create_index(db, "idx_blog_post_status_published", &stmt).await;

    Ok(())
}

async fn create_index(db: &DatabaseConnection, name: &str, stmt: &str) {
    match db.execute_unprepared(stmt).await {
        Ok(_) => info!("Ensured index {} exists", name),
        Err(e) => tracing::warn!("Failed to create index {}: {}", name, e),
    }
}
