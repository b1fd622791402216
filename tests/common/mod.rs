// Shared helpers for the database-backed integration tests.
//
// The suite needs a reachable Postgres with DATABASE_URL set (a .env file
// works). When no database is available every test skips cleanly, so the
// unit-test half of the crate still runs everywhere.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use orgtree::auth::{AuthUser, UserRole};
use orgtree::database::models::Company;
use orgtree::database::DatabaseManager;

/// Connect and migrate, or `None` when the environment has no database.
/// Each test gets its own pool; tokio tests run on separate runtimes, so a
/// shared pool would outlive the reactor that opened its connections.
pub async fn try_pool() -> Option<PgPool> {
    let pool = match DatabaseManager::connect().await {
        Ok(pool) => pool,
        Err(err) => {
            eprintln!("skipping: database unreachable: {}", err);
            return None;
        }
    };

    if let Err(err) = DatabaseManager::run_migrations(&pool).await {
        eprintln!("skipping: migrations failed: {}", err);
        return None;
    }
    if let Err(err) = DatabaseManager::health_check(&pool).await {
        eprintln!("skipping: health check failed: {}", err);
        return None;
    }

    Some(pool)
}

/// Insert a company with a unique name and return it.
pub async fn create_company(pool: &PgPool) -> Result<Company> {
    let name = unique_label("acme");
    let company = sqlx::query_as::<_, Company>(
        "INSERT INTO company (company_name) VALUES ($1) \
         RETURNING id, company_name, created_at, updated_at",
    )
    .bind(&name)
    .fetch_one(pool)
    .await
    .context("failed to insert test company")?;
    Ok(company)
}

/// An admin belonging to the given company.
pub fn admin_of(company_id: Uuid) -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        company_id,
        role: UserRole::Admin,
    }
}

/// A non-admin member of the given company.
#[allow(dead_code)]
pub fn member_of(company_id: Uuid) -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        company_id,
        role: UserRole::Member,
    }
}

/// Subdivision names share one namespace per database, so each test suffixes
/// its labels to stay out of the others' way.
pub fn unique_label(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

pub async fn count_subdivisions(pool: &PgPool, company_id: Uuid) -> Result<i64> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM subdivision WHERE company_id = $1")
            .bind(company_id)
            .fetch_one(pool)
            .await?;
    Ok(count)
}
