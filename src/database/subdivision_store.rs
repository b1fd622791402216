use sqlx::PgConnection;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::Subdivision;
use crate::path::LabelPath;

/// Errors from the subdivision store. Unique-constraint violations are
/// separated out so the service layer can surface them as domain conflicts;
/// everything else passes through unmodified.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// A pending path rewrite for one subdivision row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRewrite {
    pub id: i32,
    pub path: LabelPath,
}

/// Persistence operations over the `subdivision` table. Every function runs
/// on the caller's connection, so it participates in whatever transaction
/// the caller has open.
pub struct SubdivisionStore;

impl SubdivisionStore {
    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: i32,
    ) -> Result<Option<Subdivision>, StoreError> {
        let subdivision = sqlx::query_as::<_, Subdivision>(
            "SELECT id, name, path, company_id, manager_id, created_at, updated_at \
             FROM subdivision WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;
        Ok(subdivision)
    }

    pub async fn find_by_name(
        conn: &mut PgConnection,
        name: &str,
        company_id: Uuid,
    ) -> Result<Option<Subdivision>, StoreError> {
        let subdivision = sqlx::query_as::<_, Subdivision>(
            "SELECT id, name, path, company_id, manager_id, created_at, updated_at \
             FROM subdivision WHERE name = $1 AND company_id = $2",
        )
        .bind(name)
        .bind(company_id)
        .fetch_optional(conn)
        .await?;
        Ok(subdivision)
    }

    /// Path of the subdivision with the given name. Names form a single
    /// namespace per company, and paths are built from names alone, so the
    /// bare-name lookup is how an intended parent is resolved.
    pub async fn find_path_by_name(
        conn: &mut PgConnection,
        name: &str,
    ) -> Result<Option<LabelPath>, StoreError> {
        let path = sqlx::query_scalar::<_, LabelPath>(
            "SELECT path FROM subdivision WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(conn)
        .await?;
        Ok(path)
    }

    /// The node at `path` plus every node below it, ordered by path so that
    /// ancestors are always listed before their descendants.
    pub async fn find_descendants_inclusive(
        conn: &mut PgConnection,
        path: &LabelPath,
    ) -> Result<Vec<Subdivision>, StoreError> {
        let subdivisions = sqlx::query_as::<_, Subdivision>(
            "SELECT id, name, path, company_id, manager_id, created_at, updated_at \
             FROM subdivision \
             WHERE path = $1 OR starts_with(path, $1 || '.') \
             ORDER BY path",
        )
        .bind(path)
        .fetch_all(conn)
        .await?;
        Ok(subdivisions)
    }

    pub async fn insert(
        conn: &mut PgConnection,
        name: &str,
        company_id: Uuid,
        path: &LabelPath,
    ) -> Result<Subdivision, StoreError> {
        sqlx::query_as::<_, Subdivision>(
            "INSERT INTO subdivision (name, company_id, path) \
             VALUES ($1, $2, $3) \
             RETURNING id, name, path, company_id, manager_id, created_at, updated_at",
        )
        .bind(name)
        .bind(company_id)
        .bind(path)
        .fetch_one(conn)
        .await
        .map_err(|err| conflict_on_unique_violation(err, "subdivision name is taken"))
    }

    /// Update name and path of a single row atomically.
    pub async fn update_path(
        conn: &mut PgConnection,
        id: i32,
        new_name: &str,
        new_path: &LabelPath,
    ) -> Result<Subdivision, StoreError> {
        sqlx::query_as::<_, Subdivision>(
            "UPDATE subdivision SET name = $2, path = $3, updated_at = now() \
             WHERE id = $1 \
             RETURNING id, name, path, company_id, manager_id, created_at, updated_at",
        )
        .bind(id)
        .bind(new_name)
        .bind(new_path)
        .fetch_one(conn)
        .await
        .map_err(|err| conflict_on_unique_violation(err, "subdivision name is taken"))
    }

    /// Apply path rewrites one by one, in the order given. Callers pass the
    /// ancestors-first order produced by `find_descendants_inclusive`.
    pub async fn bulk_rewrite_paths(
        conn: &mut PgConnection,
        rewrites: &[PathRewrite],
    ) -> Result<(), StoreError> {
        for rewrite in rewrites {
            sqlx::query("UPDATE subdivision SET path = $2, updated_at = now() WHERE id = $1")
                .bind(rewrite.id)
                .bind(&rewrite.path)
                .execute(&mut *conn)
                .await?;
        }
        Ok(())
    }

    pub async fn delete_by_name(conn: &mut PgConnection, name: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM subdivision WHERE name = $1")
            .bind(name)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Point update of the manager reference; no path impact.
    pub async fn set_manager(
        conn: &mut PgConnection,
        id: i32,
        manager_id: Option<Uuid>,
    ) -> Result<Option<Subdivision>, StoreError> {
        let subdivision = sqlx::query_as::<_, Subdivision>(
            "UPDATE subdivision SET manager_id = $2, updated_at = now() \
             WHERE id = $1 \
             RETURNING id, name, path, company_id, manager_id, created_at, updated_at",
        )
        .bind(id)
        .bind(manager_id)
        .fetch_optional(conn)
        .await?;
        Ok(subdivision)
    }
}

fn conflict_on_unique_violation(err: sqlx::Error, message: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StoreError::Conflict(message.to_string())
        }
        _ => StoreError::Sqlx(err),
    }
}
