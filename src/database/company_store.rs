use sqlx::PgConnection;
use uuid::Uuid;

use crate::database::models::Company;
use crate::database::subdivision_store::StoreError;

/// Company lookup consumed by the hierarchy service. Runs on the caller's
/// connection like the subdivision store; the wider company CRUD lives
/// outside this crate.
pub struct CompanyStore;

impl CompanyStore {
    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<Company>, StoreError> {
        let company = sqlx::query_as::<_, Company>(
            "SELECT id, company_name, created_at, updated_at FROM company WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;
        Ok(company)
    }
}
