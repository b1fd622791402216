use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::path::LabelPath;

/// One node of a company's subdivision tree. `path` is the materialized
/// label path from the root down to this node; `name` is always its last
/// label.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subdivision {
    pub id: i32,
    pub name: String,
    pub path: LabelPath,
    pub company_id: Uuid,
    pub manager_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
