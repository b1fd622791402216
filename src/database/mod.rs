pub mod company_store;
pub mod manager;
pub mod models;
pub mod subdivision_store;

pub use manager::{DatabaseError, DatabaseManager};
