pub mod company;
pub mod subdivision;

pub use company::Company;
pub use subdivision::Subdivision;
