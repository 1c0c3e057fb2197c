pub mod calculations;
pub mod db;
pub mod format;
pub mod models;
pub mod reminders;
pub mod reports;

pub use db::repository::{RentalRepository, RepositoryError};
pub use models::*;
