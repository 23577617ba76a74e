//! Unit queries

pub mod list_available;

pub use list_available::ListAvailableUnitsQuery;
