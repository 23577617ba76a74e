//! Units feature module
//!
//! Upstream unit listing, bulk unit downloads and single-unit sync. A unit
//! download stores the unit row plus its elements and performance criteria.

pub mod queries;
pub mod routes;


pub use routes::units_routes;
