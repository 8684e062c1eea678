pub mod api;
pub mod coerce;
