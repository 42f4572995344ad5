pub mod batch;
pub mod coercion;
pub mod raw;
pub mod row;
