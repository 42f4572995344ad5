pub mod coercion;
