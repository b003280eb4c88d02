//! Domain types for the departure board.
//!
//! Station codes are validated at construction, so code that receives a
//! `Crs` can trust it.

mod departure;
mod station;

pub use departure::{Departure, StationBoard};
pub use station::{Crs, InvalidCrs};
