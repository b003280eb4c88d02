//! Board controller and its data.

mod controller;
mod data;

pub use controller::{BoardController, Frame};
pub use data::{DataState, StationData, UNKNOWN_STATION_NAME};
