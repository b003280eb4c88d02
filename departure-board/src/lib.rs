//! Railway departure board.
//!
//! Drives an always-on display of live departures for one station:
//! a weekly schedule decides when departures, a clock/welcome screen, or
//! nothing at all is shown, and each departure is graded by how slow its
//! route is.

pub mod board;
pub mod classify;
pub mod config;
pub mod domain;
pub mod schedule;
pub mod source;
