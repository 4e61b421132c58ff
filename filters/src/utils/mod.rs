//! Utility functions

pub mod sql;
pub mod time;
