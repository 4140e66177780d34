//! Report exports.

pub mod csv;
