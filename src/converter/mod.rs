//! Intermediate conversions that feed a generator.

pub mod xlsx2csv;
