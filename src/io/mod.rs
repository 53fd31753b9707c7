//! Output sinks: the CSV writer and the compression layer for file outputs.

pub mod compression;
pub mod csv;
