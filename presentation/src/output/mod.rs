//! Report and listing formatting

pub mod console;
pub mod formatter;
