// File I/O operations

pub mod export;
pub mod punch;
pub mod read;
pub mod sink;
