pub mod cell;
pub mod engine;
pub mod line_buffer;
pub mod message;
pub mod reporter;
pub mod script;
pub mod table;
