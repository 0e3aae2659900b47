pub mod catalog;
pub mod listen;
pub mod record;
