pub mod chain;
pub mod decoder;
