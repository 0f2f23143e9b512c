pub mod config;
pub mod serde;
