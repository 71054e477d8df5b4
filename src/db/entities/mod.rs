//! SeaORM entities for the statically-shaped storage tables

pub mod association;
pub mod code;
pub mod nonce;
pub mod partial;
