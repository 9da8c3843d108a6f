// src/handlers/mod.rs

pub mod health;
pub mod posts;
pub mod preview;
