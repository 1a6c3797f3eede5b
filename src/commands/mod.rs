//! Tauri command handlers (DTO boundary).

pub mod product;
pub mod ticket;
