pub mod client;
pub mod database;
pub mod entities;
pub mod gemini;
pub mod repositories;
pub mod settings;
pub mod traits;
