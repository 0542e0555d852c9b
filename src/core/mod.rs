pub mod assistant;
pub mod booking;
pub mod catalog;
pub mod chat;
pub mod services;
pub mod traits;
