pub mod campaign;
pub mod candidate;
pub mod chat;
pub mod notification;
pub mod profile;
