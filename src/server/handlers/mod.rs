pub mod auth;
pub mod chat;
pub mod events;
pub mod home;
pub mod shared;
pub mod uploads;
