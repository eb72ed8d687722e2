pub mod auth;
pub mod dashboard;
pub mod ratings;
pub mod stores;
pub mod users;
