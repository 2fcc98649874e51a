pub mod audit;
pub mod auth;
pub mod file;
pub mod policy;
pub mod setting;
pub mod user;
