pub mod admin_auth;
pub mod config;
pub mod db;
pub mod gateway;
pub mod intake;
pub mod logging;
pub mod payment;
