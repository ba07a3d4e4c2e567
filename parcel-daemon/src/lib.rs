pub mod config;
pub mod dispatch;
pub mod http;
pub mod telegram;
