pub mod asset_filter;
pub mod classify;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod normalize;
pub mod output;
pub mod reserved;
pub mod resolver;
pub mod server;
pub mod timeout;
pub mod tree;
pub mod url_safety;
