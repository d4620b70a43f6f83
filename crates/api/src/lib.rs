pub mod background;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod refresher;
pub mod router;
pub mod routes;
pub mod state;
