//! Two-party line chat over TCP.
//!
//! A server accepts one client at a time; both ends then type lines at each
//! other until one side goes away. Received text is uppercased on the
//! server before it is shown.

pub mod client;
pub mod config;
pub mod error;
pub mod interrupt;
pub mod line;
pub mod net;
pub mod server;
pub mod session;
pub mod terminal;
pub mod transform;
pub mod writer;

pub use config::{InputMode, Role, SessionConfig};
pub use error::{ChatError, Result};
pub use interrupt::Interrupt;
pub use server::Server;
pub use session::{Session, SessionReport};

/// Log to stderr at `info` unless `RUST_LOG` says otherwise; stdout carries
/// the conversation.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();
}
