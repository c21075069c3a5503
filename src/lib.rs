//! Organize a directory's files into category folders by extension, with a
//! journaled undo trail. Also ships a small reader for VM inventory
//! exports under [`inventory`].

pub mod config;
pub mod error;
pub mod history;
pub mod inventory;
pub mod organize;
pub mod watch;

pub use config::Config;
pub use error::{AppError, Result};

use tracing_subscriber::EnvFilter;

/// Load `.env` and install the global tracing subscriber. Binaries call
/// this once at startup; `RUST_LOG` overrides the default filter.
pub fn init_logging() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,sortbox=info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
