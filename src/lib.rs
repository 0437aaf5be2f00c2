//! Portfolio Chrome - interactive chrome for a single-page portfolio.
//!
//! Tracks scroll progress, the section currently in view and a smoothed
//! pointer follower, and exposes them as serializable snapshots for the
//! progress bar, dot navigation and custom cursor.

pub mod capture;
pub mod chrome;
pub mod config;
pub mod nav;
pub mod processing;
pub mod theme;
pub mod tracker;

pub use capture::{HeadlessHost, Host};
pub use chrome::{ChromeSnapshot, PageChrome};
pub use config::ChromeConfig;
pub use tracker::{
    PointerFollower, ScrollProgressTracker, SectionVisibilityTracker, Tracker, TrackerError,
    TrackerResult,
};

#[cfg(feature = "web")]
pub use capture::web::{PortfolioChrome, WebHost};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the default `portfolio_chrome=debug` filter. Calling
/// this more than once is harmless; later calls leave the first subscriber in
/// place.
pub fn init_tracing() {
    let result = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portfolio_chrome=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    if result.is_ok() {
        tracing::info!("Starting Portfolio Chrome v{}", env!("CARGO_PKG_VERSION"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_twice() {
        init_tracing();
        init_tracing();
    }
}
