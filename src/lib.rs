pub mod config;
pub mod db;
pub mod error;
pub mod feed; // per-session message fan-out
pub mod identity;
pub mod messaging;
pub mod models;
pub mod onboarding;
pub mod referral;
pub mod session;
pub mod voice; // AI voice-processing service client

pub use error::ServiceError;
pub use identity::{CallerIdentity, IdentityProvider};

use tracing_subscriber::EnvFilter;

/// Initialize tracing for binaries embedding this crate.
/// RUST_LOG wins when set.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} core v{}", config::APP_NAME, config::APP_VERSION);
}
