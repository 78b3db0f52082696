//! Shared test fixtures for the gantry workspace.
//!
//! This crate provides standardised doubles to eliminate duplication
//! across crate test suites. It is a dev-dependency only — never published.
//!
//! # Modules
//!
//! - [`workspace`] — [`TestWorkspace`] host fixture and ecosystem plugin
//!   simulation
//! - [`engine`] — scripted [`FakeEngine`] and the [`RecordingSink`] log
//!   capture
//! - [`extensions`] — canned build extensions with known behavior

pub mod engine;
pub mod extensions;
pub mod workspace;

pub use engine::{FakeEngine, RecordedBuild, RecordingSink};
pub use extensions::{FailingExtension, LabelChainExtension};
pub use workspace::{TestWorkspace, apply_host_plugin};

/// Install a fmt subscriber honoring `RUST_LOG`, once per process.
///
/// Safe to call from every test; later calls are no-ops.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
