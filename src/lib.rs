//! Canvas Click Recorder - record clicks on a canvas game, replay them.
//!
//! This is the main library crate. The engine (surface discovery, recording,
//! normalization, persistence and replay) is platform independent; the
//! `web` module wires it into a live page when built for wasm32 with the
//! `wasm` feature.

pub mod capture;
pub mod commands;
pub mod processing;
pub mod recorder;

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub mod web;

pub use capture::input::types::{PointerClick, RecordedPoint};
pub use recorder::{RecorderConfig, RecorderError, RecorderResult, RecordingSequence, Session};

/// Initialize tracing/logging for native hosts
#[cfg(not(target_arch = "wasm32"))]
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "canvas_click_recorder=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    tracing::info!("Canvas Click Recorder v{}", env!("CARGO_PKG_VERSION"));
}
