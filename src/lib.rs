#![doc(test(attr(deny(warnings))))]

//! Triage Survey collects the financial-distress picture of an enterprise
//! (debts, assets, liquidation status and payment capacity) through a
//! six-section questionnaire, and renders the answers as a summary.

pub mod cli;
pub mod config;
pub mod errors;
pub mod survey;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Triage Survey tracing initialized.");
    });
}
