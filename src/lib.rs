#![doc(test(attr(deny(warnings))))]

//! Finvault keeps personal-finance records as human-readable text blocks
//! inside a note vault and derives queries, period summaries, and recurring
//! occurrence projections from them.

pub mod codec;
pub mod config;
pub mod errors;
pub mod events;
pub mod exchange;
pub mod period;
pub mod query;
pub mod records;
pub mod repository;
pub mod store;
pub mod summary;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Finvault tracing initialized.");
    });
}
