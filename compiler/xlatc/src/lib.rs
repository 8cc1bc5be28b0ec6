//! Batch driver for the xlat translator.
//!
//! A [`Session`] translates a batch of resolved compilation units:
//!
//! 1. Every unit's type names are registered in one [`NameTable`], and one
//!    [`TypeIndex`] is built over the whole batch.
//! 2. Units are translated in parallel. Results keep input order.
//! 3. A structural error fails only its unit. An internal error aborts the
//!    batch with [`BatchError::Internal`].
//! 4. In combined mode the surviving types are ordered across units and
//!    written into one header/implementation pair.
//!
//! # Tracing
//!
//! Call [`init_tracing`] once at startup. Output is enabled by `RUST_LOG`
//! (`RUST_LOG=xlat_codegen=debug`); `XLAT_TRACE_TREE=1` prints spans as an
//! indented tree instead of flat lines.
//!
//! [`NameTable`]: xlat_codegen::NameTable
//! [`TypeIndex`]: xlat_codegen::TypeIndex

mod combine;
mod session;

use std::sync::Once;

pub use combine::{CombineMode, HeaderMapping, MappingError};
pub use session::{BatchError, BatchOutput, Session, UnitOutcome};

static TRACING_INIT: Once = Once::new();

/// Install the tracing subscriber. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let filter = EnvFilter::from_default_env();
        let tree = std::env::var("XLAT_TRACE_TREE").is_ok_and(|v| v == "1");
        if tree {
            tracing_subscriber::registry()
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_bracketed_fields(true),
                )
                .with(filter)
                .init();
        } else {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
