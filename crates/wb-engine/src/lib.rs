//! The Wordbound round engine.
//!
//! Sits on top of `wb-core`: scans boards for sentences, assigns
//! properties, resolves pushes recursively across nested boards, and runs
//! the fixed per-round effect pipeline. One [`Engine`] owns one
//! [`wb_core::Level`] and runs rounds against it; everything outside a
//! round (rendering, persistence, multi-level composition) belongs to the
//! caller.

/// Engine configuration with seeded randomness and resolution bounds.
pub mod config;
/// The engine and its per-round effect pipeline.
pub mod engine;
/// Round event records and the accumulating event log.
pub mod event;
/// Recursive push planning and move application.
pub mod resolve;
/// Round inputs and outcomes.
pub mod round;
/// Property propagation from derived rules.
pub mod rules;
/// The `Noun IS Noun` transform phase.
pub mod transform;

/// Re-export of the engine configuration.
pub use config::EngineConfig;
/// Re-export of the engine itself.
pub use engine::Engine;
/// Re-export of event types.
pub use event::{EventLog, RoundEvent, RoundEventKind};
/// Re-export of push planning types.
pub use resolve::{PlannedMove, Resolver};
/// Re-export of round input and outcome types.
pub use round::{Input, RoundOutcome};
/// Re-export of property propagation helpers.
pub use rules::{noun_matches, recompute_properties};
/// Re-export of transform phase types.
pub use transform::{TransformOutcome, apply_transforms};
