//! # RelaxMax Core Library
//!
//! Core logic of the RelaxMax guided-breathing app. A host (mobile shell,
//! desktop window, test harness) renders a pulsing shape from the state this
//! library exposes and forwards user actions to it.
//!
//! ## Architecture
//!
//! - **Phase Driver**: maps a pattern to a looping tween sequence and a
//!   cancellable phase-boundary chain
//! - **Session Controller**: preparation countdown, session countdown,
//!   haptics and pattern hot-swap; a cooperative state machine driven by
//!   `advance_to(now_ms)`, no internal threads
//! - **Storage**: custom patterns as a JSON list in a key/value store,
//!   TOML configuration
//!
//! ## Key Components
//!
//! - [`PhaseDriver`]: pattern to animation and phase changes
//! - [`SessionController`]: session state machine
//! - [`BreathingApp`]: the entry points used by the presentation layer
//! - [`PatternStore`]: custom pattern persistence

pub mod animation;
pub mod app;
pub mod authoring;
pub mod catalogue;
pub mod driver;
pub mod error;
pub mod events;
pub mod haptics;
pub mod library;
pub mod logging;
pub mod pattern;
pub mod scheduler;
pub mod session;
pub mod storage;

pub use animation::{AnimatedValue, Easing, ProgressTracker, Transition};
pub use app::{BreathingApp, DisplayState};
pub use authoring::PatternDraft;
pub use driver::{total_cycle_duration, PhaseChain, PhaseChange, PhaseDriver};
pub use error::{CoreError, StorageError, ValidationError};
pub use events::{Event, StopReason};
pub use haptics::{HapticPattern, HapticSink, LogHaptics, RecordingHaptics};
pub use library::PatternLibrary;
pub use pattern::{Pattern, Phase, PhaseKind};
pub use scheduler::{Scheduler, TimerId};
pub use session::{Frame, SessionController, SessionMode, SessionState};
pub use storage::{Config, FileStore, KeyValueStore, MemoryStore, PatternStore};
