//! # Smart Bath Simulator
//!
//! A smart bathtub/shower fixture simulation library providing validated
//! pipe control, tub fill physics, autonomous safety shutoffs, water
//! quality monitoring, salt pump gating, and persistent user profiles.
//!
//! ## Features
//!
//! - **Validated pipe control**: per-pipe debit ceilings and a water
//!   temperature window, checked before any state changes
//! - **Fill simulation**: 1 Hz tick advancing the tub volume with inflow,
//!   drain, and clamping to `[0, capacity]`
//! - **Autonomous shutoffs**: capacity, water quality, and fill-target
//!   shutoffs run inside the tick and never depend on a caller
//! - **Bath preparation**: fill targets sized from body weight with a
//!   completion-time estimate
//! - **User profiles**: name-keyed profiles with active selection and
//!   flat-file persistence
//!
//! ## Quick Start
//!
//! ```rust
//! use bathsim::{BathController, PipeKind, ProfileStore, SimConfig};
//!
//! let mut controller = BathController::new(SimConfig::default(), ProfileStore::new());
//!
//! // Open the bath pipe and advance the simulation one second.
//! controller.set_pipe(PipeKind::Bath, true, Some(0.25), Some(38.0)).unwrap();
//! controller.tick();
//! assert!(controller.current_volume() > 0.0);
//! ```
//!
//! ## Architecture
//!
//! - [`controller`] - The lock-guarded control core and public API
//! - [`fixtures`] - Pipe, bathtub, quality, and salt sub-models
//! - [`validate`] - Pure bound checks run before mutation
//! - [`profile`] - Profile store and flat-file persistence
//! - [`protocol`] - TCP line protocol: commands, sensor frames, notifications
//! - [`config`] - Physical limits and process wiring
//! - [`error`] - Typed rejection kinds

#![deny(warnings)]
#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod controller;
pub mod error;
pub mod fixtures;
pub mod profile;
pub mod protocol;
pub mod validate;

// Re-export main public types for convenience
pub use config::{BathLimits, QualityBounds, SimConfig};
pub use controller::BathController;
pub use error::{ControlError, ControlResult};
pub use fixtures::{PipeKind, PipeState, WaterQuality};
pub use profile::{ProfileStore, UserProfile};
pub use protocol::{Command, CommandResponse, CommandType, Notification, SensorFrame};
