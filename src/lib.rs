//! Touch-free mouse control from a hand-landmark stream.
//!
//! Each frame's landmarks are mapped to mirrored pixel coordinates, the index
//! fingertip is smoothed and turned into relative pointer motion while the
//! thumb rests on the index knuckle, and thumb pinches become clicks. The
//! per-frame core ([`controller::GestureController`]) is pure: the caller owns
//! the [`tracking::TrackingState`] and threads it from frame to frame.
//!
//! ```
//! use handmouse::{
//!     controller::{GestureController, HandObservation},
//!     tracking::TrackingState,
//!     types::FrameSize,
//! };
//!
//! let controller = GestureController::default();
//! let (state, report) = controller.process_frame(
//!     TrackingState::new(),
//!     HandObservation::Absent,
//!     FrameSize::new(640.0, 480.0),
//! );
//! assert!(!state.is_tracking());
//! assert_eq!(report.label(), "No hand");
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod gesture;
pub mod hand;
pub mod input;
#[cfg(feature = "backend-ort")]
pub mod model_download;
pub mod pipeline;
pub mod tracking;
pub mod types;

pub use error::{Error, Result};
