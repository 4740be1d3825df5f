//! Sandbox simulation module
//!
//! Everything between raw input and the physics/render boundaries lives here:
//! - Seeded RNG only (one `Pcg32` per sandbox, one per stable preview)
//! - Stable iteration order (keys by ascending id)
//! - No platform dependencies; drawing goes through the `Canvas` trait

pub mod bounds;
pub mod builder;
pub mod calibration;
pub mod gesture;
pub mod key;
pub mod layout;
pub mod shape;
pub mod state;
pub mod tick;

pub use bounds::BoundaryManager;
pub use builder::{build_key_body, key_compound_desc};
pub use calibration::CalibrationController;
pub use gesture::{GestureController, GestureOutcome, GestureState, GrabLink, PointerId, Preview};
pub use key::{KeyEntity, draw_key_graphic};
pub use layout::{KeyLayout, LocalRect};
pub use shape::{Rgb, ShapeParameters, generate_key_params};
pub use state::{Sandbox, SandboxEvent};
pub use tick::{InputEvent, apply_event, tick};
