//! Look-at camera with switchable perspective/ortho projection, plus the
//! free-fly controller the demos use to move it.

mod freeview;
mod view;

pub use freeview::FreeviewController;
pub use view::{Camera, CameraConfig, ProjectionMode, Ray, OVERLAY_HEIGHT};
