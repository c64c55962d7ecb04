//! Entity storage for games built on the engine.

mod registry;

pub use registry::{CommitReport, Handle, Registry, Step};
