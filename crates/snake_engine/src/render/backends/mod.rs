//! Backend implementations for the render module
//!
//! Window and GPU context creation live outside the engine; the recording
//! backend covers headless runs and tests.

pub mod recording;

pub use recording::{DrawCommand, RecordingBackend};
