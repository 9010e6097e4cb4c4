//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and the 2D transform
//! - Tag-indexed handle collections
//! - Frame timing
//! - Logging setup

pub mod math;
pub mod collections;
pub mod time;
pub mod logging;
