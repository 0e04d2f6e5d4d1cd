//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the crate:
//! - Math types used for entity placement
//! - Handle collections backing the reference scene
//! - Logging utilities

pub mod math;
pub mod collections;
pub mod logging;
