//! # Contracts
//!
//! Frozen interface contracts, defining inter-module data structures.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Timestamps are seconds (f64) on each stream's own clock
//! - A `TimeOffset` always names the stream whose clock it shifts

mod alignment_config;
mod error;
mod offset;
mod pose;
mod quaternion;

pub use alignment_config::*;
pub use error::*;
pub use offset::*;
pub use pose::*;
pub use quaternion::Quaternion;

/// Re-exported so downstream crates use the same vector type
pub use nalgebra::Vector3;
