#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Mass-spring simulation built on the stable-handle containers.
//!
//! Points, springs and polygons each live in a [`CompactMap`]. Springs name
//! their endpoints by [`PointRef`], so removing a point must also remove
//! the springs that reference it; [`Engine::remove_point`] does that.
//!
//! [`CompactMap`]: physenv_core::CompactMap

mod config;
mod engine;
mod error;
mod point;
mod polygon;
mod spring;
mod vec2;

pub use config::{EngineConfig, SoftBodyConfig};
pub use engine::{Engine, PointRef, PolygonRef, SpringRef};
pub use error::EngineError;
pub use point::Point;
pub use polygon::{Edge, Polygon};
pub use spring::Spring;
pub use vec2::Vec2;
