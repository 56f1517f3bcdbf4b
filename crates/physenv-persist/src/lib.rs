#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Plain-text save and load for a [`physenv_engine::Engine`].
//!
//! A saved engine has three sections, each starting with a fixed header
//! line and followed by one space separated row per object:
//!
//! ```text
//! point-id fixed posx posy velx vely mass color(rgba)
//! 0 1 0 0 0 0 1
//! 1 0 10 0 0 0 1
//! spring-id spring-const natural-length damping-factor point1 point2
//! 0 10 10 1 0 1
//! polygon-verts: x y ...
//! 0 0 10 0 10 1 0 1
//! ```
//!
//! Handles never reach the file. Points are numbered by row and springs
//! name their endpoints by those row numbers; loading maps rows back to
//! freshly issued handles.

mod decode;
mod encode;
mod error;
mod file;
mod format;

pub use decode::{decode_into, read_from};
pub use encode::{encode, write_to};
pub use error::PersistError;
pub use file::{load, save};
pub use format::{LoadMode, LoadReport, POINT_HEADER, POLYGON_HEADER, SPRING_HEADER, Sections};
