//! # Domain Models
//!
//! Pure types shared by every crate in the workspace: the configuration model and the
//! static service domain registry. Keep it lean: no I/O, networking, or storage here.

pub mod config;
pub mod constants;
pub mod registry;
