//! Per-domain tool handlers.
//!
//! Every handler converts its failures into a [`crate::ToolResponse`] error
//! payload; nothing here propagates an `Err` to the dispatch loop.

pub mod device;
pub mod profiles;
pub mod recipes;
pub mod webpage;
