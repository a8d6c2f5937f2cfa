//! Output module
//!
//! Publishes avatar frames to renderers over Server-Sent Events.

pub mod sse;
