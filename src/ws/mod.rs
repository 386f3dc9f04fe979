//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` streams committed wrapper events to
//! clients subscribed by topic and answers read-only commands.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
