//! Data Transfer Objects (DTOs) exchanged with the service.
//!
//! DTOs are organized by protocol:
//! - `rest`: login and session endpoints
//! - `websocket`: notification socket envelopes

pub mod rest;
pub mod websocket;
