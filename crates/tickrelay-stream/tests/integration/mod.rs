//! Integration tests for tickrelay-stream.
//!
//! These tests drive real WebSocket sessions against an in-process stub:
//! - Subscription handshake and frame shape
//! - Last-trade updates flowing into the store
//! - Batch restart and shutdown behavior

pub mod common;
