//! # RO Plant Digital Twin
//!
//! A deterministic physics/damage simulation of a small reverse-osmosis
//! water treatment plant, exposed over Modbus TCP, Server-Sent Events, and
//! a small REST control surface, for ICS security training.
//!
//! ## Main components
//!
//! - **state**: the plant's control/process-variable/health model and the
//!   rules for applying a write to it
//! - **physics**: the deterministic per-tick simulation (targets, chemistry,
//!   damage, mass balance, publish jitter)
//! - **registers**: the Modbus coil/holding-register address map
//! - **modbus**: the Modbus TCP slave (`tokio_modbus::server::Service`)
//! - **http**: the SSE telemetry stream and `/sync` / `/reset_damage` routes
//! - **config**: CLI/environment configuration
//! - **daemon**: task orchestration and graceful shutdown

pub mod config;
pub mod daemon;
pub mod error;
pub mod http;
pub mod modbus;
pub mod physics;
pub mod registers;
pub mod state;
