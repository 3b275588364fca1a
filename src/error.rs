//! Error types for the simulation's write paths.
//!
//! A small, specific error type at the boundary that network handlers
//! translate into a protocol-level response, rather than a single
//! catch-all `anyhow::Error` leaking into Modbus exception codes or HTTP
//! status lines.

use thiserror::Error;

/// Rejected `SimState::apply_control` call.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// The request named a signal outside the closed `SignalId` enumeration
    /// (e.g. an out-of-range Modbus address resolved to no entry).
    #[error("unknown control signal")]
    UnknownSignal,

    /// The request targeted a signal whose direction is read-only.
    #[error("signal is read-only")]
    ReadOnly,

    /// The numeric value fell outside the signal's declared range.
    #[error("value {value} out of range [{min}, {max}]")]
    OutOfRange { value: f64, min: f64, max: f64 },
}
