//! Register map for the RO plant digital twin
//!
//! This module binds the symbolic control/PV signal names to their Modbus
//! coil and holding-register addresses, scale factors, and read/write
//! direction. The tables are the single source of truth for the Modbus
//! slave (`crate::modbus`) and are also used by the HTTP `/sync` handler to
//! validate the partial control payload it receives.
//!
//! Addresses are looked up by direct array indexing rather than a hash map:
//! the address space is small and dense (coils 0-9, holding 0-36), so a
//! `const` array indexed by address is both O(1) and avoids any runtime
//! construction cost.

use std::fmt;

/// A closed enumeration of every control and process-variable signal in the
/// plant, so an unknown key is a compile error rather than a runtime
/// lookup miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalId {
    // Boolean controls (coils 0-9)
    WellfieldOn,
    RoFeedPumpOn,
    DistPumpOn,
    Valve101Open,
    Valve201Open,
    Valve202Open,
    Valve203Open,
    Valve401Open,
    NaohPumpOn,
    ClPumpOn,

    // Numeric setpoints (holding 0-2, read/write)
    NaohDose,
    ClDose,
    QOutSp,

    // Process variables (holding 10-24, read-only)
    QWellfield,
    QFeed,
    QPerm,
    QBrine,
    QOut,
    LevelFeedTank,
    LevelClearwell,
    PressureWell,
    PressureFeed,
    PressureDist,
    DPRoTrue,
    TdsFeed,
    TdsPerm,
    PHTrue,
    ClTrue,

    // Health (holding 30-36, read-only)
    MembraneHealth,
    PumpWellHealth,
    PumpFeedHealth,
    PumpDistHealth,
    PipeWellHealth,
    PipeFeedHealth,
    PipeDistHealth,
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl SignalId {
    /// Map a `/sync` request's JSON key to the control signal it names.
    /// Only the writable signals (coils and the three setpoints) have a
    /// key; an unrecognized key returns `None` so the caller can reject
    /// the whole request rather than silently ignore a typo.
    pub fn from_control_key(key: &str) -> Option<SignalId> {
        use SignalId::*;
        Some(match key {
            "wellfield_on" => WellfieldOn,
            "ro_feed_pump_on" => RoFeedPumpOn,
            "dist_pump_on" => DistPumpOn,
            "valve_101_open" => Valve101Open,
            "valve_201_open" => Valve201Open,
            "valve_202_open" => Valve202Open,
            "valve_203_open" => Valve203Open,
            "valve_401_open" => Valve401Open,
            "naoh_pump_on" => NaohPumpOn,
            "cl_pump_on" => ClPumpOn,
            "NaOH_dose" => NaohDose,
            "Cl_dose" => ClDose,
            "Q_out_sp" => QOutSp,
            _ => return None,
        })
    }
}

/// Modbus entity kind a signal is exposed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterKind {
    Coil,
    Holding,
}

/// Read/write direction from the network's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Writable by a Modbus/HTTP client (controls and setpoints).
    Rw,
    /// Read-only from the network; a write attempt is a domain error.
    Ro,
}

/// One entry of the register map: the signal behind an address, its Modbus
/// kind, its integer scale divisor, and its direction.
#[derive(Debug, Clone, Copy)]
pub struct RegisterEntry {
    pub signal: SignalId,
    pub kind: RegisterKind,
    pub scale: u32,
    pub direction: Direction,
}

macro_rules! coil {
    ($signal:expr) => {
        Some(RegisterEntry {
            signal: $signal,
            kind: RegisterKind::Coil,
            scale: 1,
            direction: Direction::Rw,
        })
    };
}

macro_rules! holding {
    ($signal:expr, $scale:expr, $direction:expr) => {
        Some(RegisterEntry {
            signal: $signal,
            kind: RegisterKind::Holding,
            scale: $scale,
            direction: $direction,
        })
    };
}

/// Highest valid coil address (inclusive).
pub const MAX_COIL_ADDR: u16 = 9;
/// Highest valid holding-register address (inclusive).
pub const MAX_HOLDING_ADDR: u16 = 36;

/// `COIL_MAP[addr]` is `Some(entry)` for every address 0-9; all coils in
/// this plant are read/write.
const COIL_MAP: [Option<RegisterEntry>; (MAX_COIL_ADDR + 1) as usize] = [
    coil!(SignalId::WellfieldOn),
    coil!(SignalId::RoFeedPumpOn),
    coil!(SignalId::DistPumpOn),
    coil!(SignalId::Valve101Open),
    coil!(SignalId::Valve201Open),
    coil!(SignalId::Valve202Open),
    coil!(SignalId::Valve203Open),
    coil!(SignalId::Valve401Open),
    coil!(SignalId::NaohPumpOn),
    coil!(SignalId::ClPumpOn),
];

/// `HOLDING_MAP[addr]` is `Some(entry)` for every bound address;
/// `None` for the unused gaps (3-9 and 25-29) so an out-of-range read/write
/// there returns Modbus exception 02, matching every other invalid address.
const HOLDING_MAP: [Option<RegisterEntry>; (MAX_HOLDING_ADDR + 1) as usize] = [
    holding!(SignalId::NaohDose, 10, Direction::Rw),
    holding!(SignalId::ClDose, 10, Direction::Rw),
    holding!(SignalId::QOutSp, 1, Direction::Rw),
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    holding!(SignalId::QWellfield, 1, Direction::Ro),
    holding!(SignalId::QFeed, 1, Direction::Ro),
    holding!(SignalId::QPerm, 1, Direction::Ro),
    holding!(SignalId::QBrine, 1, Direction::Ro),
    holding!(SignalId::QOut, 1, Direction::Ro),
    holding!(SignalId::LevelFeedTank, 100, Direction::Ro),
    holding!(SignalId::LevelClearwell, 100, Direction::Ro),
    holding!(SignalId::PressureWell, 10, Direction::Ro),
    holding!(SignalId::PressureFeed, 10, Direction::Ro),
    holding!(SignalId::PressureDist, 10, Direction::Ro),
    holding!(SignalId::DPRoTrue, 100, Direction::Ro),
    holding!(SignalId::TdsFeed, 1, Direction::Ro),
    holding!(SignalId::TdsPerm, 1, Direction::Ro),
    holding!(SignalId::PHTrue, 100, Direction::Ro),
    holding!(SignalId::ClTrue, 100, Direction::Ro),
    None,
    None,
    None,
    None,
    None,
    holding!(SignalId::MembraneHealth, 10, Direction::Ro),
    holding!(SignalId::PumpWellHealth, 10, Direction::Ro),
    holding!(SignalId::PumpFeedHealth, 10, Direction::Ro),
    holding!(SignalId::PumpDistHealth, 10, Direction::Ro),
    holding!(SignalId::PipeWellHealth, 10, Direction::Ro),
    holding!(SignalId::PipeFeedHealth, 10, Direction::Ro),
    holding!(SignalId::PipeDistHealth, 10, Direction::Ro),
];

/// Look up the coil map entry at `addr`, if any. O(1) array index.
pub fn coil_at(addr: u16) -> Option<RegisterEntry> {
    COIL_MAP.get(addr as usize).copied().flatten()
}

/// Look up the holding-register map entry at `addr`, if any. O(1) array index.
pub fn holding_at(addr: u16) -> Option<RegisterEntry> {
    HOLDING_MAP.get(addr as usize).copied().flatten()
}

/// Encode an engineering value to its 16-bit Modbus wire representation
/// using the entry's scale (`wire = round(value * scale)`).
///
/// Returns `None` if the scaled value does not fit in a `u16`; negative or
/// overflowing values are rejected on write/read.
pub fn encode(value: f64, scale: u32) -> Option<u16> {
    let wire = (value * scale as f64).round();
    if wire < 0.0 || wire > u16::MAX as f64 {
        None
    } else {
        Some(wire as u16)
    }
}

/// Decode a 16-bit Modbus wire value back to its engineering value using
/// the entry's scale (`value = wire / scale`).
pub fn decode(wire: u16, scale: u32) -> f64 {
    wire as f64 / scale as f64
}
