//! Modbus TCP slave.
//!
//! A single [`PlantModbusServer`] instance is shared by every accepted
//! connection (the plant has exactly one logical process to expose, so
//! there is no per-connection state to isolate) and reads/writes go
//! straight through the register map in `crate::registers` against the
//! shared `Arc<RwLock<SimState>>`.

use std::future;
use std::sync::Arc;

use log::{debug, error};
use tokio::sync::RwLock;
use tokio_modbus::prelude::*;

use crate::registers::{self, Direction, RegisterKind, MAX_COIL_ADDR, MAX_HOLDING_ADDR};
use crate::state::{ControlValue, SimState};

/// Modbus TCP slave serving the plant's coils and holding registers.
///
/// Implements [`tokio_modbus::server::Service`] for function codes 01, 03,
/// 05, 06, 15, 16. Any other function code is `ExceptionCode::IllegalFunction`;
/// any address outside the declared map, or a write to a read-only
/// register, is `ExceptionCode::IllegalDataAddress`; a write to a writable
/// register with a value outside its declared range is
/// `ExceptionCode::IllegalDataValue`.
pub struct PlantModbusServer {
    state: Arc<RwLock<SimState>>,
}

impl PlantModbusServer {
    pub fn new(state: Arc<RwLock<SimState>>) -> Self {
        Self { state }
    }
}

impl tokio_modbus::server::Service for PlantModbusServer {
    type Request = Request<'static>;
    type Response = Response;
    type Exception = ExceptionCode;
    type Future = future::Ready<Result<Self::Response, Self::Exception>>;

    fn call(&self, req: Self::Request) -> Self::Future {
        debug!("modbus request: {req:?}");
        let state = Arc::clone(&self.state);

        let res = match req {
            Request::ReadCoils(addr, cnt) => {
                read_coils(&state, addr, cnt).map(Response::ReadCoils)
            }
            Request::ReadHoldingRegisters(addr, cnt) => {
                read_holding(&state, addr, cnt).map(Response::ReadHoldingRegisters)
            }
            Request::WriteSingleCoil(addr, value) => write_single_coil(&state, addr, value)
                .map(|_| Response::WriteSingleCoil(addr, value)),
            Request::WriteSingleRegister(addr, value) => {
                write_single_register(&state, addr, value)
                    .map(|_| Response::WriteSingleRegister(addr, value))
            }
            Request::WriteMultipleCoils(addr, values) => {
                let cnt = values.len() as u16;
                write_multiple_coils(&state, addr, &values)
                    .map(|_| Response::WriteMultipleCoils(addr, cnt))
            }
            Request::WriteMultipleRegisters(addr, values) => {
                write_multiple_registers(&state, addr, &values)
                    .map(|_| Response::WriteMultipleRegisters(addr, values.len() as u16))
            }
            _ => {
                error!("unsupported modbus function code in request: {req:?}");
                Err(ExceptionCode::IllegalFunction)
            }
        };

        if let Err(e) = &res {
            error!("modbus request rejected: {e:?}");
        }

        future::ready(res)
    }
}

/// Blocking read of the current state via `try_read`. The shared state is
/// only ever held for the brief duration of a physics tick or a control
/// write, so a Modbus request competing for the lock resolves quickly;
/// falling back to a blocking `blocking_read` would stall the whole Tokio
/// worker, so a request that truly loses the race is refused instead of
/// blocked on.
fn snapshot(state: &Arc<RwLock<SimState>>) -> Option<SimState> {
    state.try_read().ok().map(|guard| guard.clone())
}

fn read_coils(state: &Arc<RwLock<SimState>>, addr: u16, cnt: u16) -> Result<Vec<bool>, ExceptionCode> {
    if addr.checked_add(cnt).map_or(true, |end| end > MAX_COIL_ADDR + 1) {
        return Err(ExceptionCode::IllegalDataAddress);
    }
    let snap = snapshot(state).ok_or(ExceptionCode::ServerDeviceBusy)?;
    let mut values = Vec::with_capacity(cnt as usize);
    for offset in 0..cnt {
        let entry = registers::coil_at(addr + offset).ok_or(ExceptionCode::IllegalDataAddress)?;
        values.push(read_bool_signal(&snap, entry.signal));
    }
    Ok(values)
}

fn read_holding(state: &Arc<RwLock<SimState>>, addr: u16, cnt: u16) -> Result<Vec<u16>, ExceptionCode> {
    if addr
        .checked_add(cnt)
        .map_or(true, |end| end > MAX_HOLDING_ADDR + 1)
    {
        return Err(ExceptionCode::IllegalDataAddress);
    }
    let snap = snapshot(state).ok_or(ExceptionCode::ServerDeviceBusy)?;
    let mut values = Vec::with_capacity(cnt as usize);
    for offset in 0..cnt {
        let entry = registers::holding_at(addr + offset).ok_or(ExceptionCode::IllegalDataAddress)?;
        let value = read_numeric_signal(&snap, entry.signal);
        let wire = registers::encode(value, entry.scale).ok_or(ExceptionCode::IllegalDataAddress)?;
        values.push(wire);
    }
    Ok(values)
}

fn write_single_coil(state: &Arc<RwLock<SimState>>, addr: u16, value: bool) -> Result<(), ExceptionCode> {
    let entry = registers::coil_at(addr).ok_or(ExceptionCode::IllegalDataAddress)?;
    apply_write(state, entry.direction, entry.signal, ControlValue::Bool(value))
}

fn write_multiple_coils(
    state: &Arc<RwLock<SimState>>,
    addr: u16,
    values: &[bool],
) -> Result<(), ExceptionCode> {
    for (offset, value) in values.iter().enumerate() {
        write_single_coil(state, addr + offset as u16, *value)?;
    }
    Ok(())
}

fn write_single_register(
    state: &Arc<RwLock<SimState>>,
    addr: u16,
    value: u16,
) -> Result<(), ExceptionCode> {
    let entry = registers::holding_at(addr).ok_or(ExceptionCode::IllegalDataAddress)?;
    let engineering = registers::decode(value, entry.scale);
    apply_write(state, entry.direction, entry.signal, ControlValue::Number(engineering))
}

fn write_multiple_registers(
    state: &Arc<RwLock<SimState>>,
    addr: u16,
    values: &[u16],
) -> Result<(), ExceptionCode> {
    for (offset, value) in values.iter().enumerate() {
        write_single_register(state, addr + offset as u16, *value)?;
    }
    Ok(())
}

fn apply_write(
    state: &Arc<RwLock<SimState>>,
    direction: Direction,
    signal: crate::registers::SignalId,
    value: ControlValue,
) -> Result<(), ExceptionCode> {
    if direction == Direction::Ro {
        return Err(ExceptionCode::IllegalDataAddress);
    }
    let mut guard = state.try_write().map_err(|_| ExceptionCode::ServerDeviceBusy)?;
    guard.apply_control(signal, value).map_err(|e| match e {
        crate::error::ControlError::OutOfRange { .. } => ExceptionCode::IllegalDataValue,
        crate::error::ControlError::UnknownSignal | crate::error::ControlError::ReadOnly => {
            ExceptionCode::IllegalDataAddress
        }
    })
}

/// Read a boolean control signal out of a snapshot. Only called for
/// `SignalId`s the coil map actually contains, all of which are controls.
fn read_bool_signal(snap: &SimState, signal: crate::registers::SignalId) -> bool {
    use crate::registers::SignalId::*;
    match signal {
        WellfieldOn => snap.controls.wellfield_on,
        RoFeedPumpOn => snap.controls.ro_feed_pump_on,
        DistPumpOn => snap.controls.dist_pump_on,
        Valve101Open => snap.controls.valve_101_open,
        Valve201Open => snap.controls.valve_201_open,
        Valve202Open => snap.controls.valve_202_open,
        Valve203Open => snap.controls.valve_203_open,
        Valve401Open => snap.controls.valve_401_open,
        NaohPumpOn => snap.controls.naoh_pump_on,
        ClPumpOn => snap.controls.cl_pump_on,
        other => unreachable!("{other} is not a coil-mapped signal"),
    }
}

/// Read a numeric signal (setpoint, PV, or health scalar) out of a
/// snapshot, for every `SignalId` the holding map can name.
fn read_numeric_signal(snap: &SimState, signal: crate::registers::SignalId) -> f64 {
    use crate::registers::SignalId::*;
    match signal {
        NaohDose => snap.controls.naoh_dose,
        ClDose => snap.controls.cl_dose,
        QOutSp => snap.controls.q_out_sp,

        QWellfield => snap.published.q_wellfield,
        QFeed => snap.published.q_feed,
        QPerm => snap.published.q_perm,
        QBrine => snap.published.q_brine,
        QOut => snap.published.q_out,
        LevelFeedTank => snap.published.level_feed_tank,
        LevelClearwell => snap.published.level_clearwell,
        PressureWell => snap.published.pressure_well,
        PressureFeed => snap.published.pressure_feed,
        PressureDist => snap.published.pressure_dist,
        DPRoTrue => snap.published.dp_ro_true,
        TdsFeed => snap.published.tds_feed,
        TdsPerm => snap.published.tds_perm,
        PHTrue => snap.published.ph_true,
        ClTrue => snap.published.cl_true,

        MembraneHealth => snap.health.membrane_health,
        PumpWellHealth => snap.health.pump_well_health,
        PumpFeedHealth => snap.health.pump_feed_health,
        PumpDistHealth => snap.health.pump_dist_health,
        PipeWellHealth => snap.health.pipe_well_health,
        PipeFeedHealth => snap.health.pipe_feed_health,
        PipeDistHealth => snap.health.pipe_dist_health,

        other => unreachable!("{other} is not a holding-mapped signal"),
    }
}
