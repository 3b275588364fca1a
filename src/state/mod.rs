//! Simulation state: the single source of truth for the plant model.
//!
//! `SimState` bundles the actuated [`Controls`], the integrated physics
//! variables, and persistent equipment [`Health`]. It is the value the
//! daemon wraps in `Arc<tokio::sync::RwLock<SimState>>`: the tick driver
//! takes the write lock for one integration step, network handlers take
//! the write lock only to mutate controls, and readers clone a
//! [`Snapshot`] under a read lock and serialize it after releasing the
//! lock.

pub mod controls;
pub mod health;

pub use controls::Controls;
pub use health::Health;

use crate::error::ControlError;
use crate::registers::SignalId;

/// Integrated physics variables: flows, pressures, tank levels, and water
/// chemistry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsVars {
    pub q_wellfield: f64,
    pub q_feed: f64,
    pub q_out: f64,
    pub q_perm: f64,
    pub q_brine: f64,

    pub pressure_well: f64,
    pub pressure_feed: f64,
    pub pressure_dist: f64,
    pub dp_ro_true: f64,

    pub level_feed_tank: f64,
    pub level_clearwell: f64,

    pub tds_feed: f64,
    pub tds_perm: f64,
    pub ph_true: f64,
    pub cl_true: f64,

    /// Seconds elapsed since process start; advances by `dt` every tick.
    /// Used as the phase variable for the slow TDS_feed sinusoid and
    /// reported verbatim in SSE events.
    pub time_s: f64,
}

impl Default for PhysicsVars {
    fn default() -> Self {
        Self {
            q_wellfield: 0.0,
            q_feed: 0.0,
            q_out: 0.0,
            q_perm: 0.0,
            q_brine: 0.0,
            pressure_well: 0.0,
            pressure_feed: 0.0,
            pressure_dist: 0.0,
            dp_ro_true: 0.0,
            level_feed_tank: 2.5,
            level_clearwell: 3.0,
            tds_feed: 1250.0,
            tds_perm: 0.0,
            ph_true: 7.2,
            cl_true: 0.0,
            time_s: 0.0,
        }
    }
}

/// The value carried by a control write, independent of wire encoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlValue {
    Bool(bool),
    Number(f64),
}

/// The single logical record of plant state.
///
/// `vars` is the integrated, noise-free physics state the next tick's math
/// depends on. `published` is a separate jittered copy of the same process
/// variables, refreshed once per tick, that Modbus reads, `/sync`
/// responses, and SSE events all read from, so jitter is visible to
/// clients but never feeds back into `vars`.
#[derive(Debug, Clone, PartialEq)]
pub struct SimState {
    pub controls: Controls,
    pub vars: PhysicsVars,
    pub published: PhysicsVars,
    pub health: Health,
}

impl Default for SimState {
    fn default() -> Self {
        Self {
            controls: Controls::default(),
            vars: PhysicsVars::default(),
            published: PhysicsVars::default(),
            health: Health::default(),
        }
    }
}

/// A consistent, owned copy of plant state for publication (Modbus reads,
/// SSE events, `/sync` responses). Cloning `SimState` under the lock and
/// serializing afterwards is what keeps register reads and SSE pushes free
/// of torn reads without holding the lock during I/O.
pub type Snapshot = SimState;

impl SimState {
    /// Validate, clamp, and apply a single control write.
    ///
    /// Returns [`ControlError::ReadOnly`] for any signal whose register-map
    /// direction is `Ro` (all process variables and health), and
    /// [`ControlError::OutOfRange`] for a numeric setpoint outside its
    /// declared range. Boolean controls have no range to violate.
    pub fn apply_control(
        &mut self,
        signal: SignalId,
        value: ControlValue,
    ) -> Result<(), ControlError> {
        use ControlValue::*;
        use SignalId::*;

        match (signal, value) {
            (WellfieldOn, Bool(v)) => self.controls.wellfield_on = v,
            (RoFeedPumpOn, Bool(v)) => self.controls.ro_feed_pump_on = v,
            (DistPumpOn, Bool(v)) => self.controls.dist_pump_on = v,
            (Valve101Open, Bool(v)) => self.controls.valve_101_open = v,
            (Valve201Open, Bool(v)) => self.controls.valve_201_open = v,
            (Valve202Open, Bool(v)) => self.controls.valve_202_open = v,
            (Valve203Open, Bool(v)) => self.controls.valve_203_open = v,
            (Valve401Open, Bool(v)) => self.controls.valve_401_open = v,
            (NaohPumpOn, Bool(v)) => self.controls.naoh_pump_on = v,
            (ClPumpOn, Bool(v)) => self.controls.cl_pump_on = v,

            (NaohDose, Number(v)) => {
                self.controls.naoh_dose = clamp_range(v, controls::NAOH_DOSE_RANGE)?;
            }
            (ClDose, Number(v)) => {
                self.controls.cl_dose = clamp_range(v, controls::CL_DOSE_RANGE)?;
            }
            (QOutSp, Number(v)) => {
                self.controls.q_out_sp = clamp_range(v, controls::Q_OUT_SP_RANGE)?;
            }

            // Any read-only signal (PVs, health), or a value of the wrong
            // shape for its signal (e.g. a Number written to a coil).
            _ => return Err(ControlError::ReadOnly),
        }
        Ok(())
    }

    /// Return a consistent, owned copy for publication.
    pub fn snapshot(&self) -> Snapshot {
        self.clone()
    }
}

/// Clamp `v` into `range`, rejecting negative or overflowing values.
/// `Q_out_sp` accepts any write within its own declared range here; the
/// tighter distribution-pump capacity limit is applied separately at
/// physics-use time, not on write.
fn clamp_range(v: f64, (min, max): (f64, f64)) -> Result<f64, ControlError> {
    if !v.is_finite() || v < min || v > max {
        Err(ControlError::OutOfRange { value: v, min, max })
    } else {
        Ok(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_plant_startup_state() {
        let s = SimState::default();
        assert!(!s.controls.wellfield_on);
        assert!(s.controls.valve_101_open);
        assert!(s.controls.valve_401_open);
        assert_eq!(s.vars.level_feed_tank, 2.5);
        assert_eq!(s.vars.level_clearwell, 3.0);
        assert_eq!(s.health.membrane_health, 100.0);
    }

    #[test]
    fn apply_control_rejects_read_only_signal() {
        let mut s = SimState::default();
        let err = s
            .apply_control(SignalId::LevelFeedTank, ControlValue::Number(1.0))
            .unwrap_err();
        assert_eq!(err, ControlError::ReadOnly);
    }

    #[test]
    fn apply_control_rejects_out_of_range_setpoint() {
        let mut s = SimState::default();
        let err = s
            .apply_control(SignalId::ClDose, ControlValue::Number(99.0))
            .unwrap_err();
        assert!(matches!(err, ControlError::OutOfRange { .. }));
    }

    #[test]
    fn apply_control_accepts_valid_writes() {
        let mut s = SimState::default();
        s.apply_control(SignalId::WellfieldOn, ControlValue::Bool(true))
            .unwrap();
        assert!(s.controls.wellfield_on);

        s.apply_control(SignalId::QOutSp, ControlValue::Number(150.0))
            .unwrap();
        assert_eq!(s.controls.q_out_sp, 150.0);
    }

    #[test]
    fn reset_damage_is_idempotent() {
        let mut s = SimState::default();
        s.health.pump_well_health = 10.0;
        s.health.reset_damage();
        let after_one = s.health;
        s.health.reset_damage();
        assert_eq!(after_one, s.health);
        assert_eq!(s.health.pump_well_health, 100.0);
    }
}
