//! Actuated control inputs.

/// The actuated inputs a Modbus/HTTP client can write.
///
/// Valve defaults are all `true`: an operator bringing the plant up
/// manually expects the flow paths open rather than a deadhead on the
/// first pump start. Every pump and dosing control defaults `false`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Controls {
    pub wellfield_on: bool,
    pub ro_feed_pump_on: bool,
    pub dist_pump_on: bool,
    pub valve_101_open: bool,
    pub valve_201_open: bool,
    pub valve_202_open: bool,
    pub valve_203_open: bool,
    pub valve_401_open: bool,
    pub naoh_pump_on: bool,
    pub cl_pump_on: bool,

    /// mg/L, range [0, 20]
    pub naoh_dose: f64,
    /// mg/L, range [0, 5]
    pub cl_dose: f64,
    /// m3/h, range [0, 150]
    pub q_out_sp: f64,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            wellfield_on: false,
            ro_feed_pump_on: false,
            dist_pump_on: false,
            valve_101_open: true,
            valve_201_open: true,
            valve_202_open: true,
            valve_203_open: true,
            valve_401_open: true,
            naoh_pump_on: false,
            cl_pump_on: false,
            naoh_dose: 0.0,
            cl_dose: 0.0,
            q_out_sp: 0.0,
        }
    }
}

pub const NAOH_DOSE_RANGE: (f64, f64) = (0.0, 20.0);
pub const CL_DOSE_RANGE: (f64, f64) = (0.0, 5.0);
pub const Q_OUT_SP_RANGE: (f64, f64) = (0.0, 150.0);
