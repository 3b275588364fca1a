//! JSON wire shapes for the HTTP surface.
//!
//! Kept separate from `crate::state::SimState` so the wire format's key
//! casing (matching the plant's own process-variable names, e.g.
//! `TDS_feed`, `pH_true`) never has to leak into the physics model's own
//! Rust-idiomatic field names.

use serde::Serialize;

use crate::state::SimState;

#[derive(Debug, Serialize)]
pub struct ControlsDto {
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
    #[serde(rename = "NaOH_dose")]
    pub naoh_dose: f64,
    #[serde(rename = "Cl_dose")]
    pub cl_dose: f64,
    #[serde(rename = "Q_out_sp")]
    pub q_out_sp: f64,
}

#[derive(Debug, Serialize)]
pub struct StateDto {
    #[serde(rename = "Q_wellfield")]
    pub q_wellfield: f64,
    #[serde(rename = "Q_feed")]
    pub q_feed: f64,
    #[serde(rename = "Q_perm")]
    pub q_perm: f64,
    #[serde(rename = "Q_brine")]
    pub q_brine: f64,
    #[serde(rename = "Q_out")]
    pub q_out: f64,
    pub level_feed_tank: f64,
    pub level_clearwell: f64,
    pub pressure_well: f64,
    pub pressure_feed: f64,
    pub pressure_dist: f64,
    #[serde(rename = "dP_ro_true")]
    pub dp_ro_true: f64,
    #[serde(rename = "TDS_feed")]
    pub tds_feed: f64,
    #[serde(rename = "TDS_perm")]
    pub tds_perm: f64,
    #[serde(rename = "pH_true")]
    pub ph_true: f64,
    #[serde(rename = "Cl_true")]
    pub cl_true: f64,
    pub membrane_health: f64,
    pub pump_well_health: f64,
    pub pump_feed_health: f64,
    pub pump_dist_health: f64,
    pub pipe_well_health: f64,
    pub pipe_feed_health: f64,
    pub pipe_dist_health: f64,
}

#[derive(Debug, Serialize)]
pub struct SnapshotDto {
    pub time_s: f64,
    pub state: StateDto,
    pub controls: ControlsDto,
}

impl From<&SimState> for SnapshotDto {
    fn from(s: &SimState) -> Self {
        let p = &s.published;
        let h = &s.health;
        let c = &s.controls;
        SnapshotDto {
            time_s: p.time_s,
            state: StateDto {
                q_wellfield: p.q_wellfield,
                q_feed: p.q_feed,
                q_perm: p.q_perm,
                q_brine: p.q_brine,
                q_out: p.q_out,
                level_feed_tank: p.level_feed_tank,
                level_clearwell: p.level_clearwell,
                pressure_well: p.pressure_well,
                pressure_feed: p.pressure_feed,
                pressure_dist: p.pressure_dist,
                dp_ro_true: p.dp_ro_true,
                tds_feed: p.tds_feed,
                tds_perm: p.tds_perm,
                ph_true: p.ph_true,
                cl_true: p.cl_true,
                membrane_health: h.membrane_health,
                pump_well_health: h.pump_well_health,
                pump_feed_health: h.pump_feed_health,
                pump_dist_health: h.pump_dist_health,
                pipe_well_health: h.pipe_well_health,
                pipe_feed_health: h.pipe_feed_health,
                pipe_dist_health: h.pipe_dist_health,
            },
            controls: ControlsDto {
                wellfield_on: c.wellfield_on,
                ro_feed_pump_on: c.ro_feed_pump_on,
                dist_pump_on: c.dist_pump_on,
                valve_101_open: c.valve_101_open,
                valve_201_open: c.valve_201_open,
                valve_202_open: c.valve_202_open,
                valve_203_open: c.valve_203_open,
                valve_401_open: c.valve_401_open,
                naoh_pump_on: c.naoh_pump_on,
                cl_pump_on: c.cl_pump_on,
                naoh_dose: c.naoh_dose,
                cl_dose: c.cl_dose,
                q_out_sp: c.q_out_sp,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_dto_serializes_with_documented_key_casing() {
        let s = SimState::default();
        let dto = SnapshotDto::from(&s);
        let json = serde_json::to_string(&dto).unwrap();
        assert!(json.contains("\"TDS_feed\""));
        assert!(json.contains("\"pH_true\""));
        assert!(json.contains("\"NaOH_dose\""));
        assert!(json.contains("\"Q_out_sp\""));
    }
}
