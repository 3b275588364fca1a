//! Target flow/pressure computation: pure functions of controls and the
//! tank levels they gate, evaluated fresh every tick before the
//! first-order ramp smooths them into the integrated state.

use crate::state::{Controls, PhysicsVars};

/// Wellfield, RO-feed, and distribution targets for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Targets {
    pub q_well: f64,
    pub p_well: f64,
    pub q_feed: f64,
    pub p_feed: f64,
    pub q_dist: f64,
    pub p_dist: f64,
}

/// Maximum rated membrane efficiency, 100% `pump_feed_health`.
const Q_FEED_RATED: f64 = 100.0;

pub fn compute(controls: &Controls, vars: &PhysicsVars, pump_feed_health: f64) -> Targets {
    let (q_well, p_well) = wellfield(controls);
    let (q_feed, p_feed) = ro_feed(controls, vars, pump_feed_health);
    let (q_dist, p_dist) = distribution(controls, vars);
    Targets {
        q_well,
        p_well,
        q_feed,
        p_feed,
        q_dist,
        p_dist,
    }
}

fn wellfield(controls: &Controls) -> (f64, f64) {
    match (controls.wellfield_on, controls.valve_101_open) {
        (true, true) => (110.0, 3.0),
        (true, false) => (0.0, 12.0),
        (false, _) => (0.0, 0.0),
    }
}

/// `suction_ok`: the feed tank has enough head for the RO feed pump to draw
/// from without cavitating.
pub fn suction_ok(vars: &PhysicsVars) -> bool {
    vars.level_feed_tank > 0.2
}

fn ro_feed(controls: &Controls, vars: &PhysicsVars, pump_feed_health: f64) -> (f64, f64) {
    if !controls.ro_feed_pump_on || !suction_ok(vars) {
        return (0.0, 0.0);
    }
    if !controls.valve_201_open {
        return (0.0, 33.0); // pump-discharge deadhead
    }
    if controls.valve_202_open && controls.valve_203_open {
        let eta = pump_feed_health / 100.0;
        (Q_FEED_RATED * eta, 12.0)
    } else {
        (0.0, 30.0) // RO block
    }
}

fn distribution(controls: &Controls, vars: &PhysicsVars) -> (f64, f64) {
    if !controls.dist_pump_on || vars.level_clearwell <= 0.1 {
        return (0.0, 0.0);
    }
    if controls.valve_401_open {
        (controls.q_out_sp.min(120.0), 4.0)
    } else {
        (0.0, 15.0)
    }
}
