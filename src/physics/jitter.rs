//! Sensor emission: the published copy of the physics state that
//! Modbus/HTTP/SSE readers actually see. Jitter is added here, once per
//! tick, and never written back into the integrated state it was derived
//! from.

use crate::state::PhysicsVars;
use rand::Rng;

const FLOW_JITTER: f64 = 1.0;
const PRESSURE_JITTER: f64 = 0.1;
const CL_JITTER: f64 = 0.01;
const PH_JITTER: f64 = 0.05;
const DP_JITTER: f64 = 0.02;

/// Flows below this are snapped to exactly 0 so a stopped pump doesn't
/// display wandering noise as phantom flow.
const FLOW_SNAP_THRESHOLD: f64 = 1.0;

fn jitter_flow(q: f64, rng: &mut impl Rng) -> f64 {
    if q < FLOW_SNAP_THRESHOLD {
        0.0
    } else {
        q + rng.random_range(-FLOW_JITTER..=FLOW_JITTER)
    }
}

fn jitter_pressure(p: f64, rng: &mut impl Rng) -> f64 {
    p + rng.random_range(-PRESSURE_JITTER..=PRESSURE_JITTER)
}

pub fn publish(vars: &PhysicsVars, rng: &mut impl Rng) -> PhysicsVars {
    PhysicsVars {
        q_wellfield: jitter_flow(vars.q_wellfield, rng),
        q_feed: jitter_flow(vars.q_feed, rng),
        q_out: jitter_flow(vars.q_out, rng),
        q_perm: jitter_flow(vars.q_perm, rng),
        q_brine: jitter_flow(vars.q_brine, rng),

        pressure_well: jitter_pressure(vars.pressure_well, rng),
        pressure_feed: jitter_pressure(vars.pressure_feed, rng),
        pressure_dist: jitter_pressure(vars.pressure_dist, rng),
        dp_ro_true: (vars.dp_ro_true + rng.random_range(-DP_JITTER..=DP_JITTER)).max(0.0),

        level_feed_tank: vars.level_feed_tank,
        level_clearwell: vars.level_clearwell,

        tds_feed: vars.tds_feed,
        tds_perm: vars.tds_perm,
        ph_true: vars.ph_true + rng.random_range(-PH_JITTER..=PH_JITTER),
        cl_true: (vars.cl_true + rng.random_range(-CL_JITTER..=CL_JITTER)).max(0.0),

        time_s: vars.time_s,
    }
}
