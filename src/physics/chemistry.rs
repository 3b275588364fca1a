//! Water chemistry: chlorine residual, pH, membrane rejection, and the RO
//! differential-pressure model that makes a ruptured membrane behave like
//! a leak rather than a dead stop.

use crate::state::{Controls, Health, PhysicsVars};

/// Period of the slow feed-TDS baseline drift: an hourly period with a
/// modest amplitude around a ~1250 µS/cm mean, so a multi-hour training
/// session sees visible drift without PVs swinging tick-to-tick.
const TDS_FEED_PERIOD_S: f64 = 3600.0;
const TDS_FEED_AMPLITUDE: f64 = 50.0;
const TDS_FEED_BASELINE: f64 = 1250.0;

pub fn step(vars: &mut PhysicsVars, health: &Health, controls: &Controls, dt: f64, time_s: f64) {
    let current_cl = if controls.cl_pump_on && vars.q_feed > 5.0 {
        0.9 * controls.cl_dose
    } else if controls.cl_pump_on && vars.q_feed <= 5.0 && controls.cl_dose > 0.0 {
        50.0
    } else {
        0.0
    };
    vars.cl_true += 0.1 * (current_cl - vars.cl_true);

    vars.ph_true = 7.0 + if controls.naoh_pump_on { 0.15 * controls.naoh_dose } else { 0.0 };

    vars.tds_feed = TDS_FEED_BASELINE
        + TDS_FEED_AMPLITUDE * (2.0 * std::f64::consts::PI * time_s / TDS_FEED_PERIOD_S).sin();

    let rejection = 0.98 * (health.membrane_health / 100.0);
    vars.tds_perm = vars.tds_feed * (1.0 - rejection);

    vars.dp_ro_true = if vars.q_feed > 1.0 {
        let base = 0.5 + (vars.q_feed / 100.0) * 1.5;
        let collapse = if health.membrane_health < 30.0 { 0.2 } else { 1.0 };
        base * collapse
    } else {
        0.0
    };

    let _ = dt; // chemistry here has no per-dt integration besides the Cl_true ramp above
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stagnant_chlorination_spikes_cl_true_toward_50() {
        let mut v = PhysicsVars {
            q_feed: 0.0,
            ..PhysicsVars::default()
        };
        let h = Health::default();
        let mut c = Controls::default();
        c.cl_pump_on = true;
        c.cl_dose = 2.0;
        step(&mut v, &h, &c, 0.1, 0.0);
        assert!(v.cl_true > 0.0 && v.cl_true < 50.0);
    }

    #[test]
    fn ph_follows_naoh_dose_only_when_pump_on() {
        let mut v = PhysicsVars::default();
        let h = Health::default();
        let mut c = Controls::default();
        c.naoh_pump_on = true;
        c.naoh_dose = 10.0;
        step(&mut v, &h, &c, 0.1, 0.0);
        assert_eq!(v.ph_true, 8.5);
    }

    #[test]
    fn destroyed_membrane_collapses_dp_and_rejection() {
        let mut v = PhysicsVars {
            q_feed: 50.0,
            ..PhysicsVars::default()
        };
        let h = Health {
            membrane_health: 0.0,
            ..Health::default()
        };
        let c = Controls::default();
        step(&mut v, &h, &c, 0.1, 0.0);
        assert_eq!(v.dp_ro_true, (0.5 + 0.75) * 0.2);
        assert_eq!(v.tds_perm, v.tds_feed);
    }

    #[test]
    fn no_flow_gives_zero_differential_pressure() {
        let mut v = PhysicsVars::default();
        let h = Health::default();
        let c = Controls::default();
        step(&mut v, &h, &c, 0.1, 0.0);
        assert_eq!(v.dp_ro_true, 0.0);
    }
}
