//! The physics tick: deterministic given `(prior_state, controls, dt)`
//! plus a seeded noise source used only for published-PV jitter, never for
//! integrated state.
//!
//! `tick` runs the five sub-steps in the order the daemon's tick driver
//! (`crate::daemon`) calls them every cycle: targets, first-order ramp,
//! chemistry, damage accrual, mass balance. Damage accrual reads the
//! ramped pressures and this tick's chemistry so a condition that just
//! started applying debits in the same tick it appears, letting several
//! conditions debit independently in one tick.

mod chemistry;
mod damage;
mod jitter;
mod mass_balance;
mod targets;

use crate::state::SimState;
use rand::Rng;

/// `x ← x + (target_x − x) · α_x`, the shared ramp used for every flow and
/// pressure variable.
const ALPHA_FLOW: f64 = 0.1;
const ALPHA_PRESSURE: f64 = 0.5;

fn ramp(x: f64, target: f64, alpha: f64) -> f64 {
    let next = x + (target - x) * alpha;
    finite_or(next, x)
}

/// Non-finite arithmetic is a programmer error, not a runtime condition to
/// propagate: reset to the last known-finite value instead.
fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Advance `state` by one tick of `dt` seconds, using `rng` only to derive
/// the published (jittered) copy of the PVs.
pub fn tick(state: &mut SimState, dt: f64, rng: &mut impl Rng) {
    let t = targets::compute(&state.controls, &state.vars, state.health.pump_feed_health);

    state.vars.q_wellfield = ramp(state.vars.q_wellfield, t.q_well, ALPHA_FLOW);
    state.vars.pressure_well = ramp(state.vars.pressure_well, t.p_well, ALPHA_PRESSURE);
    state.vars.q_feed = ramp(state.vars.q_feed, t.q_feed, ALPHA_FLOW);
    state.vars.pressure_feed = ramp(state.vars.pressure_feed, t.p_feed, ALPHA_PRESSURE);
    state.vars.q_out = ramp(state.vars.q_out, t.q_dist, ALPHA_FLOW);
    state.vars.pressure_dist = ramp(state.vars.pressure_dist, t.p_dist, ALPHA_PRESSURE);

    let time_s = state.vars.time_s;
    chemistry::step(&mut state.vars, &state.health, &state.controls, dt, time_s);
    damage::accrue(&mut state.health, &state.controls, &state.vars, dt);
    mass_balance::step(&mut state.vars, dt);

    guard_finite(&mut state.vars);

    state.vars.time_s += dt;
    state.published = jitter::publish(&state.vars, rng);
}

/// Last line of defense: any process variable that somehow went
/// non-finite this tick is reset to 0 rather than propagated to clients.
fn guard_finite(vars: &mut crate::state::PhysicsVars) {
    macro_rules! guard {
        ($($field:ident),+ $(,)?) => {
            $(if !vars.$field.is_finite() { vars.$field = 0.0; })+
        };
    }
    guard!(
        q_wellfield, q_feed, q_out, q_perm, q_brine, pressure_well, pressure_feed,
        pressure_dist, dp_ro_true, level_feed_tank, level_clearwell, tds_feed, tds_perm,
        ph_true, cl_true,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Controls;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0)
    }

    #[test]
    fn tick_is_deterministic_given_same_seed() {
        let mut a = SimState::default();
        let mut b = SimState::default();
        a.controls.wellfield_on = true;
        b.controls.wellfield_on = true;
        let mut rng_a = rng();
        let mut rng_b = rng();
        for _ in 0..50 {
            tick(&mut a, 0.1, &mut rng_a);
            tick(&mut b, 0.1, &mut rng_b);
        }
        assert_eq!(a.vars, b.vars);
        assert_eq!(a.health, b.health);
    }

    #[test]
    fn wellfield_flow_ramps_toward_target_over_many_ticks() {
        let mut s = SimState::default();
        s.controls.wellfield_on = true;
        let mut r = rng();
        for _ in 0..200 {
            tick(&mut s, 0.1, &mut r);
        }
        assert!((s.vars.q_wellfield - 110.0).abs() < 0.5);
    }

    #[test]
    fn idle_plant_never_damages_and_stays_at_rest() {
        let mut s = SimState::default();
        let mut r = rng();
        for _ in 0..100 {
            tick(&mut s, 0.1, &mut r);
        }
        assert_eq!(s.health, crate::state::Health::default());
        assert_eq!(s.vars.q_wellfield, 0.0);
    }

    #[test]
    fn published_snapshot_never_mutates_integrated_state() {
        let mut s = SimState::default();
        s.controls = Controls {
            ro_feed_pump_on: true,
            ..Controls::default()
        };
        s.vars.level_feed_tank = 2.0;
        let mut r = rng();
        let before = s.vars;
        tick(&mut s, 0.1, &mut r);
        assert_ne!(s.vars, before);
        assert_ne!(s.published, s.vars.clone());
    }
}
