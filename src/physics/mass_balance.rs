//! Mass balance and tank-level integration.

use crate::state::PhysicsVars;

const RO_RECOVERY: f64 = 0.75;
const AREA_FEED_M2: f64 = 10.0;
const AREA_CLEAR_M2: f64 = 40.0;

pub fn step(vars: &mut PhysicsVars, dt: f64) {
    vars.level_feed_tank +=
        (vars.q_wellfield - vars.q_feed) * dt / 3600.0 / AREA_FEED_M2;

    vars.q_perm = vars.q_feed * RO_RECOVERY;
    vars.q_brine = vars.q_feed - vars.q_perm;

    vars.level_clearwell += (vars.q_perm - vars.q_out) * dt / 3600.0 / AREA_CLEAR_M2;

    vars.level_feed_tank = vars.level_feed_tank.clamp(0.0, 5.0);
    vars.level_clearwell = vars.level_clearwell.clamp(0.0, 6.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_tank_fills_when_wellfield_exceeds_draw() {
        let mut v = PhysicsVars {
            q_wellfield: 110.0,
            q_feed: 0.0,
            level_feed_tank: 2.5,
            ..PhysicsVars::default()
        };
        step(&mut v, 0.1);
        assert!(v.level_feed_tank > 2.5);
    }

    #[test]
    fn permeate_and_brine_split_by_fixed_recovery() {
        let mut v = PhysicsVars {
            q_feed: 100.0,
            ..PhysicsVars::default()
        };
        step(&mut v, 0.1);
        assert_eq!(v.q_perm, 75.0);
        assert_eq!(v.q_brine, 25.0);
    }

    #[test]
    fn levels_clamp_at_their_bounds() {
        let mut v = PhysicsVars {
            level_feed_tank: 4.999,
            q_wellfield: 110.0,
            level_clearwell: 0.001,
            q_out: 120.0,
            ..PhysicsVars::default()
        };
        step(&mut v, 3600.0);
        assert_eq!(v.level_feed_tank, 5.0);
        assert_eq!(v.level_clearwell, 0.0);
    }
}
