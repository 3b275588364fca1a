//! Damage accrual: each condition debits its own health scalar
//! independently; several may fire in the same tick.

use super::targets::suction_ok;
use crate::state::{Controls, Health, PhysicsVars};

pub fn accrue(health: &mut Health, controls: &Controls, vars: &PhysicsVars, dt: f64) {
    if controls.wellfield_on && !controls.valve_101_open {
        Health::debit(&mut health.pump_well_health, 0.3, dt);
    }
    if controls.ro_feed_pump_on && !suction_ok(vars) {
        Health::debit(&mut health.pump_feed_health, 0.5, dt);
    }
    if controls.dist_pump_on && vars.level_clearwell < 0.2 {
        Health::debit(&mut health.pump_dist_health, 0.5, dt);
    }
    if controls.dist_pump_on && !controls.valve_401_open {
        Health::debit(&mut health.pump_dist_health, 0.3, dt);
    }
    if vars.pressure_well > 10.0 {
        Health::debit(&mut health.pipe_well_health, 0.2, dt);
    }
    if vars.pressure_feed > 20.0 {
        Health::debit(&mut health.pipe_feed_health, 0.5, dt);
    }
    if vars.pressure_dist > 12.0 {
        Health::debit(&mut health.pipe_dist_health, 0.3, dt);
    }
    if vars.cl_true > 0.1 && vars.q_feed > 0.0 {
        Health::debit(&mut health.membrane_health, 0.2, dt);
    }
    if vars.pressure_feed > 20.0 {
        Health::debit(&mut health.membrane_health, 1.0, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadheaded_wellfield_debits_pump_well_health_only() {
        let mut h = Health::default();
        let mut c = Controls::default();
        c.wellfield_on = true;
        c.valve_101_open = false;
        let v = PhysicsVars::default();
        accrue(&mut h, &c, &v, 1.0);
        assert_eq!(h.pump_well_health, 99.7);
        assert_eq!(h.pump_feed_health, 100.0);
    }

    #[test]
    fn overlapping_conditions_debit_independently_in_one_tick() {
        let mut h = Health::default();
        let c = Controls::default();
        let v = PhysicsVars {
            pressure_feed: 25.0,
            ..PhysicsVars::default()
        };
        accrue(&mut h, &c, &v, 1.0);
        assert_eq!(h.pipe_feed_health, 99.5);
        assert_eq!(h.membrane_health, 99.0);
    }

    #[test]
    fn health_never_goes_below_zero() {
        let mut h = Health {
            pump_well_health: 0.1,
            ..Health::default()
        };
        let mut c = Controls::default();
        c.wellfield_on = true;
        c.valve_101_open = false;
        let v = PhysicsVars::default();
        accrue(&mut h, &c, &v, 10.0);
        assert_eq!(h.pump_well_health, 0.0);
    }
}
