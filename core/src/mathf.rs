//! Single-precision math that matches the game's lookup-table trigonometry.
//!
//! Every value here is `f32` on purpose: the simulation stays bit-identical to
//! the client only when the narrow type is used at the same points.

use std::sync::OnceLock;

const TABLE_LEN: usize = 65536;
const TABLE_MASK: i32 = 65535;
/// 65536 / (2 * PI), rounded to `f32`.
const RAD_TO_INDEX: f32 = 10430.378;
const QUARTER_TURN: f32 = 16384.0;

pub const PI: f32 = std::f32::consts::PI;
/// Degrees to radians factor used by the jump impulse.
pub const DEG_TO_RAD_JUMP: f32 = 0.017453292;

fn sin_table() -> &'static [f32] {
    static TABLE: OnceLock<Vec<f32>> = OnceLock::new();
    TABLE.get_or_init(|| {
        (0..TABLE_LEN)
            .map(|i| (i as f64 * std::f64::consts::PI * 2.0 / TABLE_LEN as f64).sin() as f32)
            .collect()
    })
}

fn table_at(index: f32) -> f32 {
    // `as i32` saturates and truncates toward zero, same as the JVM cast.
    let slot = (index as i32 & TABLE_MASK) as usize;
    sin_table()[slot]
}

pub fn sin(radians: f32) -> f32 {
    table_at(radians * RAD_TO_INDEX)
}

pub fn cos(radians: f32) -> f32 {
    table_at(radians * RAD_TO_INDEX + QUARTER_TURN)
}

/// Yaw in degrees to radians, evaluated as `(yaw * PI) / 180`.
pub fn yaw_to_radians(yaw: f32) -> f32 {
    yaw * PI / 180.0
}

/// Square root in single precision.
pub fn sqrt(value: f32) -> f32 {
    (value as f64).sqrt() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_sin_matches_known_points() {
        assert_eq!(sin(0.0), 0.0);
        assert!((sin(PI / 2.0) - 1.0).abs() < 1e-6);
        assert!((cos(0.0) - 1.0).abs() < 1e-6);
        assert!(cos(PI / 2.0).abs() < 1e-3);
    }

    #[test]
    fn table_sin_is_periodic_over_negative_angles() {
        let a = sin(yaw_to_radians(-90.0));
        let b = sin(yaw_to_radians(270.0));
        assert!((a - b).abs() < 1e-6);
        assert!((a + 1.0).abs() < 1e-6);
    }

    #[test]
    fn table_lookup_stays_close_to_native_trig() {
        // The table quantizes to 65536 steps, so a generic angle is off by a few ulps.
        let yaw = yaw_to_radians(17.3);
        let table = sin(yaw);
        let native = yaw.sin();
        assert!((table - native).abs() < 1e-4);
    }
}
