//! Horizontal (X/Z) tick model.

use crate::mathf::{self, DEG_TO_RAD_JUMP};
use crate::modifiers::{MOD_BLOCK, MOD_LADDER, MOD_SOULSAND};
use crate::state::{validate_slip, Controls, InertiaMode, MoveState, PlayerState, AIR_DRAG, SLIP_FACTOR};

const WATER_DRAG: f32 = 0.8;
const LAVA_DRAG: f32 = 0.5;
const SOULSAND_FACTOR: f64 = 0.4;
const FLUID_MOVEMENT: f32 = 0.02;
const AIR_MOVEMENT: f32 = 0.02;
const AIR_SPRINT_BONUS: f32 = 0.3;
const BASE_MOVEMENT: f64 = 0.1;
const SPRINT_FACTOR: f64 = 1.3;
const SPEED_STEP: f64 = 0.2;
const SLOWNESS_STEP: f64 = 0.15;
/// `0.6 * 0.91` cubed; normal ground keeps the multiplier near 1.
const GROUND_REFERENCE: f32 = 0.16277136;
const JUMP_IMPULSE: f32 = 0.2;
const BLOCKING_FACTOR: f32 = 0.2;
const SNEAK_FACTOR: f32 = 0.3;
const INPUT_DAMPING: f32 = 0.98;
const MIN_INPUT_SQ: f32 = 1.0e-4;
const LADDER_LIMIT: f64 = 0.15000000596046448;
const WEB_FACTOR: f64 = 0.25;

impl PlayerState {
    pub(crate) fn tick_horizontal(&mut self, controls: &Controls) {
        let yaw = self.resolve_facing(controls);
        let mods = controls.modifiers;
        let slip = match controls.slip {
            Some(value) if validate_slip(value).is_ok() => value,
            _ => self.ground_slip,
        };

        // 1) move with last tick's velocity
        self.x += self.vx;
        self.z += self.vz;

        // 2) fluid drag from the previous tick, soulsand from this one
        if self.prev_modifiers.in_water() {
            self.vx *= WATER_DRAG as f64;
            self.vz *= WATER_DRAG as f64;
        } else if self.prev_modifiers.in_lava() {
            self.vx *= LAVA_DRAG as f64;
            self.vz *= LAVA_DRAG as f64;
        }
        if mods.contains(MOD_SOULSAND) {
            self.vx *= SOULSAND_FACTOR;
            self.vz *= SOULSAND_FACTOR;
        }

        // 3) input
        let (mut forward, mut strafe) = controls.keys.intent();
        if controls.reverse {
            forward = -forward;
            strafe = -strafe;
        }

        // 4) surface drag lags one tick behind
        if !self.prev_modifiers.in_fluid() {
            self.vx *= self.prev_slip as f64;
            self.vz *= self.prev_slip as f64;
        }

        // 5) inertia
        if mods.in_web() {
            self.vx = 0.0;
            self.vz = 0.0;
        } else {
            self.apply_horizontal_inertia();
        }

        // 6) movement multiplier
        let movement = self.movement_multiplier(controls, slip);

        // 7) sprint jump boost
        if controls.phase == MoveState::Jump && controls.sprint {
            let sign = if controls.reverse { -1.0f32 } else { 1.0f32 };
            let radians = yaw * DEG_TO_RAD_JUMP;
            self.vx -= (mathf::sin(radians) * JUMP_IMPULSE * sign) as f64;
            self.vz += (mathf::cos(radians) * JUMP_IMPULSE * sign) as f64;
        }

        // 8) blocking, sneaking, then the fixed damping
        if mods.contains(MOD_BLOCK) {
            forward *= BLOCKING_FACTOR;
            strafe *= BLOCKING_FACTOR;
        }
        if controls.sneak {
            forward *= SNEAK_FACTOR;
            strafe *= SNEAK_FACTOR;
        }
        forward *= INPUT_DAMPING;
        strafe *= INPUT_DAMPING;

        // 9) accelerate
        let mut distance = strafe * strafe + forward * forward;
        if distance >= MIN_INPUT_SQ {
            distance = mathf::sqrt(distance);
            if distance < 1.0 {
                distance = 1.0;
            }
            distance = movement / distance;
            strafe *= distance;
            forward *= distance;
            let radians = mathf::yaw_to_radians(yaw);
            let sin_yaw = mathf::sin(radians);
            let cos_yaw = mathf::cos(radians);
            self.vx += (strafe * cos_yaw - forward * sin_yaw) as f64;
            self.vz += (forward * cos_yaw + strafe * sin_yaw) as f64;
        }

        // 10) remaining clamps
        if mods.contains(MOD_LADDER) {
            self.vx = self.vx.clamp(-LADDER_LIMIT, LADDER_LIMIT);
            self.vz = self.vz.clamp(-LADDER_LIMIT, LADDER_LIMIT);
        }
        if mods.in_web() {
            self.vx *= WEB_FACTOR;
            self.vz *= WEB_FACTOR;
        }

        // 11) flags for the next tick
        self.prev_slip = match controls.phase {
            MoveState::Ground => slip * SLIP_FACTOR,
            _ => AIR_DRAG,
        };
        self.prev_sprint = controls.sprint;
        self.prev_sneak = controls.sneak;
        self.prev_modifiers = mods;
        self.modifiers = mods;
        self.move_state = controls.phase;
    }

    /// Facing used this tick; pops at most one queued angle and one queued turn.
    pub(crate) fn resolve_facing(&mut self, controls: &Controls) -> f32 {
        let mut yaw = controls.rotation.unwrap_or(self.facing);
        if let Some(angle) = self.angle_queue.pop_front() {
            yaw = angle;
        }
        if let Some(delta) = self.turn_queue.pop_front() {
            self.facing += delta;
            yaw += delta;
        }
        yaw + controls.facing_offset
    }

    fn apply_horizontal_inertia(&mut self) {
        let threshold = self.inertia_threshold;
        match self.inertia_mode {
            InertiaMode::PerAxis => {
                if self.vx.abs() < threshold {
                    self.vx = 0.0;
                }
                if self.vz.abs() < threshold {
                    self.vz = 0.0;
                }
            }
            InertiaMode::Combined => {
                if self.vx * self.vx + self.vz * self.vz < threshold * threshold {
                    self.vx = 0.0;
                    self.vz = 0.0;
                }
            }
        }
    }

    fn movement_multiplier(&self, controls: &Controls, slip: f32) -> f32 {
        if controls.modifiers.in_fluid() {
            return FLUID_MOVEMENT;
        }
        match controls.phase {
            MoveState::Air | MoveState::Slime => {
                if self.prev_sprint {
                    AIR_MOVEMENT + AIR_MOVEMENT * AIR_SPRINT_BONUS
                } else {
                    AIR_MOVEMENT
                }
            }
            MoveState::Ground | MoveState::Jump => {
                let mut attribute = BASE_MOVEMENT as f32 as f64;
                attribute *= 1.0 + SPEED_STEP * self.speed as f64;
                attribute *= (1.0 - SLOWNESS_STEP * self.slowness as f64).max(0.0);
                if controls.sprint {
                    attribute *= SPRINT_FACTOR;
                }
                let drag = slip * SLIP_FACTOR;
                (attribute as f32) * (GROUND_REFERENCE / (drag * drag * drag))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::input::Keys;
    use crate::state::{AxisModel, Controls, MoveState, NoObserver, PlayerState};

    fn sprint_controls() -> Controls {
        let mut controls = Controls::new(MoveState::Ground);
        controls.keys = Keys::FORWARD;
        controls.sprint = true;
        controls
    }

    #[test]
    fn one_sprint_tick_from_rest_reaches_base_acceleration() {
        let mut state = PlayerState::new(AxisModel::Horizontal);
        state.tick(&sprint_controls(), &mut NoObserver);
        assert!((state.vz() - 0.098 * 1.3).abs() < 1e-6, "vz = {}", state.vz());
        assert_eq!(state.vx(), 0.0);
        assert_eq!(state.z(), 0.0);
    }

    #[test]
    fn position_integrates_previous_velocity() {
        let mut state = PlayerState::new(AxisModel::Horizontal);
        state.tick(&sprint_controls(), &mut NoObserver);
        let first = state.vz();
        state.tick(&sprint_controls(), &mut NoObserver);
        assert_eq!(state.z(), first);
    }

    #[test]
    fn stopping_below_threshold_zeroes_exactly() {
        let mut state = PlayerState::new(AxisModel::Horizontal);
        state.set_vz(0.006);
        state.set_vx(-0.0049);
        state.tick(&Controls::new(MoveState::Ground), &mut NoObserver);
        assert_eq!(state.vz(), 0.0);
        assert_eq!(state.vx(), 0.0);
    }

    #[test]
    fn reversed_call_negates_input() {
        let mut forward = PlayerState::new(AxisModel::Horizontal);
        let mut backward = PlayerState::new(AxisModel::Horizontal);
        let mut controls = sprint_controls();
        forward.tick(&controls, &mut NoObserver);
        controls.reverse = true;
        backward.tick(&controls, &mut NoObserver);
        assert_eq!(forward.vz(), -backward.vz());
    }
}
