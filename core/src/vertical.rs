//! Vertical (Y) tick model.

use crate::state::{Controls, MoveState, PlayerState, PLAYER_HEIGHT};

const GRAVITY: f64 = 0.08;
const AIR_DAMPING: f32 = 0.98;
const JUMP_VELOCITY: f32 = 0.42;
const JUMP_BOOST_STEP: f32 = 0.1;
const WATER_DAMPING: f64 = 0.8;
const LAVA_DAMPING: f64 = 0.5;
const FLUID_SINK: f64 = 0.02;
const FLUID_SWIM: f64 = 0.04;

impl PlayerState {
    pub(crate) fn tick_vertical(&mut self, controls: &Controls) {
        let mods = controls.modifiers;

        if let Some(snap) = self.pending_snap.take() {
            self.y = snap;
            self.vy = 0.0;
        } else {
            self.y += self.vy;
        }

        if self.vy.abs() < self.inertia_threshold {
            self.vy = 0.0;
        }

        let ascending = controls.phase == MoveState::Jump;
        self.vy = if mods.in_water() {
            let swim = if ascending { FLUID_SWIM } else { 0.0 };
            self.vy * WATER_DAMPING - FLUID_SINK + swim
        } else if mods.in_lava() {
            let swim = if ascending { FLUID_SWIM } else { 0.0 };
            self.vy * LAVA_DAMPING - FLUID_SINK + swim
        } else {
            match controls.phase {
                MoveState::Jump => {
                    let boost = JUMP_BOOST_STEP * self.jump_boost as f32;
                    let boost = if controls.reverse { -boost } else { boost };
                    (JUMP_VELOCITY + boost) as f64
                }
                MoveState::Air => (self.vy - GRAVITY) * AIR_DAMPING as f64,
                MoveState::Slime => (-self.vy - GRAVITY) * AIR_DAMPING as f64,
                MoveState::Ground => 0.0,
            }
        };

        if let Some(ceiling) = self.ceiling {
            let limit = ceiling - PLAYER_HEIGHT;
            if self.vy > 0.0 && self.y + self.vy > limit {
                self.pending_snap = Some(limit);
            }
        }

        self.prev_sprint = controls.sprint;
        self.prev_sneak = controls.sneak;
        self.prev_modifiers = mods;
        self.modifiers = mods;
        self.move_state = controls.phase;
    }
}

#[cfg(test)]
mod tests {
    use crate::modifiers::{Modifiers, MOD_WATER};
    use crate::state::{AxisModel, Controls, MoveState, NoObserver, PlayerState};

    fn run(state: &mut PlayerState, phase: MoveState, ticks: usize) {
        for _ in 0..ticks {
            state.tick(&Controls::new(phase), &mut NoObserver);
        }
    }

    #[test]
    fn jump_arc_matches_known_heights() {
        let mut state = PlayerState::new(AxisModel::Vertical);
        run(&mut state, MoveState::Jump, 1);
        run(&mut state, MoveState::Air, 2);
        // y after the jump tick and one air tick: 0.42 then 0.42 + 0.3332
        assert!((state.y() - 0.7531999805212).abs() < 1e-9, "y = {}", state.y());
    }

    #[test]
    fn ceiling_snaps_on_the_following_tick() {
        let mut state = PlayerState::new(AxisModel::Vertical);
        state.set_ceiling(Some(2.0)).expect("ceiling");
        run(&mut state, MoveState::Jump, 1);
        assert!(state.vy() > 0.0);
        run(&mut state, MoveState::Air, 1);
        assert!((state.y() - 0.2).abs() < 1e-12);
        assert!(state.vy() < 0.0);
    }

    #[test]
    fn slime_inverts_falling_velocity() {
        let mut state = PlayerState::new(AxisModel::Vertical);
        state.set_vy(-0.5);
        run(&mut state, MoveState::Slime, 1);
        assert!(state.vy() > 0.0);
        assert!((state.vy() - (0.5 - 0.08) * 0.98f32 as f64).abs() < 1e-12);
    }

    #[test]
    fn water_swim_and_sink_are_distinct() {
        let mut up = PlayerState::new(AxisModel::Vertical);
        let mut down = PlayerState::new(AxisModel::Vertical);
        let mut controls = Controls::new(MoveState::Jump);
        controls.modifiers = Modifiers::from_bits(MOD_WATER);
        up.tick(&controls, &mut NoObserver);
        controls.phase = MoveState::Air;
        down.tick(&controls, &mut NoObserver);
        assert!((up.vy() - 0.02).abs() < 1e-12);
        assert!((down.vy() + 0.02).abs() < 1e-12);
    }

    #[test]
    fn reversed_jump_subtracts_the_boost() {
        let mut state = PlayerState::new(AxisModel::Vertical);
        state.set_jump_boost(2).expect("boost");
        let mut controls = Controls::new(MoveState::Jump);
        controls.reverse = true;
        state.tick(&controls, &mut NoObserver);
        assert!((state.vy() - (0.42f32 - 0.2f32) as f64).abs() < 1e-7);
    }
}
