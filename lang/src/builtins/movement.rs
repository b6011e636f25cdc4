use mothball_core::{validate_slip, Controls, EventSink, MoveState};

use crate::binder::BoundCall;
use crate::error::EngineError;
use crate::recording::RecordingHook;
use crate::runtime::Engine;
use crate::stdlib::Gait;

const STRAFE_OFFSET: f32 = 45.0;

impl Engine {
    /// Horizontal movers; a jump gait jumps on its first tick only.
    pub(crate) fn run_gait(
        &mut self,
        gait: Gait,
        call: &BoundCall,
        sink: &mut dyn EventSink,
    ) -> Result<(), EngineError> {
        let duration = call.args.require_i64("duration")?;
        let slip = match call.args.number("slip") {
            Some(value) => {
                let slip = value as f32;
                validate_slip(slip)?;
                Some(slip)
            }
            None => None,
        };
        let mut controls = Controls::new(gait.phase);
        controls.keys = call.keys;
        controls.sprint = gait.sprint;
        controls.sneak = gait.sneak;
        controls.modifiers = call.modifiers;
        controls.rotation = call.args.number("rotation").map(|angle| angle as f32);
        controls.facing_offset = if gait.strafe45 { STRAFE_OFFSET } else { 0.0 };
        controls.reverse = call.reverse;
        controls.slip = slip;
        self.run_ticks(duration, gait.phase, controls, sink)
    }

    /// Vertical movers; jump and slime act on the first tick, then fall.
    pub(crate) fn run_rise(
        &mut self,
        phase: MoveState,
        call: &BoundCall,
        sink: &mut dyn EventSink,
    ) -> Result<(), EngineError> {
        let duration = call.args.require_i64("duration")?;
        let mut controls = Controls::new(phase);
        controls.modifiers = call.modifiers;
        controls.reverse = call.reverse;
        self.run_ticks(duration, phase, controls, sink)
    }

    fn run_ticks(
        &mut self,
        duration: i64,
        first: MoveState,
        mut controls: Controls,
        sink: &mut dyn EventSink,
    ) -> Result<(), EngineError> {
        for tick in 0..duration {
            self.cancel.check()?;
            controls.phase = match first {
                MoveState::Jump | MoveState::Slime if tick > 0 => MoveState::Air,
                phase => phase,
            };
            let mut hook = RecordingHook::new(&self.recording, sink);
            self.state.tick(&controls, &mut hook);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::Engine;
    use crate::value::Scope;
    use mothball_core::{AxisModel, MoveState};

    fn run(axis: AxisModel, sequence: &str) -> Engine {
        let mut engine = Engine::new(axis);
        engine
            .simulate(sequence, false, &mut Scope::new(), true)
            .expect(sequence);
        engine
    }

    #[test]
    fn jump_gait_lands_in_air_state() {
        let engine = run(AxisModel::Horizontal, "sj(3)");
        assert_eq!(engine.state().ticks(), 3);
        assert_eq!(engine.state().move_state(), MoveState::Air);
        let engine = run(AxisModel::Horizontal, "sj(1)");
        assert_eq!(engine.state().move_state(), MoveState::Jump);
    }

    #[test]
    fn vertical_jump_arc() {
        let engine = run(AxisModel::Vertical, "j(3)");
        assert!((engine.state().y() - 0.7531999805212).abs() < 1e-9, "{}", engine.state().y());
    }

    #[test]
    fn reversed_sprint_moves_backwards() {
        let engine = run(AxisModel::Horizontal, "-s(5)");
        assert!(engine.state().z() < 0.0);
        let engine = run(AxisModel::Horizontal, "s(5)");
        assert!(engine.state().z() > 0.0);
    }

    #[test]
    fn zero_duration_is_a_no_op() {
        let engine = run(AxisModel::Horizontal, "s(0) w(0)");
        assert_eq!(engine.state().ticks(), 0);
    }

    #[test]
    fn call_slip_must_be_positive() {
        let mut engine = Engine::new(AxisModel::Horizontal);
        let err = engine
            .simulate("s(2, slip = 0)", false, &mut Scope::new(), true)
            .expect_err("zero slip");
        assert_eq!(err.code(), "ValueError");
    }

    #[test]
    fn strafe45_gets_the_wider_vector() {
        let straight = run(AxisModel::Horizontal, "s(12)");
        let strafed = run(AxisModel::Horizontal, "s45(12)");
        let speed = |engine: &Engine| engine.state().vx().hypot(engine.state().vz());
        assert!(speed(&strafed) > speed(&straight));
    }
}
