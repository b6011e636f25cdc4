//! Builtin implementations, grouped by family.

mod calculators;
mod movement;
mod returners;
mod setters;

use mothball_core::EventSink;

use crate::binder::BoundCall;
use crate::error::EngineError;
use crate::runtime::{Engine, Frame};
use crate::stdlib::{BuiltinDef, Op};
use crate::value::Scope;

impl Engine {
    pub(crate) fn dispatch_builtin(
        &mut self,
        def: &BuiltinDef,
        call: &BoundCall,
        scope: &mut Scope,
        sink: &mut dyn EventSink,
        frame: &Frame,
    ) -> Result<(), EngineError> {
        match def.op {
            Op::Move(gait) => self.run_gait(gait, call, sink),
            Op::Rise(phase) => self.run_rise(phase, call, sink),
            Op::Out(readout) => {
                self.out_readout(def, readout, call, sink);
                Ok(())
            }
            Op::OutMm(coord) => {
                self.out_mm(def, coord, call, sink);
                Ok(())
            }
            Op::OutBlocks(coord) => {
                self.out_blocks(def, coord, call, sink);
                Ok(())
            }
            Op::OutVec => {
                self.out_vec(def, call, sink);
                Ok(())
            }
            Op::Print => self.print(call, scope, sink),
            Op::Help => self.help(call, sink),
            Op::Facing => self.set_facing(call),
            Op::Turn => self.turn(call),
            Op::Angles => self.queue_angles(call),
            Op::Turns => self.queue_turns(call),
            Op::SetPos(coord) => self.set_position(coord, call),
            Op::SetVel(coord) => self.set_velocity(coord, call),
            Op::Slip => self.set_slip(call),
            Op::Speed => Ok(self.state.set_speed(call.args.require_i64("level")?)?),
            Op::Slowness => Ok(self.state.set_slowness(call.args.require_i64("level")?)?),
            Op::JumpBoost => Ok(self.state.set_jump_boost(call.args.require_i64("level")?)?),
            Op::Ceiling => Ok(self.state.set_ceiling(call.args.number("height"))?),
            Op::Inertia => self.set_inertia(call),
            Op::Precision => Ok(self.state.set_precision(call.args.require_i64("digits")?)?),
            Op::Inv(coord) => {
                let goal = call.args.require_f64("goal")?;
                self.solve_velocity(def, coord, goal, call, scope, sink, frame)
            }
            Op::Bwmm(coord) => {
                let mm = call.args.require_f64("mm")?;
                let goal = mm + 0.6 * sign(mm);
                self.solve_velocity(def, coord, goal, call, scope, sink, frame)
            }
            Op::Possibility(axis) => self.run_possibility(def, axis, call, scope, sink, frame),
            Op::InertiaListener => self.run_inertia_listener(def, call, scope, sink, frame),
            Op::Var => self.assign_var(call, scope),
            Op::Def => self.define(call, scope),
            Op::Repeat => self.repeat(call, scope, sink, frame),
        }
    }
}

/// Sign with `sign(0) == 0`, for the 0.6 block-edge offsets.
pub(crate) fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}
