use std::rc::Rc;

use log::debug;
use mothball_core::{EventSink, InertiaMode};

use crate::binder::BoundCall;
use crate::decompose::is_identifier;
use crate::error::EngineError;
use crate::expr::evaluate;
use crate::function::{parse_signature, UserFunction};
use crate::runtime::{Engine, Frame};
use crate::stdlib::{lookup_any, Coord};
use crate::value::{Scope, Value};

impl Engine {
    pub(crate) fn set_facing(&mut self, call: &BoundCall) -> Result<(), EngineError> {
        self.state.set_facing(call.args.require_f64("angle")? as f32);
        Ok(())
    }

    pub(crate) fn turn(&mut self, call: &BoundCall) -> Result<(), EngineError> {
        self.state.turn(call.args.require_f64("angle")? as f32);
        Ok(())
    }

    pub(crate) fn queue_angles(&mut self, call: &BoundCall) -> Result<(), EngineError> {
        let angles = rest_angles(call)?;
        self.state.queue_angles(angles);
        Ok(())
    }

    pub(crate) fn queue_turns(&mut self, call: &BoundCall) -> Result<(), EngineError> {
        let deltas = rest_angles(call)?;
        self.state.queue_turns(deltas);
        Ok(())
    }

    pub(crate) fn set_position(&mut self, coord: Coord, call: &BoundCall) -> Result<(), EngineError> {
        let value = call.args.require_f64(coord.name())?;
        match coord {
            Coord::X => self.state.set_x(value),
            Coord::Z => self.state.set_z(value),
            Coord::Y => self.state.set_y(value),
        }
        Ok(())
    }

    pub(crate) fn set_velocity(&mut self, coord: Coord, call: &BoundCall) -> Result<(), EngineError> {
        let name = format!("v{}", coord.name());
        let value = call.args.require_f64(&name)?;
        self.write_velocity(coord, value);
        Ok(())
    }

    pub(crate) fn write_velocity(&mut self, coord: Coord, value: f64) {
        match coord {
            Coord::X => self.state.set_vx(value),
            Coord::Z => self.state.set_vz(value),
            Coord::Y => self.state.set_vy(value),
        }
    }

    pub(crate) fn set_slip(&mut self, call: &BoundCall) -> Result<(), EngineError> {
        let slip = call.args.require_f64("slip")? as f32;
        Ok(self.state.set_ground_slip(slip)?)
    }

    pub(crate) fn set_inertia(&mut self, call: &BoundCall) -> Result<(), EngineError> {
        let threshold = call.args.require_f64("threshold")?;
        let mode = match call.args.flag("single_axis") {
            Some(false) => InertiaMode::Combined,
            _ => InertiaMode::PerAxis,
        };
        Ok(self.state.set_inertia(threshold, mode)?)
    }

    /// `var(name, expr)`: stores the expression's value in the scope.
    pub(crate) fn assign_var(&mut self, call: &BoundCall, scope: &mut Scope) -> Result<(), EngineError> {
        let name = call.args.require_text("name")?.trim();
        if !is_identifier(name) {
            return Err(EngineError::value(format!("'{name}' is not a valid variable name")));
        }
        let value = evaluate(call.args.require_text("value")?, scope)?;
        debug!("var {name} = {value}");
        scope.insert(name.to_string(), Value::Float(value));
        Ok(())
    }

    /// `def(signature, body)`: registers a user function. Builtin names are reserved.
    pub(crate) fn define(&mut self, call: &BoundCall, scope: &Scope) -> Result<(), EngineError> {
        let (name, params) = parse_signature(call.args.require_text("signature")?, scope)?;
        if lookup_any(&name).is_some() {
            return Err(EngineError::Overwrite { name });
        }
        let body = call.args.require_text("body")?.to_string();
        debug!("def {name} with {} parameter(s)", params.len());
        self.functions
            .insert(name.clone(), Rc::new(UserFunction { name, params, body }));
        Ok(())
    }

    /// Runs the body once, then replays its bound calls; one-shot calls
    /// such as `var` and `def` run on the first pass only.
    pub(crate) fn repeat(
        &mut self,
        call: &BoundCall,
        scope: &mut Scope,
        sink: &mut dyn EventSink,
        frame: &Frame,
    ) -> Result<(), EngineError> {
        let count = call.args.require_i64("count")?;
        if count < 0 {
            return Err(EngineError::value(format!(
                "repeat() count must not be negative, got {count}"
            )));
        }
        if count == 0 {
            return Ok(());
        }
        let body = call.args.require_text("sequence")?;
        let child = frame.enter("repeat", self.config.max_depth)?;
        let calls = self.run_sequence(body, scope, sink, &child)?;
        for _ in 1..count {
            self.cancel.check()?;
            for replay in calls.iter().filter(|replay| !replay.is_once()) {
                self.dispatch(replay, scope, sink, &child)?;
            }
        }
        Ok(())
    }
}

fn rest_angles(call: &BoundCall) -> Result<Vec<f32>, EngineError> {
    call.args
        .rest()
        .iter()
        .map(|value| {
            value
                .as_f64()
                .map(|angle| angle as f32)
                .ok_or_else(|| EngineError::type_error(format!("angle must be a number, got {value}")))
        })
        .collect()
}
