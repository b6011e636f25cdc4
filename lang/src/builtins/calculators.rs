//! Solvers that probe a sequence on forked engines, and tick listeners.

use log::{debug, warn};
use mothball_core::{format_fixed, EventSink, NullSink, OutputEvent};

use crate::binder::BoundCall;
use crate::error::EngineError;
use crate::recording::{InertiaSession, PossibilitySession};
use crate::runtime::{Engine, Frame};
use crate::stdlib::{BuiltinDef, Coord};
use crate::value::Scope;

/// Largest travelled-distance error accepted without a warning.
const SOLVE_TOLERANCE: f64 = 1e-6;

impl Engine {
    /// Distance `body` travels along `coord` when started at `velocity`,
    /// measured on a fork; the engine itself is untouched.
    pub(crate) fn probe(
        &self,
        coord: Coord,
        velocity: f64,
        body: &str,
        scope: &Scope,
        frame: &Frame,
    ) -> Result<f64, EngineError> {
        let mut fork = self.fork();
        fork.write_velocity(coord, velocity);
        let start = fork.coordinate(coord);
        let mut fork_scope = scope.clone();
        fork.run_sequence(body, &mut fork_scope, &mut NullSink::default(), frame)?;
        Ok(fork.coordinate(coord) - start)
    }

    fn coordinate(&self, coord: Coord) -> f64 {
        match coord {
            Coord::X => self.state.x(),
            Coord::Z => self.state.z(),
            Coord::Y => self.state.y(),
        }
    }

    /// Finds the initial velocity along `coord` for which the sequence
    /// travels `goal`, then runs it for real from that velocity.
    ///
    /// Travelled distance is linear in the initial velocity until inertia
    /// zeroes it, so two probes at 0 and 1 fix the line.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn solve_velocity(
        &mut self,
        def: &BuiltinDef,
        coord: Coord,
        goal: f64,
        call: &BoundCall,
        scope: &mut Scope,
        sink: &mut dyn EventSink,
        frame: &Frame,
    ) -> Result<(), EngineError> {
        let body = call.args.require_text("sequence")?;
        let child = frame.enter(def.name, self.config.max_depth)?;
        let at_rest = self.probe(coord, 0.0, body, scope, &child)?;
        let at_one = self.probe(coord, 1.0, body, scope, &child)?;
        if at_one == at_rest {
            return Err(EngineError::zero_division(format!(
                "{}(): the sequence travels the same distance from every starting speed",
                def.name
            )));
        }
        let velocity = (goal - at_rest) / (at_one - at_rest);
        debug!("{} solved v{} = {velocity}", def.name, coord.name());

        let precision = self.state.precision();
        sink.emit(OutputEvent::axis(
            format!("{} v{}", def.name, coord.name()),
            velocity,
            precision,
        ));
        self.write_velocity(coord, velocity);
        let start = self.coordinate(coord);
        self.run_sequence(body, scope, sink, &child)?;
        let miss = self.coordinate(coord) - start - goal;
        if miss.abs() > SOLVE_TOLERANCE {
            warn!("{} missed its goal by {miss}", def.name);
            sink.emit(OutputEvent::warning(format!(
                "{}() missed the goal by {}; inertia was triggered",
                def.name,
                format_fixed(miss, precision)
            )));
        }
        Ok(())
    }

    pub(crate) fn run_possibility(
        &mut self,
        def: &BuiltinDef,
        axis: Option<Coord>,
        call: &BoundCall,
        scope: &mut Scope,
        sink: &mut dyn EventSink,
        frame: &Frame,
    ) -> Result<(), EngineError> {
        if self.recording.possibility.is_some() {
            return Err(EngineError::type_error(format!(
                "{}() cannot run inside another possibility",
                def.name
            )));
        }
        let min_distance = call.args.require_f64("mindistance")?;
        let increment = call.args.require_f64("increment")?;
        let miss = call.args.require_f64("miss")?;
        if !(increment > 0.0) || !increment.is_finite() {
            return Err(EngineError::value(format!(
                "{}() increment must be positive, got {increment}",
                def.name
            )));
        }
        if min_distance < 0.0 || miss < 0.0 {
            return Err(EngineError::value(format!(
                "{}() mindistance and miss must not be negative",
                def.name
            )));
        }
        let session = PossibilitySession {
            axes: match axis {
                Some(coord) => vec![coord],
                None => vec![Coord::X, Coord::Z],
            },
            min_distance,
            offset: call.args.require_f64("offset")?,
            increment,
            miss,
            label: call.args.text("label").unwrap_or(def.name).to_string(),
            start_tick: self.state.ticks(),
        };
        let body = call.args.require_text("sequence")?;
        let child = frame.enter(def.name, self.config.max_depth)?;
        self.recording.possibility = Some(session);
        let result = self.run_sequence(body, scope, sink, &child);
        self.recording.possibility = None;
        result.map(|_| ())
    }

    pub(crate) fn run_inertia_listener(
        &mut self,
        def: &BuiltinDef,
        call: &BoundCall,
        scope: &mut Scope,
        sink: &mut dyn EventSink,
        frame: &Frame,
    ) -> Result<(), EngineError> {
        if self.recording.inertia.is_some() {
            return Err(EngineError::type_error(format!(
                "{}() cannot run inside another inertia listener",
                def.name
            )));
        }
        let miss = call.args.require_f64("miss")?;
        if miss < 0.0 {
            return Err(EngineError::value(format!(
                "{}() miss must not be negative, got {miss}",
                def.name
            )));
        }
        let session = InertiaSession {
            miss,
            label: call.args.text("label").unwrap_or(def.name).to_string(),
            start_tick: self.state.ticks(),
        };
        let body = call.args.require_text("sequence")?;
        let child = frame.enter(def.name, self.config.max_depth)?;
        self.recording.inertia = Some(session);
        let result = self.run_sequence(body, scope, sink, &child);
        self.recording.inertia = None;
        result.map(|_| ())
    }
}
