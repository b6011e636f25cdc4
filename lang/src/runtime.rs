//! Sequence execution: split, decompose, bind, dispatch.

use std::collections::BTreeMap;
use std::rc::Rc;

use log::debug;
use mothball_core::{AxisModel, EventSink, OutputEvent, PlayerState, VecEventSink};

use crate::binder::{bind_call, BoundArgs, BoundCall, CallTarget};
use crate::cancel::CancelToken;
use crate::config::EngineConfig;
use crate::decompose::{decompose, Decomposed};
use crate::error::EngineError;
use crate::function::{FunctionDescriptor, UserFunction};
use crate::recording::Recording;
use crate::splitter::{expand_shorthand, split, strip_comments, SplitMode};
use crate::stdlib::{builtin_names, lookup, lookup_any, ParamKind};
use crate::suggest::get_suggestions;
use crate::value::{Scope, Value};

/// Call depth and the chain of enclosing calls, for limits and error context.
#[derive(Clone, Debug, Default)]
pub(crate) struct Frame {
    depth: usize,
    stack: Vec<String>,
}

impl Frame {
    pub(crate) fn stack(&self) -> &[String] {
        &self.stack
    }

    pub(crate) fn enter(&self, name: &str, max_depth: usize) -> Result<Frame, EngineError> {
        let depth = self.depth + 1;
        if depth > max_depth {
            return Err(EngineError::Recursion { depth: max_depth });
        }
        let mut stack = self.stack.clone();
        stack.push(name.to_string());
        Ok(Frame { depth, stack })
    }
}

/// One player, its user functions and the listeners armed on it.
pub struct Engine {
    pub(crate) axis: AxisModel,
    pub(crate) state: PlayerState,
    pub(crate) recording: Recording,
    pub(crate) functions: BTreeMap<String, Rc<UserFunction>>,
    pub(crate) config: EngineConfig,
    pub(crate) cancel: CancelToken,
}

impl Engine {
    pub fn new(axis: AxisModel) -> Self {
        Self {
            axis,
            state: PlayerState::new(axis),
            recording: Recording::default(),
            functions: BTreeMap::new(),
            config: EngineConfig::default(),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_config(axis: AxisModel, config: EngineConfig) -> Result<Self, EngineError> {
        let mut state = PlayerState::new(axis);
        config.apply(&mut state)?;
        Ok(Self {
            axis,
            state,
            recording: Recording::default(),
            functions: BTreeMap::new(),
            config,
            cancel: CancelToken::new(),
        })
    }

    pub fn axis(&self) -> AxisModel {
        self.axis
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    /// Handle that interrupts the running sequence from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Signature of a builtin or user function.
    pub fn signature(&self, name: &str) -> Result<String, EngineError> {
        if let Some(def) = lookup(name, self.axis).or_else(|| lookup_any(name)) {
            return Ok(def.signature());
        }
        if let Some(func) = self.functions.get(name) {
            return Ok(func.signature());
        }
        Err(self.unknown_name(name))
    }

    /// Closest builtin and user function names to a misspelled `name`.
    pub fn suggestions(&self, name: &str) -> Vec<String> {
        let user = self.functions.keys().map(String::as_str);
        get_suggestions(name, builtin_names(self.axis).into_iter().chain(user))
    }

    /// Runs `sequence` and returns everything it printed.
    ///
    /// With `return_defaults`, a run that printed nothing ends with the
    /// position and velocity readouts. Outside `strict` mode an error is
    /// appended to the output as text instead of being returned.
    pub fn simulate(
        &mut self,
        sequence: &str,
        return_defaults: bool,
        scope: &mut Scope,
        strict: bool,
    ) -> Result<Vec<OutputEvent>, EngineError> {
        debug!("simulate {} chars on the {} model", sequence.len(), self.axis);
        let mut sink = VecEventSink::default();
        let result = self.run_sequence(sequence, scope, &mut sink, &Frame::default());
        self.recording = Recording::default();
        match result {
            Ok(_) => {
                if return_defaults && sink.emitted() == 0 {
                    self.default_readout(&mut sink);
                }
                Ok(sink.into_events())
            }
            Err(err) if strict => Err(err),
            Err(err) => {
                debug!("sequence failed: {err}");
                sink.emit(OutputEvent::text(err.to_string()));
                Ok(sink.into_events())
            }
        }
    }

    fn default_readout(&self, sink: &mut dyn EventSink) {
        let precision = self.state.precision();
        let readouts: Vec<(&str, f64)> = match self.axis {
            AxisModel::Horizontal => vec![
                ("X", self.state.x()),
                ("Z", self.state.z()),
                ("VX", self.state.vx()),
                ("VZ", self.state.vz()),
            ],
            AxisModel::Vertical => vec![("Y", self.state.y()), ("VY", self.state.vy())],
        };
        for (label, value) in readouts {
            sink.emit(OutputEvent::axis(label, value, precision));
        }
    }

    /// Executes every call of `text` in order and returns the bound calls.
    pub(crate) fn run_sequence(
        &mut self,
        text: &str,
        scope: &mut Scope,
        sink: &mut dyn EventSink,
        frame: &Frame,
    ) -> Result<Vec<BoundCall>, EngineError> {
        let stripped = strip_comments(text);
        let expanded = expand_shorthand(&stripped, self.axis);
        let tokens = split(&expanded, SplitMode::Sequence, frame.stack())?;
        let mut calls = Vec::with_capacity(tokens.len());
        for token in tokens {
            self.cancel.check()?;
            let parts = decompose(&token, frame.stack())?;
            let target = self.resolve(&parts, scope)?;
            let call = bind_call(&parts, target, scope, frame.stack())
                .map_err(|err| err.relocated(&token, parts.args_at))?;
            self.dispatch(&call, scope, sink, frame)?;
            calls.push(call);
        }
        Ok(calls)
    }

    /// Runs `text` one level deeper, named `name` in the call chain.
    pub(crate) fn run_nested(
        &mut self,
        name: &str,
        text: &str,
        scope: &mut Scope,
        sink: &mut dyn EventSink,
        frame: &Frame,
    ) -> Result<Vec<BoundCall>, EngineError> {
        let child = frame.enter(name, self.config.max_depth)?;
        self.run_sequence(text, scope, sink, &child)
    }

    fn resolve(&self, parts: &Decomposed, scope: &Scope) -> Result<CallTarget, EngineError> {
        if let Some(def) = lookup(&parts.name, self.axis) {
            return Ok(CallTarget::Function(FunctionDescriptor::Builtin(def)));
        }
        if let Some(func) = self.functions.get(&parts.name) {
            return Ok(CallTarget::Function(FunctionDescriptor::User(Rc::clone(func))));
        }
        if let Some(Value::Text(body)) = scope.get(&parts.name) {
            return Ok(CallTarget::Sequence {
                name: parts.name.clone(),
                body: body.clone(),
            });
        }
        Err(self.unknown_name(&parts.name))
    }

    pub(crate) fn unknown_name(&self, name: &str) -> EngineError {
        let suggestions = self.suggestions(name);
        if suggestions.is_empty() {
            EngineError::name(format!("name '{name}' is not defined"))
        } else {
            EngineError::name(format!(
                "name '{name}' is not defined. Did you mean: {}?",
                suggestions.join(", ")
            ))
        }
    }

    pub(crate) fn dispatch(
        &mut self,
        call: &BoundCall,
        scope: &mut Scope,
        sink: &mut dyn EventSink,
        frame: &Frame,
    ) -> Result<(), EngineError> {
        self.cancel.check()?;
        debug!("dispatch {} at depth {}", call.name(), frame.depth);
        match &call.target {
            CallTarget::Function(FunctionDescriptor::Builtin(def)) => {
                self.dispatch_builtin(def, call, scope, sink, frame)
            }
            CallTarget::Function(FunctionDescriptor::User(func)) => {
                self.call_user(func, &call.args, scope, sink, frame)
            }
            CallTarget::Sequence { name, body } => {
                self.run_nested(name, body, scope, sink, frame).map(|_| ())
            }
        }
    }

    /// Runs a user function with its arguments layered over the caller's
    /// scope; the caller's scope is restored afterwards.
    fn call_user(
        &mut self,
        func: &UserFunction,
        args: &BoundArgs,
        scope: &mut Scope,
        sink: &mut dyn EventSink,
        frame: &Frame,
    ) -> Result<(), EngineError> {
        let child = frame.enter(&func.name, self.config.max_depth)?;
        let snapshot = scope.clone();
        for (name, value) in args.iter() {
            scope.insert(name.to_string(), value.clone());
        }
        if let Some(param) = func.params.iter().find(|p| p.kind == ParamKind::Variadic) {
            let joined: Vec<String> = args.rest().iter().map(Value::to_string).collect();
            scope.insert(param.name.clone(), Value::Text(joined.join(" ")));
        }
        let result = self.run_sequence(&func.body, scope, sink, &child);
        *scope = snapshot;
        result.map(|_| ())
    }

    /// Copy of the player and functions for side-effect-free trial runs.
    pub(crate) fn fork(&self) -> Engine {
        Engine {
            axis: self.axis,
            state: self.state.clone(),
            recording: Recording::default(),
            functions: self.functions.clone(),
            config: self.config.clone(),
            cancel: self.cancel.clone(),
        }
    }
}
