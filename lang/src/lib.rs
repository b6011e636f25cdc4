// mothball-lang/src/lib.rs
// Mothball sequence language: splitting, binding and the execution engine.
//
// - splitter/decompose: text to call tokens
// - binder: call tokens to typed arguments
// - runtime/builtins: dispatch onto the tick models in mothball-core

pub mod binder;
mod builtins;
pub mod cancel;
pub mod config;
pub mod decompose;
pub mod error;
pub mod expr;
pub mod function;
pub mod recording;
pub mod runtime;
pub mod splitter;
pub mod stdlib;
pub mod suggest;
pub mod value;

pub use binder::{BoundArgs, BoundCall, CallTarget};
pub use cancel::CancelToken;
pub use config::{ConfigError, EngineConfig, DEFAULT_MAX_DEPTH};
pub use error::EngineError;
pub use expr::evaluate;
pub use function::{FunctionDescriptor, UserFunction};
pub use runtime::Engine;
pub use stdlib::{family_members, lookup, lookup_any, BuiltinDef, Family};
pub use suggest::get_suggestions;
pub use value::{Scope, Value};

use mothball_core::{AxisModel, OutputEvent};

/// Convenience: runs `sequence` on a fresh engine, errors included as text.
pub fn simulate(axis: AxisModel, sequence: &str) -> Vec<OutputEvent> {
    Engine::new(axis)
        .simulate(sequence, true, &mut Scope::new(), false)
        .unwrap_or_else(|err| vec![OutputEvent::text(err.to_string())])
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::runtime::Frame;
    use mothball_core::EventSink;
    use std::time::Duration;

    fn lines(axis: AxisModel, sequence: &str) -> Vec<String> {
        simulate(axis, sequence).iter().map(ToString::to_string).collect()
    }

    #[test]
    fn var_then_print() {
        assert_eq!(lines(AxisModel::Horizontal, "var(a, 10) print(Value is {a})"), vec!["Value is 10"]);
    }

    #[test]
    fn defaults_follow_a_silent_run() {
        let out = lines(AxisModel::Horizontal, "s(12)");
        let labels: Vec<&str> = out.iter().filter_map(|line| line.split(':').next()).collect();
        assert_eq!(labels, vec!["X", "Z", "VX", "VZ"]);
        assert!(out[3].starts_with("VZ: 0.28"), "{}", out[3]);
    }

    #[test]
    fn comments_and_reset_shorthand() {
        let out = lines(AxisModel::Horizontal, "s(3) # ignored(1) # | outz outx");
        assert_eq!(out, vec!["outz: 0.000000", "outx: 0.000000"]);
        let out = lines(AxisModel::Vertical, "j(3) | outy");
        assert_eq!(out, vec!["outy: 0.000000"]);
    }

    #[test]
    fn function_parameters_do_not_leak() {
        let mut engine = Engine::new(AxisModel::Horizontal);
        let mut scope = Scope::new();
        scope.insert("n".to_string(), Value::Float(7.0));
        let out = engine
            .simulate(
                "def(go(n: int), var(inner, 1) s(n)) go(2) print({n})",
                false,
                &mut scope,
                true,
            )
            .expect("run");
        assert_eq!(out.iter().map(ToString::to_string).collect::<Vec<_>>(), vec!["7"]);
        assert!(scope.get("inner").is_none());
        assert_eq!(engine.state().ticks(), 2);
    }

    #[test]
    fn variadic_user_parameters_join_as_text() {
        let out = lines(AxisModel::Horizontal, "def(say(*words: text), print({words})) say(a, b)");
        assert_eq!(out, vec!["a b"]);
    }

    #[test]
    fn runaway_recursion_is_reported() {
        let mut engine = Engine::with_config(
            AxisModel::Horizontal,
            EngineConfig {
                max_depth: 16,
                ..EngineConfig::default()
            },
        )
        .expect("config");
        let err = engine
            .simulate("def(loop, s loop) loop", false, &mut Scope::new(), true)
            .expect_err("recursion");
        assert_eq!(err, EngineError::Recursion { depth: 16 });
        assert_eq!(engine.state().ticks(), 16);
    }

    #[test]
    fn cancelled_engines_stop_with_interrupted() {
        let mut engine = Engine::new(AxisModel::Horizontal);
        let token = engine.cancel_token();
        token.cancel();
        let err = engine
            .simulate("s(100)", false, &mut Scope::new(), true)
            .expect_err("cancelled");
        assert_eq!(err.code(), "Interrupted");
        assert_eq!(engine.state().ticks(), 0);
        token.reset();
        engine.simulate("s(1)", false, &mut Scope::new(), true).expect("after reset");
        assert_eq!(engine.state().ticks(), 1);
    }

    /// Sink that trips the cancel flag once it has seen `limit` events.
    struct CancelAfter {
        token: CancelToken,
        limit: usize,
        events: Vec<OutputEvent>,
    }

    impl EventSink for CancelAfter {
        fn emit(&mut self, event: OutputEvent) {
            self.events.push(event);
            if self.events.len() >= self.limit {
                self.token.cancel();
            }
        }

        fn emitted(&self) -> usize {
            self.events.len()
        }
    }

    #[test]
    fn cancelling_during_repeat_stops_before_the_next_pass() {
        let mut engine = Engine::new(AxisModel::Horizontal);
        let mut sink = CancelAfter {
            token: engine.cancel_token(),
            limit: 3,
            events: Vec::new(),
        };
        let err = engine
            .run_sequence("repeat(s outz, 50)", &mut Scope::new(), &mut sink, &Frame::default())
            .expect_err("cancelled");
        assert_eq!(err, EngineError::Interrupted);
        assert_eq!(engine.state().ticks(), 3);
        assert_eq!(sink.events.len(), 3);
    }

    #[test]
    fn cancelling_from_another_thread_stops_a_long_mover() {
        let mut engine = Engine::new(AxisModel::Horizontal);
        let token = engine.cancel_token();
        let canceller = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            token.cancel();
        });
        let err = engine
            .simulate("s(1000000000)", false, &mut Scope::new(), true)
            .expect_err("cancelled");
        canceller.join().expect("cancel thread");
        assert_eq!(err.code(), "Interrupted");
        assert!(engine.state().ticks() < 1_000_000_000);
    }

    #[test]
    fn argument_errors_point_into_the_whole_call() {
        let err = Engine::new(AxisModel::Horizontal)
            .simulate("s(1)(2)", false, &mut Scope::new(), true)
            .expect_err("stray bracket");
        match &err {
            EngineError::Syntax { offset, context, .. } => {
                assert_eq!(*offset, Some(3));
                assert_eq!(context.as_deref(), Some("  s(1)(2)\n     ^"));
            }
            other => panic!("unexpected {other}"),
        }
    }

    #[test]
    fn errors_keep_earlier_output_in_lenient_mode() {
        let out = lines(AxisModel::Horizontal, "outz sprint(1");
        assert_eq!(out.len(), 1);
        assert!(out[0].starts_with("SyntaxError"), "{}", out[0]);

        let out = lines(AxisModel::Horizontal, "outz nosuch");
        assert_eq!(out.len(), 2);
        assert!(out[1].starts_with("NameError"), "{}", out[1]);
    }

    #[test]
    fn config_settings_reach_the_state() {
        let config = EngineConfig::from_json_str(r#"{ "precision": 2, "ground_slip": 0.98 }"#).expect("json");
        let mut engine = Engine::with_config(AxisModel::Horizontal, config).expect("engine");
        let out = engine
            .simulate("z(1.23456) outz", false, &mut Scope::new(), true)
            .expect("run");
        assert_eq!(out[0].to_string(), "outz: 1.23");
        assert_eq!(engine.state().ground_slip(), 0.98);
    }
}
