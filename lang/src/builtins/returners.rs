use mothball_core::{format_number, EventSink, OutputEvent};

use super::sign;
use crate::binder::BoundCall;
use crate::error::EngineError;
use crate::expr::evaluate;
use crate::runtime::Engine;
use crate::stdlib::{family_members, lookup_any, BuiltinDef, Coord, Family, Readout};
use crate::value::{Scope, Value};

/// Half a player width; the gap between block distance and momentum.
const HALF_WIDTH: f64 = 0.6;

impl Engine {
    fn position(&self, coord: Coord) -> f64 {
        match coord {
            Coord::X => self.state.x(),
            Coord::Z => self.state.z(),
            Coord::Y => self.state.y(),
        }
    }

    fn emit_value(&self, def: &BuiltinDef, call: &BoundCall, value: f64, sink: &mut dyn EventSink) {
        let label = call.args.text("label").unwrap_or(def.name);
        let precision = self.state.precision();
        let event = match call.args.number("center") {
            Some(center) => OutputEvent::centered(label, value, center, precision),
            None => OutputEvent::axis(label, value, precision),
        };
        sink.emit(event);
    }

    pub(crate) fn out_readout(
        &self,
        def: &BuiltinDef,
        readout: Readout,
        call: &BoundCall,
        sink: &mut dyn EventSink,
    ) {
        let value = match readout {
            Readout::Pos(coord) => self.position(coord),
            Readout::Vel(Coord::X) => self.state.vx(),
            Readout::Vel(Coord::Z) => self.state.vz(),
            Readout::Vel(Coord::Y) => self.state.vy(),
            Readout::Angle => self.state.facing() as f64,
        };
        self.emit_value(def, call, value, sink);
    }

    pub(crate) fn out_mm(&self, def: &BuiltinDef, coord: Coord, call: &BoundCall, sink: &mut dyn EventSink) {
        let distance = self.position(coord);
        self.emit_value(def, call, distance - HALF_WIDTH * sign(distance), sink);
    }

    pub(crate) fn out_blocks(&self, def: &BuiltinDef, coord: Coord, call: &BoundCall, sink: &mut dyn EventSink) {
        let distance = self.position(coord);
        self.emit_value(def, call, distance + HALF_WIDTH * sign(distance), sink);
    }

    /// Speed and heading of the velocity; the heading uses facing degrees.
    pub(crate) fn out_vec(&self, def: &BuiltinDef, call: &BoundCall, sink: &mut dyn EventSink) {
        let (vx, vz) = (self.state.vx(), self.state.vz());
        let label = call.args.text("label").unwrap_or(def.name);
        let precision = self.state.precision();
        let speed = vx.hypot(vz);
        let speed_label = format!("{label} speed");
        sink.emit(match call.args.number("center") {
            Some(center) => OutputEvent::centered(speed_label, speed, center, precision),
            None => OutputEvent::axis(speed_label, speed, precision),
        });
        let angle = (-vx).atan2(vz).to_degrees();
        sink.emit(OutputEvent::axis(format!("{label} angle"), angle, precision));
    }

    pub(crate) fn print(&self, call: &BoundCall, scope: &Scope, sink: &mut dyn EventSink) -> Result<(), EngineError> {
        let mut pieces = Vec::with_capacity(call.args.rest().len());
        for value in call.args.rest() {
            pieces.push(self.interpolate(&value.to_string(), scope)?);
        }
        sink.emit(OutputEvent::text(pieces.join(", ")));
        Ok(())
    }

    /// Replaces `{expr}` with its value; `\x` emits `x` literally.
    fn interpolate(&self, text: &str, scope: &Scope) -> Result<String, EngineError> {
        let mut out = String::with_capacity(text.len());
        let mut chars = text.chars();
        while let Some(ch) = chars.next() {
            match ch {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '{' => {
                    let mut expr = String::new();
                    let mut closed = false;
                    for inner in chars.by_ref() {
                        if inner == '}' {
                            closed = true;
                            break;
                        }
                        expr.push(inner);
                    }
                    if !closed {
                        return Err(EngineError::syntax(format!("unclosed '{{' in print text '{text}'")));
                    }
                    let key = expr.trim();
                    match scope.get(key) {
                        Some(Value::Text(held)) => out.push_str(held),
                        _ => {
                            let value = evaluate(key, scope)?;
                            out.push_str(&format_number(value, self.state.precision()));
                        }
                    }
                }
                _ => out.push(ch),
            }
        }
        Ok(out)
    }

    pub(crate) fn help(&self, call: &BoundCall, sink: &mut dyn EventSink) -> Result<(), EngineError> {
        let Some(name) = call.args.text("name") else {
            for family in Family::ALL {
                let names: Vec<&str> = family_members(family, self.axis)
                    .iter()
                    .map(|def| def.name)
                    .collect();
                if !names.is_empty() {
                    sink.emit(OutputEvent::text(format!("{family}: {}", names.join(", "))));
                }
            }
            if !self.functions.is_empty() {
                let names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
                sink.emit(OutputEvent::text(format!("user functions: {}", names.join(", "))));
            }
            return Ok(());
        };
        let name = name.trim();
        if let Some(def) = lookup_any(name) {
            sink.emit(OutputEvent::text(def.describe()));
            return Ok(());
        }
        if let Some(func) = self.functions.get(name) {
            sink.emit(OutputEvent::text(func.signature()));
            return Ok(());
        }
        Err(self.unknown_name(name))
    }
}
