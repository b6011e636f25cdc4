//! Maps decomposed tokens onto parameter shapes.

use mothball_core::{Keys, Modifiers, KEY_S, KEY_W};

use crate::decompose::{keyword_argument, parse_modifiers, Decomposed};
use crate::error::EngineError;
use crate::expr::evaluate;
use crate::function::FunctionDescriptor;
use crate::splitter::{split, SplitMode};
use crate::stdlib::{BuiltinDef, InputRule, Op, Param, ParamKind, ParamType};
use crate::value::{Scope, Value};

/// Arguments after binding, in parameter order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoundArgs {
    values: Vec<(String, Value)>,
    rest: Vec<Value>,
}

impl BoundArgs {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Numeric argument, `None` when unset or explicitly `None`.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_text)
    }

    pub fn require_f64(&self, name: &str) -> Result<f64, EngineError> {
        self.number(name)
            .ok_or_else(|| EngineError::type_error(format!("argument '{name}' must be a number")))
    }

    pub fn require_i64(&self, name: &str) -> Result<i64, EngineError> {
        match self.get(name) {
            Some(Value::Int(value)) => Ok(*value),
            _ => Err(EngineError::type_error(format!("argument '{name}' must be an integer"))),
        }
    }

    pub fn require_text(&self, name: &str) -> Result<&str, EngineError> {
        self.text(name)
            .ok_or_else(|| EngineError::type_error(format!("argument '{name}' must be text")))
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        match self.get(name) {
            Some(Value::Bool(value)) => Some(*value),
            Some(other) => other.as_f64().map(|v| v != 0.0),
            None => None,
        }
    }

    /// Surplus positionals collected by a variadic parameter.
    pub fn rest(&self) -> &[Value] {
        &self.rest
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }
}

#[derive(Clone, Debug)]
pub enum CallTarget {
    Function(FunctionDescriptor),
    /// Text held by a scope variable, run as a sequence.
    Sequence { name: String, body: String },
}

#[derive(Clone, Debug)]
pub struct BoundCall {
    pub target: CallTarget,
    pub reverse: bool,
    pub keys: Keys,
    pub modifiers: Modifiers,
    pub args: BoundArgs,
}

impl BoundCall {
    pub fn name(&self) -> &str {
        match &self.target {
            CallTarget::Function(descriptor) => descriptor.name(),
            CallTarget::Sequence { name, .. } => name,
        }
    }

    /// One-shot builtins run only on the first pass of a `repeat`.
    pub fn is_once(&self) -> bool {
        matches!(&self.target, CallTarget::Function(FunctionDescriptor::Builtin(def)) if def.once)
    }
}

pub fn bind_call(
    parts: &Decomposed,
    target: CallTarget,
    scope: &Scope,
    stack: &[String],
) -> Result<BoundCall, EngineError> {
    let (keys, modifiers, args) = match &target {
        CallTarget::Function(FunctionDescriptor::Builtin(def)) => {
            if parts.reverse && !def.reversible {
                return Err(EngineError::type_error(format!("{}() cannot be reversed", def.name)));
            }
            let keys = bind_keys(def, parts.input.as_deref())?;
            let modifiers = bind_modifiers(def.name, def.modifiers, parts.modifiers.as_deref())?;
            let args = bind(def.name, &def.params, parts.args.as_deref(), scope, stack)?;
            (keys, modifiers, args)
        }
        CallTarget::Function(FunctionDescriptor::User(func)) => {
            reject_call_decorations(&func.name, parts)?;
            let args = bind(&func.name, &func.params, parts.args.as_deref(), scope, stack)?;
            (Keys::NONE, Modifiers::NONE, args)
        }
        CallTarget::Sequence { name, .. } => {
            reject_call_decorations(name, parts)?;
            if parts.args.is_some() {
                return Err(EngineError::type_error(format!(
                    "'{name}' holds a sequence and takes no arguments"
                )));
            }
            (Keys::NONE, Modifiers::NONE, BoundArgs::default())
        }
    };
    Ok(BoundCall {
        target,
        reverse: parts.reverse,
        keys,
        modifiers,
        args,
    })
}

fn reject_call_decorations(name: &str, parts: &Decomposed) -> Result<(), EngineError> {
    if parts.reverse {
        return Err(EngineError::type_error(format!("{name}() cannot be reversed")));
    }
    if parts.input.is_some() {
        return Err(EngineError::type_error(format!("{name}() does not accept an input suffix")));
    }
    if parts.modifiers.is_some() {
        return Err(EngineError::type_error(format!("{name}() does not accept modifiers")));
    }
    Ok(())
}

pub fn bind_keys(def: &BuiltinDef, input: Option<&str>) -> Result<Keys, EngineError> {
    let parsed = match input {
        Some(text) => Some(
            Keys::parse(text).map_err(|err| EngineError::value(format!("{}(): {err}", def.name)))?,
        ),
        None => None,
    };
    match def.input {
        InputRule::None => {
            if parsed.is_some() {
                return Err(EngineError::type_error(format!(
                    "{}() does not accept an input suffix",
                    def.name
                )));
            }
            Ok(match def.op {
                Op::Move(gait) if gait.strafe45 => Keys::FORWARD_LEFT,
                _ => Keys::NONE,
            })
        }
        InputRule::Free => Ok(parsed.unwrap_or(Keys::FORWARD)),
        InputRule::Sprint => {
            let keys = parsed.unwrap_or(Keys::FORWARD);
            if !keys.contains(KEY_W) || keys.contains(KEY_S) {
                return Err(EngineError::type_error(format!(
                    "{}() input must hold 'w' and must not hold 's', got '{keys}'",
                    def.name
                )));
            }
            Ok(keys)
        }
    }
}

pub fn bind_modifiers(
    name: &str,
    allowed: Modifiers,
    text: Option<&str>,
) -> Result<Modifiers, EngineError> {
    let Some(text) = text else {
        return Ok(Modifiers::NONE);
    };
    let mods = parse_modifiers(text)?;
    let rejected = mods.outside(allowed);
    if !rejected.is_empty() {
        return Err(EngineError::type_error(format!(
            "{name}() does not accept modifier {rejected}"
        )));
    }
    Ok(mods)
}

/// Binds the raw argument text of one call onto `params`.
pub fn bind(
    fn_name: &str,
    params: &[Param],
    raw: Option<&str>,
    scope: &Scope,
    stack: &[String],
) -> Result<BoundArgs, EngineError> {
    let mut positionals: Vec<String> = Vec::new();
    let mut keywords: Vec<(String, String)> = Vec::new();
    if let Some(raw) = raw.filter(|text| !text.trim().is_empty()) {
        for piece in split(raw, SplitMode::Arguments, stack)? {
            let piece = piece.trim();
            if piece.is_empty() {
                return Err(EngineError::syntax(format!("empty argument in {fn_name}()")));
            }
            match keyword_argument(piece)? {
                Some((name, value)) => {
                    if keywords.iter().any(|(seen, _)| *seen == name) {
                        return Err(EngineError::type_error(format!(
                            "{fn_name}() keyword argument repeated: '{name}'"
                        )));
                    }
                    keywords.push((name, value));
                }
                None if !keywords.is_empty() => {
                    return Err(EngineError::type_error(format!(
                        "{fn_name}() positional argument follows keyword argument"
                    )));
                }
                None => positionals.push(piece.to_string()),
            }
        }
    }

    let mut slots: Vec<Option<Value>> = vec![None; params.len()];
    let mut rest = Vec::new();
    let positional_slots: Vec<usize> = params
        .iter()
        .enumerate()
        .filter(|(_, p)| matches!(p.kind, ParamKind::PositionalOnly | ParamKind::PositionalOrKeyword))
        .map(|(index, _)| index)
        .collect();
    let variadic = params.iter().find(|p| p.kind == ParamKind::Variadic);

    for (position, text) in positionals.iter().enumerate() {
        match positional_slots.get(position) {
            Some(&index) => slots[index] = Some(coerce(fn_name, &params[index], text, scope)?),
            None => match variadic {
                Some(param) => rest.push(coerce(fn_name, param, text, scope)?),
                None => {
                    return Err(EngineError::type_error(format!(
                        "{fn_name}() takes {} positional argument{} but {} were given",
                        positional_slots.len(),
                        plural(positional_slots.len()),
                        positionals.len()
                    )));
                }
            },
        }
    }

    for (name, text) in &keywords {
        let Some(index) = params.iter().position(|p| p.name == *name && p.kind != ParamKind::Variadic) else {
            return Err(EngineError::type_error(format!(
                "{fn_name}() got an unexpected keyword argument '{name}'"
            )));
        };
        if params[index].kind == ParamKind::PositionalOnly {
            return Err(EngineError::type_error(format!(
                "{fn_name}() got a positional-only argument passed as keyword: '{name}'"
            )));
        }
        if slots[index].is_some() {
            return Err(EngineError::type_error(format!(
                "{fn_name}() got multiple values for argument '{name}'"
            )));
        }
        slots[index] = Some(coerce(fn_name, &params[index], text, scope)?);
    }

    let mut missing_positional = Vec::new();
    let mut missing_keyword = Vec::new();
    for (slot, param) in slots.iter_mut().zip(params) {
        if slot.is_some() || param.kind == ParamKind::Variadic {
            continue;
        }
        match &param.default {
            Some(default) => *slot = Some(default.clone()),
            None if param.name == "duration" => *slot = Some(Value::Int(1)),
            None if param.name == "label" => *slot = Some(Value::Text(fn_name.to_string())),
            None if param.kind == ParamKind::KeywordOnly => missing_keyword.push(param.name.as_str()),
            None => missing_positional.push(param.name.as_str()),
        }
    }
    if !missing_positional.is_empty() {
        return Err(missing_error(fn_name, "positional", &missing_positional));
    }
    if !missing_keyword.is_empty() {
        return Err(missing_error(fn_name, "keyword-only", &missing_keyword));
    }

    let values = params
        .iter()
        .zip(slots)
        .filter_map(|(param, slot)| slot.map(|value| (param.name.clone(), value)))
        .collect();
    Ok(BoundArgs { values, rest })
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

fn missing_error(fn_name: &str, kind: &str, names: &[&str]) -> EngineError {
    let quoted: Vec<String> = names.iter().map(|name| format!("'{name}'")).collect();
    let listed = match quoted.as_slice() {
        [one] => one.clone(),
        [first, second] => format!("{first} and {second}"),
        [init @ .., last] => format!("{}, and {last}", init.join(", ")),
        [] => String::new(),
    };
    EngineError::type_error(format!(
        "{fn_name}() missing {} required {kind} argument{}: {listed}",
        names.len(),
        plural(names.len())
    ))
}

/// Converts one argument's text to the parameter's declared type.
///
/// A parameter named `duration` is always a non-negative integer.
pub fn coerce(fn_name: &str, param: &Param, text: &str, scope: &Scope) -> Result<Value, EngineError> {
    if text == "None" && param.default == Some(Value::None) {
        return Ok(Value::None);
    }
    let ty = if param.name == "duration" {
        ParamType::Int
    } else {
        param.ty
    };
    match ty {
        ParamType::Int => {
            let value = evaluate(text, scope)?;
            if !value.is_finite() || value.fract() != 0.0 {
                return Err(EngineError::type_error(format!(
                    "{fn_name}() argument '{}' must be an integer, got {text}",
                    param.name
                )));
            }
            if param.name == "duration" && value < 0.0 {
                return Err(EngineError::value(format!(
                    "{fn_name}() duration must be a non-negative integer, got {value}"
                )));
            }
            Ok(Value::Int(value as i64))
        }
        ParamType::Float => Ok(Value::Float(evaluate(text, scope)?)),
        ParamType::Bool => match text.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" => Ok(Value::Bool(true)),
            "false" | "no" | "off" => Ok(Value::Bool(false)),
            _ => Ok(Value::Bool(evaluate(text, scope)? != 0.0)),
        },
        ParamType::Text | ParamType::Sequence => Ok(Value::Text(text.to_string())),
    }
}
