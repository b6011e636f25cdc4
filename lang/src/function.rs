//! User-defined functions and the descriptor shared with builtins.

use std::rc::Rc;

use crate::decompose::{is_identifier, keyword_argument};
use crate::error::EngineError;
use crate::expr::evaluate;
use crate::splitter::{split, SplitMode};
use crate::stdlib::{format_signature, BuiltinDef, Param, ParamKind, ParamType};
use crate::value::{Scope, Value};

#[derive(Clone, Debug, PartialEq)]
pub struct UserFunction {
    pub name: String,
    pub params: Vec<Param>,
    pub body: String,
}

impl UserFunction {
    pub fn signature(&self) -> String {
        format_signature(&self.name, &self.params)
    }
}

#[derive(Clone, Debug)]
pub enum FunctionDescriptor {
    Builtin(&'static BuiltinDef),
    User(Rc<UserFunction>),
}

impl FunctionDescriptor {
    pub fn name(&self) -> &str {
        match self {
            FunctionDescriptor::Builtin(def) => def.name,
            FunctionDescriptor::User(func) => &func.name,
        }
    }

    pub fn signature(&self) -> String {
        match self {
            FunctionDescriptor::Builtin(def) => def.signature(),
            FunctionDescriptor::User(func) => func.signature(),
        }
    }
}

/// Parses `name(a, b: int = 5, /, *rest, k = 1)` into a name and parameters.
///
/// Untyped parameters are floats. Defaults are evaluated against `scope` now.
pub fn parse_signature(text: &str, scope: &Scope) -> Result<(String, Vec<Param>), EngineError> {
    let text = text.trim();
    let (name, inner) = match text.find('(') {
        Some(open) if text.ends_with(')') => (text[..open].trim(), &text[open + 1..text.len() - 1]),
        Some(_) => {
            return Err(EngineError::syntax(format!(
                "function signature '{text}' must end with ')'"
            )))
        }
        None => (text, ""),
    };
    if !is_identifier(name) {
        return Err(EngineError::syntax(format!("'{name}' is not a valid function name")));
    }

    let mut params: Vec<Param> = Vec::new();
    let mut keyword_only = false;
    if !inner.trim().is_empty() {
        for piece in split(inner, SplitMode::Arguments, &[name.to_string()])? {
            let piece = piece.trim();
            match piece {
                "" => return Err(EngineError::syntax(format!("empty parameter in '{text}'"))),
                "/" => {
                    for param in params.iter_mut() {
                        if param.kind == ParamKind::PositionalOrKeyword {
                            param.kind = ParamKind::PositionalOnly;
                        }
                    }
                    continue;
                }
                "*" => {
                    keyword_only = true;
                    continue;
                }
                _ => {}
            }
            let (variadic, declaration) = match piece.strip_prefix('*') {
                Some(rest) => (true, rest.trim()),
                None => (false, piece),
            };
            let param = parse_param(declaration, variadic, keyword_only, scope)?;
            if params.iter().any(|existing| existing.name == param.name) {
                return Err(EngineError::syntax(format!(
                    "duplicate parameter '{}' in '{name}'",
                    param.name
                )));
            }
            if variadic {
                if keyword_only {
                    return Err(EngineError::syntax(format!("'{name}' has more than one '*'")));
                }
                keyword_only = true;
            }
            params.push(param);
        }
    }
    Ok((name.to_string(), params))
}

fn parse_param(
    declaration: &str,
    variadic: bool,
    keyword_only: bool,
    scope: &Scope,
) -> Result<Param, EngineError> {
    let (head, default_text) = match keyword_argument(declaration)? {
        Some((head, value)) => (head, Some(value)),
        None => match declaration.split_once('=') {
            Some((head, value)) => (head.trim().to_string(), Some(value.trim().to_string())),
            None => (declaration.to_string(), None),
        },
    };
    let (name, ty) = match head.split_once(':') {
        Some((name, ty)) => {
            let ty = ParamType::parse(ty)
                .ok_or_else(|| EngineError::syntax(format!("unknown parameter type '{}'", ty.trim())))?;
            (name.trim().to_string(), ty)
        }
        None => (head.trim().to_string(), ParamType::Float),
    };
    if !is_identifier(&name) {
        return Err(EngineError::syntax(format!("'{name}' is not a valid parameter name")));
    }
    if variadic && default_text.is_some() {
        return Err(EngineError::syntax(format!("variadic parameter '{name}' cannot have a default")));
    }
    let default = match default_text {
        Some(text) => Some(default_value(&text, ty, scope)?),
        None => None,
    };
    let kind = if variadic {
        ParamKind::Variadic
    } else if keyword_only {
        ParamKind::KeywordOnly
    } else {
        ParamKind::PositionalOrKeyword
    };
    Ok(Param {
        name,
        kind,
        ty,
        default,
    })
}

fn default_value(text: &str, ty: ParamType, scope: &Scope) -> Result<Value, EngineError> {
    if text == "None" {
        return Ok(Value::None);
    }
    Ok(match ty {
        ParamType::Int => Value::Int(evaluate(text, scope)?.round() as i64),
        ParamType::Float => Value::Float(evaluate(text, scope)?),
        ParamType::Bool => Value::Bool(evaluate(text, scope)? != 0.0),
        ParamType::Text | ParamType::Sequence => Value::Text(text.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_with_every_kind() {
        let (name, params) =
            parse_signature("f(a, b: int = 5, /, moves: sequence, *rest, k = 1)", &Scope::new())
                .expect("signature");
        assert_eq!(name, "f");
        let kinds: Vec<_> = params.iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ParamKind::PositionalOnly,
                ParamKind::PositionalOnly,
                ParamKind::PositionalOrKeyword,
                ParamKind::Variadic,
                ParamKind::KeywordOnly,
            ]
        );
        assert_eq!(params[1].default, Some(Value::Int(5)));
        assert_eq!(params[2].ty, ParamType::Sequence);
        assert_eq!(params[4].default, Some(Value::Float(1.0)));
    }

    #[test]
    fn bare_name_declares_no_parameters() {
        let (name, params) = parse_signature("combo", &Scope::new()).expect("signature");
        assert_eq!(name, "combo");
        assert!(params.is_empty());
        let (_, params) = parse_signature("combo()", &Scope::new()).expect("signature");
        assert!(params.is_empty());
    }

    #[test]
    fn malformed_signatures_fail() {
        for bad in ["1f(a)", "f(a", "f(a, a)", "f(x: vec)", "f(*a, *b)", "f(*a = 1)"] {
            assert_eq!(
                parse_signature(bad, &Scope::new()).expect_err(bad).code(),
                "SyntaxError",
                "{bad}"
            );
        }
    }

    #[test]
    fn rendered_signature_round_trips_kinds() {
        let (name, params) =
            parse_signature("g(n: int = 5, angle, *, k = 1)", &Scope::new()).expect("signature");
        let func = UserFunction {
            name,
            params,
            body: String::new(),
        };
        assert_eq!(func.signature(), "g(n: int = 5, angle: float, *, k: float = 1)");
    }
}
