//! One sequence token into its parts: `-name.keys[modifiers](args)`.

use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};

use mothball_core::{modifier_bit_from_name, Modifiers};

use crate::error::EngineError;

const COMMAND_PATTERN: &str =
    r"^(-)?([A-Za-z_][A-Za-z0-9_]*)(?:\.([A-Za-z0-9]*))?(?:\[([^\[\]]*)\])?(?:\((.*)\))?";
const KEYWORD_PATTERN: &str = r"^([A-Za-z_][A-Za-z0-9_]*)\s*=";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decomposed {
    pub reverse: bool,
    pub name: String,
    /// Text after `.`, when present.
    pub input: Option<String>,
    /// Text inside `[...]`, when present.
    pub modifiers: Option<String>,
    /// Text inside `(...)`, when present.
    pub args: Option<String>,
    /// Character offset of `args` within the token.
    pub args_at: usize,
}

fn cached(cell: &'static OnceLock<Result<Regex, String>>, pattern: &str) -> Result<&'static Regex, EngineError> {
    cell.get_or_init(|| {
        RegexBuilder::new(pattern)
            .dot_matches_new_line(true)
            .build()
            .map_err(|err| err.to_string())
    })
    .as_ref()
    .map_err(|err| EngineError::syntax(format!("command pattern failed to build: {err}")))
}

fn command_regex() -> Result<&'static Regex, EngineError> {
    static CELL: OnceLock<Result<Regex, String>> = OnceLock::new();
    cached(&CELL, COMMAND_PATTERN)
}

fn keyword_regex() -> Result<&'static Regex, EngineError> {
    static CELL: OnceLock<Result<Regex, String>> = OnceLock::new();
    cached(&CELL, KEYWORD_PATTERN)
}

pub fn decompose(token: &str, call_stack: &[String]) -> Result<Decomposed, EngineError> {
    let captures = command_regex()?.captures(token).ok_or_else(|| {
        EngineError::syntax_at(format!("'{token}' is not a command"), token, 0, call_stack)
    })?;
    let matched = captures.get(0).map_or(0, |m| m.end());
    if matched < token.len() {
        let offset = token[..matched].chars().count();
        return Err(EngineError::syntax_at(
            format!("unexpected '{}' after command", &token[matched..]),
            token,
            offset,
            call_stack,
        ));
    }
    let group = |index: usize| captures.get(index).map(|m| m.as_str().to_string());
    Ok(Decomposed {
        reverse: captures.get(1).is_some(),
        name: group(2).unwrap_or_default(),
        input: group(3),
        modifiers: group(4),
        args: group(5),
        args_at: captures.get(5).map_or(0, |m| token[..m.start()].chars().count()),
    })
}

/// `name = value` split of one argument, or `None` for a positional one.
pub fn keyword_argument(piece: &str) -> Result<Option<(String, String)>, EngineError> {
    let Some(captures) = keyword_regex()?.captures(piece) else {
        return Ok(None);
    };
    let Some(whole) = captures.get(0) else {
        return Ok(None);
    };
    let rest = &piece[whole.end()..];
    if rest.starts_with('=') {
        return Ok(None);
    }
    let name = captures.get(1).map_or("", |m| m.as_str()).to_string();
    Ok(Some((name, rest.trim().to_string())))
}

/// Modifier list separated by commas or whitespace.
pub fn parse_modifiers(text: &str) -> Result<Modifiers, EngineError> {
    let mut bits = 0u8;
    for name in text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|piece| !piece.is_empty())
    {
        let bit = modifier_bit_from_name(name)
            .ok_or_else(|| EngineError::value(format!("unknown modifier '{name}'")))?;
        bits |= bit;
    }
    Ok(Modifiers::from_bits(bits))
}

pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use mothball_core::{MOD_LADDER, MOD_WATER};

    #[test]
    fn full_token_decomposes() {
        let parts = decompose("-sprint.wa[water, ld](3, 45)", &[]).expect("decompose");
        assert!(parts.reverse);
        assert_eq!(parts.name, "sprint");
        assert_eq!(parts.input.as_deref(), Some("wa"));
        assert_eq!(parts.modifiers.as_deref(), Some("water, ld"));
        assert_eq!(parts.args.as_deref(), Some("3, 45"));
        assert_eq!(parts.args_at, 22);
    }

    #[test]
    fn bare_name_has_no_parts() {
        let parts = decompose("outz", &[]).expect("decompose");
        assert_eq!(
            parts,
            Decomposed {
                reverse: false,
                name: "outz".to_string(),
                input: None,
                modifiers: None,
                args: None,
                args_at: 0,
            }
        );
    }

    #[test]
    fn nested_arguments_stay_whole() {
        let parts = decompose("repeat(sj(12) s(2), 3)", &[]).expect("decompose");
        assert_eq!(parts.args.as_deref(), Some("sj(12) s(2), 3"));
    }

    #[test]
    fn leftover_text_fails() {
        assert_eq!(decompose("s(1)x", &[]).expect_err("leftover").code(), "SyntaxError");
        assert_eq!(decompose("3s", &[]).expect_err("digit").code(), "SyntaxError");
        assert_eq!(decompose("s.w!", &[]).expect_err("bang").code(), "SyntaxError");
    }

    #[test]
    fn keyword_detection_skips_comparisons() {
        assert_eq!(
            keyword_argument("label = my z").expect("regex"),
            Some(("label".to_string(), "my z".to_string()))
        );
        assert_eq!(keyword_argument("a == b").expect("regex"), None);
        assert_eq!(keyword_argument("12").expect("regex"), None);
    }

    #[test]
    fn modifiers_parse_by_name() {
        let mods = parse_modifiers("water ld").expect("mods");
        assert!(mods.contains(MOD_WATER));
        assert!(mods.contains(MOD_LADDER));
        assert_eq!(parse_modifiers("ice").expect_err("unknown").code(), "ValueError");
    }
}
