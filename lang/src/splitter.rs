//! Bracket-aware splitting of sequences and argument lists.

use mothball_core::AxisModel;

use crate::error::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitMode {
    /// Whitespace separated commands; empty tokens dropped, closing brackets
    /// at depth 0 must be followed by whitespace, a bracket or the end.
    Sequence,
    /// Comma separated arguments; empty pieces kept.
    Arguments,
}

impl SplitMode {
    fn is_boundary(self, ch: char) -> bool {
        match self {
            SplitMode::Sequence => ch.is_whitespace(),
            SplitMode::Arguments => ch == ',',
        }
    }
}

/// Removes `#...#` regions. An unterminated comment runs to the end.
pub fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_comment = false;
    let mut escaped = false;
    for ch in text.chars() {
        if escaped {
            escaped = false;
            if !in_comment {
                out.push(ch);
            }
            continue;
        }
        match ch {
            '\\' => {
                escaped = true;
                if !in_comment {
                    out.push(ch);
                }
            }
            '#' => in_comment = !in_comment,
            _ if !in_comment => out.push(ch),
            _ => {}
        }
    }
    out
}

/// Rewrites a top-level `|` into the position reset for `axis`.
pub fn expand_shorthand(text: &str, axis: AxisModel) -> String {
    let reset = match axis {
        AxisModel::Horizontal => " x(0) z(0) ",
        AxisModel::Vertical => " y(0) ",
    };
    let mut out = String::with_capacity(text.len());
    let mut depth = 0usize;
    let mut escaped = false;
    for ch in text.chars() {
        if escaped {
            escaped = false;
            out.push(ch);
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            '|' if depth == 0 => {
                out.push_str(reset);
                continue;
            }
            _ => {}
        }
        out.push(ch);
    }
    out
}

/// Splits `text` at top-level boundaries for `mode`.
///
/// `call_stack` names the enclosing calls and is attached to any error.
pub fn split(text: &str, mode: SplitMode, call_stack: &[String]) -> Result<Vec<String>, EngineError> {
    let chars: Vec<char> = text.chars().collect();
    let mut brackets: Vec<(char, usize)> = Vec::new();
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut escaped = false;

    for (offset, &ch) in chars.iter().enumerate() {
        if escaped {
            escaped = false;
            current.push(ch);
            continue;
        }
        match ch {
            '\\' => {
                escaped = true;
                current.push(ch);
                continue;
            }
            '(' | '[' => brackets.push((ch, offset)),
            ')' | ']' => {
                let expected = if ch == ')' { '(' } else { '[' };
                match brackets.pop() {
                    Some((open, _)) if open == expected => {}
                    Some((open, open_at)) => {
                        return Err(EngineError::syntax_at(
                            format!("'{ch}' does not close '{open}' opened at character {open_at}"),
                            text,
                            offset,
                            call_stack,
                        ));
                    }
                    None => {
                        return Err(EngineError::syntax_at(
                            format!("unmatched '{ch}'"),
                            text,
                            offset,
                            call_stack,
                        ));
                    }
                }
                if brackets.is_empty() && mode == SplitMode::Sequence {
                    let next = chars.get(offset + 1).copied();
                    let separated = match next {
                        None => true,
                        Some(c) => c.is_whitespace() || matches!(c, '(' | ')' | '[' | ']'),
                    };
                    if !separated {
                        return Err(EngineError::syntax_at(
                            format!("expected whitespace after '{ch}'"),
                            text,
                            offset + 1,
                            call_stack,
                        ));
                    }
                }
            }
            _ => {}
        }
        if brackets.is_empty() && mode.is_boundary(ch) {
            finish_token(&mut tokens, &mut current, mode);
            continue;
        }
        current.push(ch);
    }

    if let Some((open, offset)) = brackets.last() {
        return Err(EngineError::syntax_at(
            format!("unmatched '{open}'"),
            text,
            *offset,
            call_stack,
        ));
    }
    finish_token(&mut tokens, &mut current, mode);
    Ok(tokens)
}

fn finish_token(tokens: &mut Vec<String>, current: &mut String, mode: SplitMode) {
    let token = std::mem::take(current);
    if mode == SplitMode::Sequence && token.is_empty() {
        return;
    }
    tokens.push(token);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(text: &str) -> Vec<String> {
        split(text, SplitMode::Sequence, &[]).expect("split")
    }

    #[test]
    fn sequence_splits_on_top_level_whitespace() {
        assert_eq!(
            seq("repeat(sprintjump(12), 3) sprint(2) outz(16)"),
            vec!["repeat(sprintjump(12), 3)", "sprint(2)", "outz(16)"]
        );
        assert_eq!(seq("  s  \n w[water](2)\t"), vec!["s", "w[water](2)"]);
    }

    #[test]
    fn concatenation_rebuilds_input_without_separators() {
        let text = "repeat(sj(12), 3)   s(2)\nprint(a b\\ c)";
        let joined: String = seq(text).concat();
        assert_eq!(joined, "repeat(sj(12), 3)s(2)print(a b\\ c)");
    }

    #[test]
    fn arguments_keep_empty_pieces() {
        let args = split("1, f(2, 3),, x = [a, b]", SplitMode::Arguments, &[]).expect("split");
        assert_eq!(args, vec!["1", " f(2, 3)", "", " x = [a, b]"]);
    }

    #[test]
    fn escaped_boundary_is_kept() {
        assert_eq!(seq("print(a) a\\ b"), vec!["print(a)", "a\\ b"]);
        let args = split("a\\, b, c", SplitMode::Arguments, &[]).expect("split");
        assert_eq!(args, vec!["a\\, b", " c"]);
    }

    #[test]
    fn unmatched_brackets_report_offsets() {
        let err = split("s(1 w", SplitMode::Sequence, &[]).expect_err("open");
        match err {
            EngineError::Syntax { offset, .. } => assert_eq!(offset, Some(1)),
            other => panic!("unexpected {other:?}"),
        }
        let err = split("s(1)]", SplitMode::Sequence, &[]).expect_err("close");
        assert_eq!(err.code(), "SyntaxError");
        let err = split("s(1]", SplitMode::Sequence, &["repeat".to_string()]).expect_err("mismatch");
        match err {
            EngineError::Syntax { offset, stack, .. } => {
                assert_eq!(offset, Some(3));
                assert_eq!(stack, vec!["repeat".to_string()]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn strict_mode_requires_space_after_close() {
        let err = split("s(1)w(2)", SplitMode::Sequence, &[]).expect_err("strict");
        match err {
            EngineError::Syntax { offset, .. } => assert_eq!(offset, Some(4)),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(seq("s[water](1) w"), vec!["s[water](1)", "w"]);
        assert!(split("f(a)b, c", SplitMode::Arguments, &[]).is_ok());
    }

    #[test]
    fn comments_are_removed() {
        assert_eq!(strip_comments("s(1) # run # w"), "s(1)  w");
        assert_eq!(strip_comments("print(\\#1) #tail"), "print(\\#1) ");
        assert_eq!(strip_comments("a#b\\#c#d"), "ad");
    }

    #[test]
    fn pipe_shorthand_resets_position() {
        assert_eq!(
            expand_shorthand("sj(12) | s", AxisModel::Horizontal),
            "sj(12)  x(0) z(0)  s"
        );
        assert_eq!(expand_shorthand("j|a", AxisModel::Vertical), "j y(0) a");
        assert_eq!(expand_shorthand("print(a|b)", AxisModel::Horizontal), "print(a|b)");
        assert_eq!(expand_shorthand("a\\|b", AxisModel::Horizontal), "a\\|b");
    }
}
