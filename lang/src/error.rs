use std::fmt;

use mothball_core::StateError;

/// Characters shown on each side of the failing offset.
const CONTEXT_RADIUS: usize = 24;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    Syntax {
        message: String,
        offset: Option<usize>,
        context: Option<String>,
        stack: Vec<String>,
    },
    Name { message: String },
    Type { message: String },
    Value { message: String },
    Overwrite { name: String },
    ZeroDivision { message: String },
    Interrupted,
    Recursion { depth: usize },
}

impl EngineError {
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Syntax { .. } => "SyntaxError",
            EngineError::Name { .. } => "NameError",
            EngineError::Type { .. } => "TypeError",
            EngineError::Value { .. } => "ValueError",
            EngineError::Overwrite { .. } => "OverwriteError",
            EngineError::ZeroDivision { .. } => "ZeroDivisionError",
            EngineError::Interrupted => "Interrupted",
            EngineError::Recursion { .. } => "RecursionError",
        }
    }

    pub fn message(&self) -> String {
        match self {
            EngineError::Syntax { message, .. }
            | EngineError::Name { message }
            | EngineError::Type { message }
            | EngineError::Value { message }
            | EngineError::ZeroDivision { message } => message.clone(),
            EngineError::Overwrite { name } => {
                format!("'{name}' is a builtin function and cannot be redefined")
            }
            EngineError::Interrupted => "simulation was cancelled".to_string(),
            EngineError::Recursion { depth } => {
                format!("maximum nesting depth of {depth} exceeded")
            }
        }
    }

    pub fn syntax(message: impl Into<String>) -> Self {
        EngineError::Syntax {
            message: message.into(),
            offset: None,
            context: None,
            stack: Vec::new(),
        }
    }

    /// Syntax error pointing at `offset` (in characters) inside `text`.
    pub fn syntax_at(
        message: impl Into<String>,
        text: &str,
        offset: usize,
        stack: &[String],
    ) -> Self {
        EngineError::Syntax {
            message: message.into(),
            offset: Some(offset),
            context: Some(context_window(text, offset)),
            stack: stack.to_vec(),
        }
    }

    /// Moves a located syntax error from a slice starting at `base` onto the whole of `text`.
    pub(crate) fn relocated(self, text: &str, base: usize) -> Self {
        match self {
            EngineError::Syntax {
                message,
                offset: Some(offset),
                stack,
                ..
            } => {
                let offset = base + offset;
                EngineError::Syntax {
                    message,
                    offset: Some(offset),
                    context: Some(context_window(text, offset)),
                    stack,
                }
            }
            other => other,
        }
    }

    pub fn name(message: impl Into<String>) -> Self {
        EngineError::Name {
            message: message.into(),
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        EngineError::Type {
            message: message.into(),
        }
    }

    pub fn value(message: impl Into<String>) -> Self {
        EngineError::Value {
            message: message.into(),
        }
    }

    pub fn zero_division(message: impl Into<String>) -> Self {
        EngineError::ZeroDivision {
            message: message.into(),
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())?;
        if let EngineError::Syntax {
            offset,
            context,
            stack,
            ..
        } = self
        {
            if let Some(offset) = offset {
                write!(f, " (at character {offset})")?;
            }
            if let Some(context) = context {
                write!(f, "\n{context}")?;
            }
            if !stack.is_empty() {
                write!(f, "\n  in {}", stack.join(" > "))?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for EngineError {}

impl From<StateError> for EngineError {
    fn from(err: StateError) -> Self {
        EngineError::value(err.to_string())
    }
}

/// Slice of `text` around `offset` with a caret line under the offending character.
pub(crate) fn context_window(text: &str, offset: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    let start = offset.saturating_sub(CONTEXT_RADIUS);
    let end = (offset + CONTEXT_RADIUS + 1).min(chars.len());
    let window: String = chars[start.min(end)..end]
        .iter()
        .map(|c| if c.is_whitespace() { ' ' } else { *c })
        .collect();
    let caret = " ".repeat(offset - start.min(offset));
    format!("  {window}\n  {caret}^")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_and_display() {
        assert_eq!(EngineError::name("x").code(), "NameError");
        assert_eq!(
            EngineError::Overwrite {
                name: "sprint".to_string()
            }
            .to_string(),
            "OverwriteError: 'sprint' is a builtin function and cannot be redefined"
        );
        assert_eq!(EngineError::Interrupted.code(), "Interrupted");
    }

    #[test]
    fn syntax_error_carries_caret_and_stack() {
        let err = EngineError::syntax_at(
            "unmatched '('",
            "sprint(1 walk",
            6,
            &["repeat".to_string()],
        );
        let text = err.to_string();
        assert!(text.starts_with("SyntaxError: unmatched '(' (at character 6)"));
        assert!(text.contains("  sprint(1 walk\n        ^"));
        assert!(text.ends_with("in repeat"));
    }

    #[test]
    fn state_errors_become_value_errors() {
        let err: EngineError = StateError::Precision { value: 40 }.into();
        assert_eq!(err.code(), "ValueError");
    }
}
