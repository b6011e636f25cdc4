//! Arithmetic over numbers and scope variables.
//!
//! Operators reduce strictly left to right inside one precedence level, `**`
//! included, so `2**3**2` is `(2**3)**2`.

use crate::error::EngineError;
use crate::value::Scope;

#[derive(Debug, PartialEq)]
enum ExprError {
    Parse(String),
    Undefined(String),
    DivZero,
}

impl ExprError {
    fn describe(&self) -> String {
        match self {
            ExprError::Parse(message) => message.clone(),
            ExprError::Undefined(name) => format!("name '{name}' is not defined"),
            ExprError::DivZero => "division by zero".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Pow,
    LParen,
    RParen,
}

impl Token {
    fn is_operand_end(&self) -> bool {
        matches!(self, Token::Number(_) | Token::Ident(_) | Token::RParen)
    }

    fn starts_operand(&self) -> bool {
        matches!(self, Token::Number(_) | Token::Ident(_) | Token::LParen)
    }

    fn render(&self) -> String {
        match self {
            Token::Number(v) => format!("{v}"),
            Token::Ident(name) => name.clone(),
            Token::Plus => "+".to_string(),
            Token::Minus => "-".to_string(),
            Token::Star => "*".to_string(),
            Token::Slash => "/".to_string(),
            Token::Pow => "**".to_string(),
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Neg,
    Open,
}

impl Op {
    fn precedence(self) -> u8 {
        match self {
            Op::Open => 0,
            Op::Add | Op::Sub => 1,
            Op::Mul | Op::Div => 2,
            Op::Neg => 3,
            Op::Pow => 4,
        }
    }
}

/// Evaluates `expr` against `scope`.
///
/// An empty expression is 0. Unknown names are a NameError, every other
/// failure is a SyntaxError naming the whole expression.
pub fn evaluate(expr: &str, scope: &Scope) -> Result<f64, EngineError> {
    if expr.trim().is_empty() {
        return Ok(0.0);
    }
    eval_tokens(expr, scope).map_err(|err| match err {
        ExprError::Undefined(_) => EngineError::name(err.describe()),
        other => EngineError::syntax(format!(
            "invalid expression '{}': {}",
            expr.trim(),
            other.describe()
        )),
    })
}

fn eval_tokens(expr: &str, scope: &Scope) -> Result<f64, ExprError> {
    let tokens = ExprLexer::new(expr).tokenize()?;
    let mut machine = StackMachine::default();
    let mut prev: Option<&Token> = None;

    for token in &tokens {
        if let Some(before) = prev {
            if before.is_operand_end() && token.starts_operand() {
                return Err(ExprError::Parse(format!(
                    "missing operator between '{}' and '{}'",
                    before.render(),
                    token.render()
                )));
            }
        }
        match token {
            Token::Number(value) => machine.operands.push(*value),
            Token::Ident(name) => machine.operands.push(lookup(name, scope)?),
            Token::LParen => machine.ops.push(Op::Open),
            Token::RParen => machine.close()?,
            Token::Minus if is_unary(prev, &machine) => machine.ops.push(Op::Neg),
            Token::Plus => machine.binary(Op::Add)?,
            Token::Minus => machine.binary(Op::Sub)?,
            Token::Star => machine.binary(Op::Mul)?,
            Token::Slash => machine.binary(Op::Div)?,
            Token::Pow => machine.binary(Op::Pow)?,
        }
        prev = Some(token);
    }
    machine.finish()
}

fn is_unary(prev: Option<&Token>, machine: &StackMachine) -> bool {
    match prev {
        None => true,
        Some(token) if !token.is_operand_end() => true,
        _ => machine.operands.is_empty(),
    }
}

fn lookup(name: &str, scope: &Scope) -> Result<f64, ExprError> {
    scope
        .get(name)
        .and_then(|value| value.as_f64())
        .ok_or_else(|| ExprError::Undefined(name.to_string()))
}

#[derive(Default)]
struct StackMachine {
    operands: Vec<f64>,
    ops: Vec<Op>,
}

impl StackMachine {
    fn binary(&mut self, op: Op) -> Result<(), ExprError> {
        while let Some(&top) = self.ops.last() {
            if top == Op::Open || top.precedence() < op.precedence() {
                break;
            }
            self.reduce()?;
        }
        self.ops.push(op);
        Ok(())
    }

    fn close(&mut self) -> Result<(), ExprError> {
        loop {
            match self.ops.last() {
                None => return Err(ExprError::Parse("unbalanced ')'".to_string())),
                Some(Op::Open) => {
                    self.ops.pop();
                    return Ok(());
                }
                Some(_) => self.reduce()?,
            }
        }
    }

    fn finish(mut self) -> Result<f64, ExprError> {
        while let Some(&top) = self.ops.last() {
            if top == Op::Open {
                return Err(ExprError::Parse("unbalanced '('".to_string()));
            }
            self.reduce()?;
        }
        match self.operands.as_slice() {
            [value] => Ok(*value),
            [] => Err(ExprError::Parse("missing operand".to_string())),
            _ => Err(ExprError::Parse("missing operator".to_string())),
        }
    }

    fn reduce(&mut self) -> Result<(), ExprError> {
        let op = self
            .ops
            .pop()
            .ok_or_else(|| ExprError::Parse("missing operator".to_string()))?;
        let missing = || ExprError::Parse("missing operand".to_string());
        if op == Op::Neg {
            let value = self.operands.pop().ok_or_else(missing)?;
            self.operands.push(-value);
            return Ok(());
        }
        let right = self.operands.pop().ok_or_else(missing)?;
        let left = self.operands.pop().ok_or_else(missing)?;
        let value = match op {
            Op::Add => left + right,
            Op::Sub => left - right,
            Op::Mul => left * right,
            Op::Div => {
                if right == 0.0 {
                    return Err(ExprError::DivZero);
                }
                left / right
            }
            Op::Pow => {
                if left == 0.0 && right < 0.0 {
                    return Err(ExprError::DivZero);
                }
                left.powf(right)
            }
            Op::Neg | Op::Open => return Err(ExprError::Parse("missing operator".to_string())),
        };
        if value.is_nan() {
            return Err(ExprError::Parse("math domain error".to_string()));
        }
        self.operands.push(value);
        Ok(())
    }
}

struct ExprLexer {
    chars: Vec<char>,
    pos: usize,
}

impl ExprLexer {
    fn new(body: &str) -> Self {
        Self {
            chars: body.chars().collect(),
            pos: 0,
        }
    }

    fn tokenize(mut self) -> Result<Vec<Token>, ExprError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_ws();
            let Some(ch) = self.peek() else {
                break;
            };
            let token = match ch {
                '0'..='9' | '.' => self.read_number()?,
                'a'..='z' | 'A'..='Z' | '_' => self.read_ident(),
                '+' => self.single(Token::Plus),
                '-' => self.single(Token::Minus),
                '/' => self.single(Token::Slash),
                '(' => self.single(Token::LParen),
                ')' => self.single(Token::RParen),
                '*' => {
                    self.pos += 1;
                    if self.peek() == Some('*') {
                        self.pos += 1;
                        Token::Pow
                    } else {
                        Token::Star
                    }
                }
                _ => return Err(self.unrecognized()),
            };
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn single(&mut self, token: Token) -> Token {
        self.pos += 1;
        token
    }

    fn unrecognized(&self) -> ExprError {
        let run: String = self.chars[self.pos..]
            .iter()
            .take_while(|c| !is_recognized(**c))
            .collect();
        ExprError::Parse(format!("unexpected '{run}'"))
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn read_number(&mut self) -> Result<Token, ExprError> {
        let start = self.pos;
        self.eat_digits();
        if self.peek() == Some('.') {
            self.pos += 1;
            self.eat_digits();
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let mark = self.pos;
            self.pos += 1;
            if matches!(self.peek(), Some('+' | '-')) {
                self.pos += 1;
            }
            if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.eat_digits();
            } else {
                self.pos = mark;
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse::<f64>()
            .map(Token::Number)
            .map_err(|_| ExprError::Parse(format!("bad number '{text}'")))
    }

    fn eat_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
    }

    fn read_ident(&mut self) -> Token {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.pos += 1;
        }
        Token::Ident(self.chars[start..self.pos].iter().collect())
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }
}

fn is_recognized(ch: char) -> bool {
    ch.is_ascii_alphanumeric()
        || ch.is_whitespace()
        || matches!(ch, '_' | '.' | '+' | '-' | '*' | '/' | '(' | ')')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn eval(expr: &str) -> Result<f64, EngineError> {
        evaluate(expr, &Scope::new())
    }

    #[test]
    fn arithmetic_and_precedence() {
        assert_eq!(eval("2**(3-1)/(2+6)").expect("eval"), 0.5);
        assert_eq!(eval("1 + 2 * 3").expect("eval"), 7.0);
        assert_eq!(eval("-2*3").expect("eval"), -6.0);
        assert_eq!(eval("2*-3").expect("eval"), -6.0);
        assert_eq!(eval("-2**2").expect("eval"), -4.0);
        assert_eq!(eval("2**-1").expect("eval"), 0.5);
        assert_eq!(eval(".5 + 2e-3").expect("eval"), 0.502);
        assert_eq!(eval("10 - 4 - 3").expect("eval"), 3.0);
    }

    #[test]
    fn power_reduces_left_to_right() {
        assert_eq!(eval("2**3**2").expect("eval"), 64.0);
    }

    #[test]
    fn empty_expression_is_zero() {
        assert_eq!(eval("").expect("eval"), 0.0);
        assert_eq!(eval("   ").expect("eval"), 0.0);
    }

    #[test]
    fn malformed_expressions_are_syntax_errors() {
        for bad in ["1-", "(3)4", "2(3)", "(1", "1)", "3 4", "2 $$ 3", "1/0"] {
            let err = eval(bad).expect_err(bad);
            assert_eq!(err.code(), "SyntaxError", "{bad}");
            assert!(err.message().contains(bad.trim()), "{bad}: {}", err.message());
        }
    }

    #[test]
    fn unrecognized_run_is_named() {
        let err = eval("1 + $$ 2").expect_err("bad char");
        assert!(err.message().ends_with("unexpected '$$'"), "{}", err.message());
    }

    #[test]
    fn identifiers_come_from_scope() {
        let mut scope = Scope::new();
        scope.insert("a".to_string(), Value::Int(10));
        scope.insert("seq".to_string(), Value::Text("sprint".to_string()));
        assert_eq!(evaluate("a / 4", &scope).expect("eval"), 2.5);
        assert_eq!(evaluate("a*-1", &scope).expect("eval"), -10.0);
        assert_eq!(evaluate("missing", &scope).expect_err("name").code(), "NameError");
        assert_eq!(evaluate("seq + 1", &scope).expect_err("text").code(), "NameError");
    }
}
