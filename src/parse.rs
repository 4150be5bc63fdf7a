use std::collections::HashMap;

use log::debug;
use pest::error::InputLocation;
use pest::Parser;
use pest_derive::Parser;

use crate::errors::*;
use crate::stack::Engine;
use crate::token::{Op, Spanned, Token};
use crate::vars::{StoreObserver, VarStore, ANSWER_VAR};

#[derive(Parser)]
#[grammar = "calc.pest"]
struct CalcParser;

/// Splits an expression into tokens. Identifiers are folded to lower
/// case here, so the rest of the engine never deals with letter case.
/// A synthetic `End` marker is appended after the last real token
pub(crate) fn tokenize(expr: &str) -> Result<Vec<Spanned>, CalcError> {
    let pairs = match CalcParser::parse(Rule::expr, expr) {
        Ok(p) => p,
        Err(e) => {
            let pos = match e.location {
                InputLocation::Pos(p) => p,
                InputLocation::Span((s, _)) => s,
            };
            return Err(CalcError::Syntax {
                expected: "a number, name, or operator".to_string(),
                pos,
            });
        }
    };

    let mut tokens = Vec::new();
    for pair in pairs {
        let pos = pair.as_span().start();
        let text = pair.as_span().as_str().to_lowercase();
        let tok = match pair.as_rule() {
            Rule::num => Token::Number(text),
            Rule::ident => Token::Ident(text),
            Rule::operator => match Op::from_symbol(&text) {
                Some(op) => Token::Op(op),
                None => {
                    return Err(CalcError::Syntax {
                        expected: "an operator".to_string(),
                        pos,
                    });
                }
            },
            Rule::open_b => Token::OpenParen,
            Rule::close_b => Token::CloseParen,
            Rule::arg_sep => Token::Separator,
            Rule::assign => Token::Assign,
            // EOI
            _ => continue,
        };
        tokens.push(Spanned { tok, pos });
    }
    tokens.push(Spanned {
        tok: Token::End,
        pos: expr.len(),
    });
    Ok(tokens)
}

/// The calculator itself: holds the variable bindings that survive
/// between evaluations. Parser state lives in a per-call engine, so a
/// failed evaluation never poisons the instance.
///
/// Not `Sync`: one instance per thread, or wrap it in a lock
pub struct Calculator {
    vars: VarStore,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator {
    /// Creates a calculator with `pi`, `e`, and the answer variable
    /// `r` pre-seeded
    pub fn new() -> Self {
        Calculator {
            vars: VarStore::new(),
        }
    }

    /// Evaluates an expression and stores the result into the answer
    /// variable `r`
    pub fn evaluate(&mut self, expr: &str) -> CalcResult {
        debug!("evaluate {:?}", expr);
        let tokens = tokenize(expr)?;
        if tokens.len() == 1 {
            // only the end marker
            return Err(CalcError::EmptyExpression);
        }

        let result = Engine::new(tokens, &mut self.vars).run()?;
        self.vars.set(ANSWER_VAR, result);
        Ok(result)
    }

    /// Creates a variable or overwrites an existing one. The name is
    /// case-insensitive
    pub fn set_variable(&mut self, name: &str, value: f64) {
        self.vars.set(name, value);
    }

    /// Returns a variable value, or `0.0` when the name is unbound
    pub fn get_variable(&self, name: &str) -> f64 {
        self.vars.get(name)
    }

    /// Live view of all bindings. Keys are stored lower-cased
    pub fn variables(&self) -> &HashMap<String, f64> {
        self.vars.all()
    }

    /// Re-seeds `pi`, `e`, and `r`. User variables are kept
    pub fn reset(&mut self) {
        self.vars.load_constants();
    }

    /// Installs (or removes) the observer called after every variable
    /// change, including the re-seeding done by [`reset`](Self::reset)
    pub fn on_variable_store(&mut self, observer: Option<StoreObserver>) {
        self.vars.set_observer(observer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::f64::consts::PI;
    use std::rc::Rc;

    #[test]
    fn test_basic_arithmetic() {
        let mut c = Calculator::new();
        assert_eq!(c.evaluate("1 + 2 + 3"), Ok(6.0));
        assert_eq!(c.evaluate("1 + 2 * 3 + 4"), Ok(11.0));
        assert_eq!(c.evaluate("1 + 2 * (3 + 4)"), Ok(15.0));
        assert_eq!(c.evaluate("10 % 3"), Ok(1.0));
        assert_eq!(c.evaluate("7 / 2"), Ok(3.5));
        assert_eq!(c.evaluate("0.1 + 0.2"), Ok(0.3));
    }

    #[test]
    fn test_power_is_right_associative() {
        let mut c = Calculator::new();
        assert_eq!(c.evaluate("2^3^2"), Ok(512.0));
        assert_eq!(c.evaluate("(2^3)^2"), Ok(64.0));
        assert_eq!(c.evaluate("2^(-2)"), Ok(0.25));
    }

    #[test]
    fn test_unary_minus() {
        let mut c = Calculator::new();
        assert_eq!(c.evaluate("-3 + 5"), Ok(2.0));
        assert_eq!(c.evaluate("-(2 + 3)"), Ok(-5.0));
        assert_eq!(c.evaluate("2 - -3"), Ok(5.0));
    }

    #[test]
    fn test_implicit_multiplication() {
        let mut c = Calculator::new();
        assert_eq!(c.evaluate("2(3+4)"), Ok(14.0));
        assert_eq!(c.evaluate("3(3+4)"), Ok(21.0));
        assert_eq!(c.evaluate("(1+1)(2+2)"), Ok(8.0));
        c.set_variable("x", 2.0);
        assert_eq!(c.evaluate("2x"), Ok(4.0));
        c.set_variable("y", PI / 2.0);
        assert_eq!(c.evaluate("x sin(y)"), Ok(2.0));
    }

    #[test]
    fn test_variables() {
        let mut c = Calculator::new();
        c.set_variable("x", 2.0);
        c.set_variable("y", 3.0);
        assert_eq!(c.evaluate("1 + x * (y + 4)"), Ok(15.0));
        // names are case-insensitive
        c.set_variable("Rate", 0.5);
        assert_eq!(c.evaluate("rate * 4"), Ok(2.0));
        // unbound names read as zero
        assert_eq!(c.get_variable("nonexistent"), 0.0);
        assert_eq!(c.evaluate("nonexistent + 1"), Ok(1.0));
    }

    #[test]
    fn test_functions() {
        let mut c = Calculator::new();
        c.set_variable("x", PI / 2.0);
        assert_eq!(c.evaluate("1 + sin(x)"), Ok(2.0));
        assert_eq!(c.evaluate("sqrt(16) + abs(-2)"), Ok(6.0));
        assert_eq!(c.evaluate("ln(e)"), Ok(1.0));
        assert_eq!(c.evaluate("log10(1000)"), Ok(3.0));
        assert_eq!(c.evaluate("exp(0)"), Ok(1.0));
        assert_eq!(c.evaluate("cos(0)"), Ok(1.0));
        assert_eq!(c.evaluate("sin(cos(0))"), Ok(round(1.0f64.sin())));
        assert_eq!(c.evaluate("atan(1) * 4 / pi"), Ok(1.0));
    }

    fn round(v: f64) -> f64 {
        (v * 1e10).round() / 1e10
    }

    #[test]
    fn test_two_argument_functions() {
        let mut c = Calculator::new();
        assert_eq!(c.evaluate("log(2, 8)"), Ok(3.0));
        assert_eq!(c.evaluate("rt(3, 27)"), Ok(3.0));
        assert_eq!(c.evaluate("1 + log(10, 100)"), Ok(3.0));
    }

    #[test]
    fn test_factorial() {
        let mut c = Calculator::new();
        assert_eq!(c.evaluate("5!"), Ok(120.0));
        assert_eq!(c.evaluate("(3+2)!"), Ok(120.0));
        assert_eq!(c.evaluate("-3!"), Ok(-6.0));
        assert!(matches!(
            c.evaluate("2.5!"),
            Err(CalcError::Calculate { .. })
        ));
    }

    #[test]
    fn test_answer_variable() {
        let mut c = Calculator::new();
        let v = c.evaluate("2 + 3").unwrap();
        assert_eq!(c.get_variable("r"), v);
        assert_eq!(c.evaluate("r * 2"), Ok(10.0));
        assert_eq!(c.get_variable("r"), 10.0);
    }

    #[test]
    fn test_assignment() {
        let mut c = Calculator::new();
        assert_eq!(c.evaluate("x = 2 * 3 + 1"), Ok(7.0));
        assert_eq!(c.get_variable("x"), 7.0);
        assert_eq!(c.evaluate("x + 1"), Ok(8.0));
        // the right-hand side must run to the end of the expression
        assert!(matches!(
            c.evaluate("1 + (x = 2)"),
            Err(CalcError::Syntax { .. })
        ));
    }

    #[test]
    fn test_constants() {
        let mut c = Calculator::new();
        let v = c.evaluate("pi").unwrap();
        assert!((v - PI).abs() < 1e-12);
        // the token layer lower-cases names
        let v = c.evaluate("PI").unwrap();
        assert!((v - PI).abs() < 1e-12);
    }

    #[test]
    fn test_reset() {
        let mut c = Calculator::new();
        c.set_variable("pi", 1.0);
        c.set_variable("custom", 9.0);
        c.reset();
        assert!((c.get_variable("pi") - PI).abs() < 1e-12);
        assert_eq!(c.get_variable("custom"), 9.0);
    }

    #[test]
    fn test_observer() {
        let hits = Rc::new(RefCell::new(0usize));
        let probe = Rc::clone(&hits);
        let mut c = Calculator::new();
        c.on_variable_store(Some(Box::new(move || {
            *probe.borrow_mut() += 1;
        })));

        c.set_variable("a", 1.0);
        assert_eq!(*hits.borrow(), 1);
        // assignment fires for `x` and once more for the answer variable
        let _ = c.evaluate("x = 2");
        assert_eq!(*hits.borrow(), 3);
        c.reset();
        assert_eq!(*hits.borrow(), 4);
    }

    #[test]
    fn test_empty_expression() {
        let mut c = Calculator::new();
        assert_eq!(c.evaluate(""), Err(CalcError::EmptyExpression));
        assert_eq!(c.evaluate("   "), Err(CalcError::EmptyExpression));
        assert_eq!(c.evaluate("\t"), Err(CalcError::EmptyExpression));
    }

    #[test]
    fn test_syntax_errors() {
        let mut c = Calculator::new();
        assert!(matches!(
            c.evaluate("1 + )"),
            Err(CalcError::Syntax { .. })
        ));
        assert!(matches!(
            c.evaluate("(2 + 3"),
            Err(CalcError::Syntax { .. })
        ));
        assert!(matches!(c.evaluate("1 +"), Err(CalcError::Syntax { .. })));
        assert!(matches!(c.evaluate("2 @ 3"), Err(CalcError::Syntax { pos: 2, .. })));
    }

    #[test]
    fn test_calculation_errors() {
        let mut c = Calculator::new();
        assert!(matches!(
            c.evaluate("1 / 0"),
            Err(CalcError::Calculate { .. })
        ));
        assert!(matches!(
            c.evaluate("2.3.4 + 1"),
            Err(CalcError::Calculate { .. })
        ));
        assert!(matches!(
            c.evaluate("sqrt(-1)"),
            Err(CalcError::Calculate { .. })
        ));
        assert!(matches!(
            c.evaluate("ln(0)"),
            Err(CalcError::Calculate { .. })
        ));
    }

    #[test]
    fn test_instance_survives_a_failure() {
        let mut c = Calculator::new();
        assert!(c.evaluate("1 / 0").is_err());
        assert_eq!(c.evaluate("1 + 1"), Ok(2.0));
    }
}
