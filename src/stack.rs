use log::trace;

use crate::errors::*;
use crate::token::{self, Op, Spanned, Token};
use crate::value;
use crate::vars::VarStore;

/// An entry on the operator stack: either a pending operator or the
/// sentinel that delimits a parenthesized scope. The sentinel never
/// reduces, it only acts as a precedence floor
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum OpEntry {
    Sentinel,
    Op(Op),
}

/// Per-call parse and evaluation state: the token cursor plus the two
/// cooperating stacks. An engine is built fresh for every evaluation,
/// which is what makes the calculator reusable after a failure
pub(crate) struct Engine<'a> {
    tokens: Vec<Spanned>,
    idx: usize,
    operands: Vec<f64>,
    operators: Vec<OpEntry>,
    vars: &'a mut VarStore,
}

impl<'a> Engine<'a> {
    /// `tokens` must be terminated by `Token::End`
    pub(crate) fn new(tokens: Vec<Spanned>, vars: &'a mut VarStore) -> Self {
        Engine {
            tokens,
            idx: 0,
            operands: Vec::new(),
            operators: vec![OpEntry::Sentinel],
            vars,
        }
    }

    pub(crate) fn run(&mut self) -> CalcResult {
        let result = self.parse()?;
        // a well-formed expression leaves exactly one value
        if self.operands.len() != 1 {
            return Err(CalcError::Calculate {
                msg: "too many numbers".to_string(),
                pos: self.pos(),
            });
        }
        Ok(result)
    }

    fn parse(&mut self) -> CalcResult {
        self.parse_binary()?;
        self.expect_end()?;
        match self.operands.last() {
            Some(v) => Ok(*v),
            None => Err(CalcError::Syntax {
                expected: "a value".to_string(),
                pos: self.pos(),
            }),
        }
    }

    /// Chain of primaries joined by binary operators. On loop exit all
    /// pending operators down to the sentinel are reduced
    fn parse_binary(&mut self) -> CalcErrorResult {
        self.parse_primary()?;

        loop {
            let op = match self.current() {
                Token::Op(op) if op.is_binary() => *op,
                _ => break,
            };
            self.push_operator(op)?;
            self.advance();
            self.parse_primary()?;
        }

        while matches!(self.operators.last(), Some(OpEntry::Op(..))) {
            self.pop_operator()?;
        }
        Ok(())
    }

    /// One atomic element: number, variable, function call, prefix
    /// minus, parenthesized group, or argument separator
    fn parse_primary(&mut self) -> CalcErrorResult {
        match self.current().clone() {
            Token::Number(text) => self.parse_number(&text),
            Token::Ident(name) => self.parse_name(&name),
            Token::Op(Op::Sub) => {
                self.push_operator(Op::UnaryMinus)?;
                self.advance();
                self.parse_primary()
            }
            Token::OpenParen => {
                self.advance();
                self.operators.push(OpEntry::Sentinel);
                self.parse_binary()?;
                self.expect_group_close()?;
                self.operators.pop();

                self.try_insert_multiply()?;
                self.try_right_side()
            }
            Token::Separator => {
                self.advance();
                self.parse_primary()
            }
            _ => Err(CalcError::Syntax {
                expected: "a value".to_string(),
                pos: self.pos(),
            }),
        }
    }

    fn parse_number(&mut self, text: &str) -> CalcErrorResult {
        let v: f64 = match text.parse() {
            Ok(v) => v,
            Err(..) => {
                return Err(CalcError::Calculate {
                    msg: format!("invalid number '{}'", text),
                    pos: self.pos(),
                });
            }
        };
        self.advance();
        self.operands.push(v);

        self.try_insert_multiply()?;
        self.try_right_side()
    }

    /// A name is a function, an assignment target, or a variable read
    fn parse_name(&mut self, name: &str) -> CalcErrorResult {
        self.advance();

        if let Some(op) = token::function(name) {
            self.push_operator(op)?;
            return self.parse_primary();
        }

        if *self.current() == Token::Assign {
            // the right-hand side is a full expression: it must extend
            // to the end of the input
            self.advance();
            let v = self.parse()?;
            trace!("assign {} = {}", name, v);
            self.vars.set(name, v);
            return Ok(());
        }

        let v = self.vars.get(name);
        self.operands.push(v);

        self.try_insert_multiply()?;
        self.try_right_side()
    }

    /// Two juxtaposed primaries multiply: `2(3+4)`, `2x`, `(1+1)(2+2)`
    fn try_insert_multiply(&mut self) -> CalcErrorResult {
        let tok = self.current();
        if !tok.is_binary() && !tok.is_special() && !tok.is_right_side() {
            self.push_operator(Op::Mul)?;
            self.parse_primary()?;
        }
        Ok(())
    }

    /// Postfix factorial and the argument separator of multi-argument
    /// function calls
    fn try_right_side(&mut self) -> CalcErrorResult {
        match self.current() {
            Token::Op(Op::Factorial) => {
                self.push_operator(Op::Factorial)?;
                self.advance();
                self.try_insert_multiply()
            }
            Token::Separator => self.parse_primary(),
            _ => Ok(()),
        }
    }

    /// Reduces the stack top while it outranks the new operator, then
    /// pushes the new one
    fn push_operator(&mut self, op: Op) -> CalcErrorResult {
        while let Some(OpEntry::Op(top)) = self.operators.last() {
            if token::compare(*top, op) > 0 {
                self.pop_operator()?;
            } else {
                break;
            }
        }
        self.operators.push(OpEntry::Op(op));
        Ok(())
    }

    /// Pops the top operator and applies it: binary operators consume
    /// two operands (the first popped is the right one), everything
    /// else consumes one
    fn pop_operator(&mut self) -> CalcErrorResult {
        let op = match self.operators.pop() {
            Some(OpEntry::Op(op)) => op,
            _ => {
                return Err(CalcError::Syntax {
                    expected: "an operator".to_string(),
                    pos: self.pos(),
                });
            }
        };

        let pos = self.pos();
        let v = if op.is_binary() {
            let rhs = self.pop_operand()?;
            let lhs = self.pop_operand()?;
            value::binary(op, lhs, rhs)
        } else {
            let x = self.pop_operand()?;
            value::unary(op, x)
        };
        match v {
            Ok(v) => {
                self.operands.push(v);
                Ok(())
            }
            Err(msg) => Err(CalcError::Calculate { msg, pos }),
        }
    }

    fn pop_operand(&mut self) -> Result<f64, CalcError> {
        match self.operands.pop() {
            Some(v) => Ok(v),
            None => Err(CalcError::Syntax {
                expected: "a value".to_string(),
                pos: self.pos(),
            }),
        }
    }

    fn current(&self) -> &Token {
        // the token vector always ends with End and advance() never
        // moves past it
        &self.tokens[self.idx].tok
    }

    fn pos(&self) -> usize {
        self.tokens[self.idx].pos
    }

    fn advance(&mut self) {
        if self.idx + 1 < self.tokens.len() {
            self.idx += 1;
        }
    }

    fn expect_end(&mut self) -> CalcErrorResult {
        if *self.current() == Token::End {
            self.advance();
            Ok(())
        } else {
            Err(CalcError::Syntax {
                expected: "end of expression".to_string(),
                pos: self.pos(),
            })
        }
    }

    /// A group is closed by `)` or, inside a function call, by the
    /// argument separator
    fn expect_group_close(&mut self) -> CalcErrorResult {
        match self.current() {
            Token::CloseParen | Token::Separator => {
                self.advance();
                Ok(())
            }
            _ => Err(CalcError::Syntax {
                expected: "')'".to_string(),
                pos: self.pos(),
            }),
        }
    }
}
