use std::collections::HashMap;

use lazy_static::lazy_static;

/// Operators the engine can keep on its operator stack.
///
/// `Log` and `Root` are both functions and binary operators: they take
/// two operands supplied through the argument-separator syntax, e.g.
/// `log(2, 8)` or `rt(3, 27)`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Mod,
    /// logarithm of the second argument in the base given by the first
    Log,
    /// n-th root: `rt(n, x)` is `x^(1/n)`
    Root,
    /// prefix minus, synthesized by the parser from `-` in prefix position
    UnaryMinus,
    Factorial,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Log10,
    Ln,
    Exp,
    Abs,
    Sqrt,
}

lazy_static! {
    /// Maps a function name as written in an expression to its operator
    pub(crate) static ref FUNCTIONS: HashMap<&'static str, Op> = {
        let mut m = HashMap::new();
        m.insert("sin", Op::Sin);
        m.insert("cos", Op::Cos);
        m.insert("tan", Op::Tan);
        m.insert("asin", Op::Asin);
        m.insert("acos", Op::Acos);
        m.insert("atan", Op::Atan);
        m.insert("log", Op::Log);
        m.insert("log10", Op::Log10);
        m.insert("ln", Op::Ln);
        m.insert("exp", Op::Exp);
        m.insert("abs", Op::Abs);
        m.insert("sqrt", Op::Sqrt);
        m.insert("rt", Op::Root);
        m
    };
}

/// Looks up a function operator by its lower-case name
pub(crate) fn function(name: &str) -> Option<Op> {
    FUNCTIONS.get(name).copied()
}

impl Op {
    pub(crate) fn from_symbol(sym: &str) -> Option<Op> {
        match sym {
            "+" => Some(Op::Add),
            "-" => Some(Op::Sub),
            "*" => Some(Op::Mul),
            "/" => Some(Op::Div),
            "^" => Some(Op::Pow),
            "%" => Some(Op::Mod),
            "!" => Some(Op::Factorial),
            _ => None,
        }
    }

    /// Binary operators pop two operands when reduced
    pub(crate) fn is_binary(self) -> bool {
        matches!(
            self,
            Op::Add | Op::Sub | Op::Mul | Op::Div | Op::Pow | Op::Mod | Op::Log | Op::Root
        )
    }

    pub(crate) fn is_right_side(self) -> bool {
        self == Op::Factorial
    }

    pub(crate) fn is_function(self) -> bool {
        matches!(
            self,
            Op::Log
                | Op::Root
                | Op::Sin
                | Op::Cos
                | Op::Tan
                | Op::Asin
                | Op::Acos
                | Op::Atan
                | Op::Log10
                | Op::Ln
                | Op::Exp
                | Op::Abs
                | Op::Sqrt
        )
    }

    /// Operator precedence, higher binds tighter. Functions and brackets
    /// outrank everything, the power operator sits below multiplication
    /// so `2*3^2` is `2*(3^2)` by precedence alone
    pub(crate) fn precedence(self) -> i32 {
        if self.is_function() {
            return 64;
        }
        match self {
            Op::Factorial => 48,
            Op::Mod => 32,
            Op::Mul | Op::Div => 24,
            Op::Pow => 16,
            Op::UnaryMinus => 8,
            Op::Add | Op::Sub => 4,
            _ => 0,
        }
    }
}

/// Decides whether the operator on top of the stack must be reduced
/// before pushing a new one: `1` means reduce the top first, `-1` means
/// push without reducing. Equal power operators return `-1`, so chained
/// `^` groups right to left: `2^3^2` is `2^(3^2)`. Any other precedence
/// tie reduces the top first, which keeps same-priority operators
/// left-associative
pub(crate) fn compare(op1: Op, op2: Op) -> i32 {
    if op1 == op2 && op1 == Op::Pow {
        -1
    } else if op1.precedence() >= op2.precedence() {
        1
    } else {
        -1
    }
}

/// A lexical unit of an expression with the classification the parser
/// branches on
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    /// Raw number text. Conversion to `f64` happens at parse time, so an
    /// ill-formed literal like `2.3.4` lexes fine and fails later
    Number(String),
    /// Variable or function name, lower-cased
    Ident(String),
    Op(Op),
    OpenParen,
    CloseParen,
    /// Function argument separator `,`
    Separator,
    /// Assignment `=`
    Assign,
    /// Synthetic end-of-input marker, always the last token
    End,
}

impl Token {
    pub(crate) fn is_binary(&self) -> bool {
        matches!(self, Token::Op(op) if op.is_binary())
    }

    /// Structural tokens that terminate a primary without starting a new one
    pub(crate) fn is_special(&self) -> bool {
        matches!(
            self,
            Token::End | Token::Assign | Token::Separator | Token::CloseParen
        )
    }

    pub(crate) fn is_right_side(&self) -> bool {
        matches!(self, Token::Op(op) if op.is_right_side())
    }
}

/// Token plus the byte offset of its first character in the expression
#[derive(Clone, Debug)]
pub(crate) struct Spanned {
    pub(crate) tok: Token,
    pub(crate) pos: usize,
}
