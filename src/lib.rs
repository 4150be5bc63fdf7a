//! # Expression calculator
//!
//! A small calculator for arithmetic expressions over 64-bit floats.
//! An expression is tokenized, parsed, and evaluated in a single pass
//! using an operator-precedence algorithm with two stacks: one for
//! operand values and one for pending operators, with a sentinel entry
//! delimiting every parenthesized scope.
//!
//! Supported syntax:
//! * operators (starting from highest priority):
//!   - `!` - factorial (used after a number or a closing bracket)
//!   - `%` - remainder
//!   - `*`, `/` - multiplication and division
//!   - `^` - power (right-associative: `2^3^2` is `2^(3^2)`)
//!   - `-` - unary minus
//!   - `+`, `-` - addition and subtraction
//! * brackets: `1 + (2 - 3) * 4`
//! * implicit multiplication: `2(3+4)`, `2x`, `(1+1)(2+2)`
//! * functions: `sin`, `cos`, `tan`, `asin`, `acos`, `atan`, `log`,
//!   `log10`, `ln`, `exp`, `abs`, `sqrt`, `rt`. `log(b, x)` takes the
//!   base as its first argument, `rt(n, x)` is the n-th root of x
//! * variables: predefined `pi` and `e`, the answer variable `r` that
//!   always holds the last result, and user variables created either
//!   with [`parse::Calculator::set_variable`] or with assignment
//!   syntax: `x = 2 + 3`
//!
//! Every intermediate result is rounded to 10 decimal places, so
//! chained operations like `0.1 + 0.2` produce `0.3` and not
//! `0.30000000000000004`.
//!
//! ```
//! use fcalc::parse::Calculator;
//!
//! let mut calc = Calculator::new();
//! assert_eq!(calc.evaluate("1 + 2 * (3 + 4)"), Ok(15.0));
//!
//! calc.set_variable("ke", 3.0);
//! assert_eq!(calc.evaluate("2 * (4 + ke)"), Ok(14.0));
//! assert_eq!(calc.get_variable("r"), 14.0);
//! ```

pub mod errors;
pub mod parse;
pub mod stack;
pub mod token;
pub mod value;
pub mod vars;
