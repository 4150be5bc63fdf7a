use crate::token::Op;

/// Largest operand the iterative factorial accepts; 171! overflows f64
const FACTORIAL_MAX: f64 = 170.0;

// Rounding scale for result post-processing
const ROUND_SCALE: f64 = 1e10;

/// Rounds a result to 10 decimal places to hide representation noise in
/// chained operations, so `0.1 + 0.2` stays `0.3`. Values too large to
/// scale are returned unchanged
pub(crate) fn round_result(v: f64) -> f64 {
    let scaled = v * ROUND_SCALE;
    if scaled.is_finite() {
        scaled.round() / ROUND_SCALE
    } else {
        v
    }
}

fn post(v: f64) -> Result<f64, String> {
    if v.is_finite() {
        Ok(round_result(v))
    } else {
        Err("result is not a finite number".to_string())
    }
}

/// Applies a binary operator to its operands in grammar order: `lhs`
/// was pushed first. For `log` the first operand is the base, for `rt`
/// it is the root index
pub(crate) fn binary(op: Op, lhs: f64, rhs: f64) -> Result<f64, String> {
    let res = match op {
        Op::Add => lhs + rhs,
        Op::Sub => lhs - rhs,
        Op::Mul => lhs * rhs,
        Op::Div => {
            if rhs == 0.0 {
                return Err("division by zero".to_string());
            }
            lhs / rhs
        }
        Op::Mod => {
            if rhs == 0.0 {
                return Err("division by zero".to_string());
            }
            lhs % rhs
        }
        Op::Pow => lhs.powf(rhs),
        Op::Log => {
            if lhs <= 0.0 || lhs == 1.0 {
                return Err(format!("invalid logarithm base {}", lhs));
            }
            if rhs <= 0.0 {
                return Err(format!("invalid logarithm argument {}", rhs));
            }
            rhs.log(lhs)
        }
        Op::Root => {
            if lhs == 0.0 {
                return Err("root index must not be zero".to_string());
            }
            rhs.powf(1.0 / lhs)
        }
        _ => return Err("not a binary operator".to_string()),
    };
    post(res)
}

/// Applies a unary operator (prefix minus, a math function, or the
/// postfix factorial) to a single operand
pub(crate) fn unary(op: Op, x: f64) -> Result<f64, String> {
    let res = match op {
        Op::UnaryMinus => -x,
        Op::Abs => x.abs(),
        Op::Sin => x.sin(),
        Op::Cos => x.cos(),
        Op::Tan => x.tan(),
        Op::Asin => {
            if !(-1.0..=1.0).contains(&x) {
                return Err(format!("asin argument {} out of [-1..1]", x));
            }
            x.asin()
        }
        Op::Acos => {
            if !(-1.0..=1.0).contains(&x) {
                return Err(format!("acos argument {} out of [-1..1]", x));
            }
            x.acos()
        }
        Op::Atan => x.atan(),
        Op::Ln => {
            if x <= 0.0 {
                return Err(format!("invalid logarithm argument {}", x));
            }
            x.ln()
        }
        Op::Log10 => {
            if x <= 0.0 {
                return Err(format!("invalid logarithm argument {}", x));
            }
            x.log10()
        }
        Op::Exp => x.exp(),
        Op::Sqrt => {
            if x < 0.0 {
                return Err(format!("square root of negative number {}", x));
            }
            x.sqrt()
        }
        Op::Factorial => factorial(x)?,
        _ => return Err("not a unary operator".to_string()),
    };
    post(res)
}

/// Iterative factorial. Defined only for non-negative whole numbers up
/// to 170; anything else is a domain error instead of the silent `1`
/// a bare loop would produce
fn factorial(x: f64) -> Result<f64, String> {
    if x < 0.0 || x.fract() != 0.0 {
        return Err(format!("factorial of non-natural number {}", x));
    }
    if x > FACTORIAL_MAX {
        return Err(format!("factorial argument {} is too large", x));
    }
    let n = x as u64;
    let mut res = 1.0f64;
    for i in 2..=n {
        res *= i as f64;
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rounding() {
        assert_eq!(binary(Op::Add, 0.1, 0.2), Ok(0.3));
        assert_eq!(round_result(2.00000000004), 2.0);
        // too large to scale, passed through
        assert_eq!(round_result(1e300), 1e300);
    }

    #[test]
    fn test_binary_ops() {
        assert_eq!(binary(Op::Pow, 2.0, 10.0), Ok(1024.0));
        assert_eq!(binary(Op::Mod, 10.0, 3.0), Ok(1.0));
        assert_eq!(binary(Op::Log, 2.0, 8.0), Ok(3.0));
        assert_eq!(binary(Op::Root, 3.0, 27.0), Ok(3.0));
        assert!(binary(Op::Div, 1.0, 0.0).is_err());
        assert!(binary(Op::Mod, 1.0, 0.0).is_err());
        assert!(binary(Op::Log, -2.0, 8.0).is_err());
        assert!(binary(Op::Log, 1.0, 8.0).is_err());
        assert!(binary(Op::Log, 2.0, -8.0).is_err());
        assert!(binary(Op::Root, 0.0, 8.0).is_err());
    }

    #[test]
    fn test_unary_ops() {
        assert_eq!(unary(Op::UnaryMinus, 2.5), Ok(-2.5));
        assert_eq!(unary(Op::Sqrt, 16.0), Ok(4.0));
        assert_eq!(unary(Op::Sin, std::f64::consts::FRAC_PI_2), Ok(1.0));
        assert_eq!(unary(Op::Ln, std::f64::consts::E), Ok(1.0));
        assert_eq!(unary(Op::Log10, 1000.0), Ok(3.0));
        assert!(unary(Op::Sqrt, -1.0).is_err());
        assert!(unary(Op::Ln, 0.0).is_err());
        assert!(unary(Op::Asin, 1.5).is_err());
        assert!(unary(Op::Acos, -1.5).is_err());
    }

    #[test]
    fn test_factorial_policy() {
        assert_eq!(unary(Op::Factorial, 0.0), Ok(1.0));
        assert_eq!(unary(Op::Factorial, 1.0), Ok(1.0));
        assert_eq!(unary(Op::Factorial, 5.0), Ok(120.0));
        assert!(unary(Op::Factorial, -1.0).is_err());
        assert!(unary(Op::Factorial, 2.5).is_err());
        assert!(unary(Op::Factorial, 171.0).is_err());
    }

    #[test]
    fn test_overflow_is_an_error() {
        assert!(binary(Op::Pow, 10.0, 400.0).is_err());
        assert!(unary(Op::Exp, 1000.0).is_err());
    }
}
