use std::error::Error;
use std::fmt;

/// Expression calculation result: either the final value or an error
pub type CalcResult = Result<f64, CalcError>;
pub(crate) type CalcErrorResult = Result<(), CalcError>;

/// Everything that can go wrong while evaluating an expression.
///
/// Positions are byte offsets into the original expression string.
#[derive(Clone, Debug, PartialEq)]
pub enum CalcError {
    /// The expression contains no tokens at all
    EmptyExpression,
    /// A token does not fit the grammar; carries a description of what
    /// the parser expected instead
    Syntax { expected: String, pos: usize },
    /// An arithmetic or domain failure (division by zero, invalid
    /// number literal, logarithm of a negative number, and so on)
    Calculate { msg: String, pos: usize },
}

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            CalcError::EmptyExpression => write!(f, "Nothing to calculate"),
            CalcError::Syntax { expected, pos } => {
                write!(f, "Syntax error at position {}: {} expected", pos, expected)
            }
            CalcError::Calculate { msg, pos } => {
                write!(f, "Calculation error at position {}: {}", pos, msg)
            }
        }
    }
}

impl Error for CalcError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let e = CalcError::Syntax {
            expected: "')'".to_string(),
            pos: 4,
        };
        assert_eq!(format!("{}", e), "Syntax error at position 4: ')' expected");
        let e = CalcError::Calculate {
            msg: "division by zero".to_string(),
            pos: 2,
        };
        assert_eq!(format!("{}", e), "Calculation error at position 2: division by zero");
        assert_eq!(format!("{}", CalcError::EmptyExpression), "Nothing to calculate");
    }
}
