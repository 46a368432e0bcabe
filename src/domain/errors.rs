use thiserror::Error;

/// Reasons an expression can fail to evaluate.
///
/// Division by zero and `sqrt` of a negative number are not errors: they
/// evaluate to IEEE 754 infinities or NaN.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    #[error("unknown variable: {0}")]
    UnknownVariable(String),
    #[error("unknown function: {0}")]
    UnknownFunction(String),
    #[error("syntax error{}: {message}", position_suffix(.position))]
    SyntaxError {
        /// Zero-based character offset into the expression, when known.
        position: Option<usize>,
        message: String,
    },
}

impl EvaluationError {
    pub fn syntax(position: usize, message: impl Into<String>) -> Self {
        EvaluationError::SyntaxError {
            position: Some(position),
            message: message.into(),
        }
    }
}

fn position_suffix(position: &Option<usize>) -> String {
    position.map(|p| format!(" at {}", p)).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("{0} needs a valid number")]
    InvalidBinding(String),
    #[error("formula name cannot be empty")]
    EmptyName,
    #[error("formula expression cannot be empty")]
    EmptyExpression,
    #[error("no formula selected")]
    NoFormulaSelected,
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_binding_message() {
        let err = DomainError::InvalidBinding("a".to_string());
        assert_eq!(err.to_string(), "a needs a valid number");
    }

    #[test]
    fn test_syntax_error_display() {
        assert_eq!(
            EvaluationError::syntax(4, "expected ')'").to_string(),
            "syntax error at 4: expected ')'"
        );
        let err = EvaluationError::SyntaxError { position: None, message: "empty expression".to_string() };
        assert_eq!(err.to_string(), "syntax error: empty expression");
    }

    #[test]
    fn test_evaluation_error_is_transparent() {
        let err: DomainError = EvaluationError::UnknownFunction("foo".to_string()).into();
        assert_eq!(err.to_string(), "unknown function: foo");
    }
}
