//! Formula services: variable extraction, evaluation and result formatting.
//!
//! These are pure functions over strings and [`Bindings`]. They hold no
//! shared state and can be called from any thread.

use std::collections::{BTreeMap, BTreeSet};
use log::debug;
use super::errors::{DomainError, DomainResult, EvaluationError};
use super::models::{Bindings, Formula, HistoryEntry};
use super::parser::{is_reserved, ExpressionEvaluator, FunctionRegistry, Parser};

/// Returns the free variables of `expression`, sorted and deduplicated.
///
/// Scanning is purely lexical: every maximal run of ASCII letters is a
/// candidate, and the function/constant names (`sqrt`, `sin`, `cos`, `tan`,
/// `exp`, `log`, `pi`, `e`) are dropped. Malformed expressions are not
/// rejected here.
///
/// # Examples
///
/// ```
/// use formulary::domain::extract_variables;
///
/// assert_eq!(extract_variables("a + b"), vec!["a", "b"]);
/// assert_eq!(
///     extract_variables("(-b + sqrt(b*b - 4*a*c)) / (2*a)"),
///     vec!["a", "b", "c"]
/// );
/// assert!(extract_variables("2 * pi").is_empty());
/// ```
pub fn extract_variables(expression: &str) -> Vec<String> {
    let mut names = BTreeSet::new();
    let mut current = String::new();

    for ch in expression.chars() {
        if ch.is_ascii_alphabetic() {
            current.push(ch);
        } else if !current.is_empty() {
            names.insert(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        names.insert(current);
    }

    names.into_iter().filter(|name| !is_reserved(name)).collect()
}

/// Evaluates `expression` with the given variable values.
///
/// Every free variable must be bound; the first unbound one in sorted order
/// is reported as [`EvaluationError::UnknownVariable`]. Division by zero and
/// out-of-domain function arguments produce infinities or NaN, not errors.
///
/// # Examples
///
/// ```
/// use formulary::domain::{evaluate, Bindings, EvaluationError};
///
/// let mut bindings = Bindings::new();
/// bindings.insert("a".to_string(), 2.0);
/// bindings.insert("b".to_string(), 3.0);
/// assert_eq!(evaluate("a + b", &bindings), Ok(5.0));
///
/// bindings.remove("b");
/// assert_eq!(
///     evaluate("a + b", &bindings),
///     Err(EvaluationError::UnknownVariable("b".to_string()))
/// );
/// ```
pub fn evaluate(expression: &str, bindings: &Bindings) -> Result<f64, EvaluationError> {
    FormulaEvaluator::new().evaluate_expression(expression, bindings)
}

/// Formats a result for display.
///
/// Uses the shortest decimal that reads back as the same `f64`. Integral
/// values carry no decimal point. Very large or very small magnitudes switch
/// to exponent notation.
///
/// # Examples
///
/// ```
/// use formulary::domain::format_result;
///
/// assert_eq!(format_result(4.0), "4");
/// assert_eq!(format_result(4.5), "4.5");
/// assert_eq!(format_result(f64::INFINITY), "inf");
/// ```
pub fn format_result(value: f64) -> String {
    let magnitude = value.abs();
    if value.is_finite() && value != 0.0 && !(1e-6..1e16).contains(&magnitude) {
        format!("{:e}", value)
    } else {
        value.to_string()
    }
}

/// Parses the user's typed values for `variables` into [`Bindings`].
///
/// Each input is trimmed and must parse as a finite `f64`; otherwise the
/// offending variable is reported as [`DomainError::InvalidBinding`].
pub fn bind_inputs(variables: &[String], inputs: &BTreeMap<String, String>) -> DomainResult<Bindings> {
    let mut bindings = Bindings::new();

    for name in variables {
        let value = inputs
            .get(name)
            .and_then(|text| text.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite())
            .ok_or_else(|| DomainError::InvalidBinding(name.clone()))?;
        bindings.insert(name.clone(), value);
    }

    Ok(bindings)
}

/// Evaluates formulas against the built-in function set.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use formulary::domain::{Formula, FormulaEvaluator};
///
/// let evaluator = FormulaEvaluator::new();
/// let formula = Formula::new("Rectangle area", "w * h");
/// assert_eq!(evaluator.variables(&formula), vec!["h", "w"]);
///
/// let mut inputs = BTreeMap::new();
/// inputs.insert("w".to_string(), "3".to_string());
/// inputs.insert("h".to_string(), "1.5".to_string());
/// let entry = evaluator.calculate(&formula, &inputs).unwrap();
/// assert_eq!(entry.to_string(), "Rectangle area: 4.5");
/// ```
#[derive(Debug)]
pub struct FormulaEvaluator {
    function_registry: FunctionRegistry,
}

impl FormulaEvaluator {
    pub fn new() -> Self {
        Self {
            function_registry: FunctionRegistry::new(),
        }
    }

    /// Free variables of a formula, in the order input fields are shown.
    pub fn variables(&self, formula: &Formula) -> Vec<String> {
        extract_variables(&formula.expression)
    }

    /// Checks bindings, parses and evaluates an expression.
    pub fn evaluate_expression(&self, expression: &str, bindings: &Bindings) -> Result<f64, EvaluationError> {
        if let Some(missing) = extract_variables(expression)
            .into_iter()
            .find(|name| !bindings.contains_key(name))
        {
            return Err(EvaluationError::UnknownVariable(missing));
        }

        let mut parser = Parser::new(expression)?;
        let ast = parser.parse()?;

        let evaluator = ExpressionEvaluator::new(bindings, &self.function_registry);
        evaluator.evaluate(&ast)
    }

    pub fn evaluate(&self, formula: &Formula, bindings: &Bindings) -> Result<f64, EvaluationError> {
        self.evaluate_expression(&formula.expression, bindings)
    }

    /// Binds the typed inputs, evaluates the formula and builds the history
    /// line for the result.
    pub fn calculate(&self, formula: &Formula, inputs: &BTreeMap<String, String>) -> DomainResult<HistoryEntry> {
        let variables = self.variables(formula);
        let bindings = bind_inputs(&variables, inputs)?;
        let value = self.evaluate(formula, &bindings)?;
        let result = format_result(value);

        debug!("evaluated '{}' ({}) = {}", formula.name, formula.expression, result);
        Ok(HistoryEntry::new(formula.name.clone(), result))
    }
}

impl Default for FormulaEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bindings(pairs: &[(&str, f64)]) -> Bindings {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn inputs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_extract_no_letters() {
        assert!(extract_variables("").is_empty());
        assert!(extract_variables("1 + 2 * (3 / 4)").is_empty());
        assert!(extract_variables("((( ").is_empty());
    }

    #[test]
    fn test_extract_reserved_only() {
        assert!(extract_variables("sqrt(pi) + sin(e) * cos(1) - tan(2) + exp(3) / log(4)").is_empty());
    }

    #[test]
    fn test_extract_sorted_and_deduplicated() {
        assert_eq!(extract_variables("a + b"), vec!["a", "b"]);
        assert_eq!(extract_variables("(-b + sqrt(b*b - 4*a*c)) / (2*a)"), vec!["a", "b", "c"]);
        assert_eq!(extract_variables("z * y * z + x"), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_extract_is_case_sensitive() {
        assert_eq!(extract_variables("Rate * rate + PI + Sqrt"), vec!["PI", "Rate", "Sqrt", "rate"]);
    }

    #[test]
    fn test_extract_maximal_letter_runs() {
        // Digits and underscores split runs; "pie" is not "pi".
        assert_eq!(extract_variables("x1 + y_z + pie"), vec!["pie", "x", "y", "z"]);
    }

    #[test]
    fn test_extract_ignores_syntax() {
        assert_eq!(extract_variables("(a +* b"), vec!["a", "b"]);
    }

    #[test]
    fn test_evaluate_basic() {
        assert_eq!(evaluate("a + b", &bindings(&[("a", 2.0), ("b", 3.0)])), Ok(5.0));
        assert_eq!(evaluate("2 * pi * r", &bindings(&[("r", 0.5)])), Ok(std::f64::consts::PI));
    }

    #[test]
    fn test_evaluate_quadratic_root() {
        let root = evaluate(
            "(-b + sqrt(b*b - 4*a*c)) / (2*a)",
            &bindings(&[("a", 1.0), ("b", -3.0), ("c", 2.0)]),
        );
        assert_eq!(root, Ok(2.0));
    }

    #[test]
    fn test_evaluate_division_by_zero_is_not_an_error() {
        let result = evaluate("a / b", &bindings(&[("a", 4.0), ("b", 0.0)])).unwrap();
        assert!(result.is_infinite());

        let result = evaluate("a / b", &bindings(&[("a", 0.0), ("b", 0.0)])).unwrap();
        assert!(result.is_nan());
    }

    #[test]
    fn test_evaluate_sqrt_negative_is_nan() {
        assert!(evaluate("sqrt(a)", &bindings(&[("a", -1.0)])).unwrap().is_nan());
    }

    #[test]
    fn test_evaluate_unknown_variable() {
        assert_eq!(
            evaluate("a + b", &bindings(&[("a", 2.0)])),
            Err(EvaluationError::UnknownVariable("b".to_string()))
        );
        // First missing name in sorted order.
        assert_eq!(
            evaluate("z + y", &bindings(&[])),
            Err(EvaluationError::UnknownVariable("y".to_string()))
        );
    }

    #[test]
    fn test_evaluate_syntax_error() {
        assert!(matches!(
            evaluate("(a + b", &bindings(&[("a", 1.0), ("b", 2.0)])),
            Err(EvaluationError::SyntaxError { .. })
        ));
        assert!(matches!(evaluate("", &bindings(&[])), Err(EvaluationError::SyntaxError { .. })));
        assert!(matches!(evaluate("1 +", &bindings(&[])), Err(EvaluationError::SyntaxError { .. })));
        assert!(matches!(evaluate("1 2", &bindings(&[])), Err(EvaluationError::SyntaxError { .. })));
    }

    #[test]
    fn test_evaluate_deep_nesting_is_an_error() {
        let expression = format!("{}a{}", "(".repeat(5_000), ")".repeat(5_000));
        assert!(matches!(
            evaluate(&expression, &bindings(&[("a", 1.0)])),
            Err(EvaluationError::SyntaxError { position: Some(_), .. })
        ));
    }

    #[test]
    fn test_evaluate_unknown_function() {
        assert_eq!(
            evaluate("f(2)", &bindings(&[("f", 1.0)])),
            Err(EvaluationError::UnknownFunction("f".to_string()))
        );
        assert_eq!(
            evaluate("e(2)", &bindings(&[])),
            Err(EvaluationError::UnknownFunction("e".to_string()))
        );
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let b = bindings(&[("a", 1.5), ("b", 2.25)]);
        let first = evaluate("a ** 2 + b / 3", &b);
        let second = evaluate("a ** 2 + b / 3", &b);
        assert_eq!(first, second);

        let first = evaluate("a +", &b);
        let second = evaluate("a +", &b);
        assert_eq!(first, second);
    }

    #[test]
    fn test_evaluate_ignores_extra_bindings() {
        assert_eq!(evaluate("a", &bindings(&[("a", 1.0), ("b", 2.0)])), Ok(1.0));
    }

    #[test]
    fn test_format_result() {
        assert_eq!(format_result(4.0), "4");
        assert_eq!(format_result(-12.0), "-12");
        assert_eq!(format_result(4.5), "4.5");
        assert_eq!(format_result(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_result(1.0 / 3.0), "0.3333333333333333");
        assert_eq!(format_result(0.0), "0");
        assert_eq!(format_result(1e20), "1e20");
        assert_eq!(format_result(2.5e-9), "2.5e-9");
        assert_eq!(format_result(f64::INFINITY), "inf");
        assert_eq!(format_result(f64::NEG_INFINITY), "-inf");
        assert_eq!(format_result(f64::NAN), "NaN");
    }

    #[test]
    fn test_bind_inputs() {
        let variables = vec!["a".to_string(), "b".to_string()];
        let bound = bind_inputs(&variables, &inputs(&[("a", " 2 "), ("b", "-0.5")])).unwrap();
        assert_eq!(bound, bindings(&[("a", 2.0), ("b", -0.5)]));
    }

    #[test]
    fn test_bind_inputs_rejects_invalid_values() {
        let variables = vec!["a".to_string(), "b".to_string()];

        for bad in ["", "   ", "abc", "1.2.3", "inf", "NaN"] {
            let err = bind_inputs(&variables, &inputs(&[("a", "1"), ("b", bad)])).unwrap_err();
            assert_eq!(err, DomainError::InvalidBinding("b".to_string()), "input {:?}", bad);
        }

        let err = bind_inputs(&variables, &inputs(&[("b", "1")])).unwrap_err();
        assert_eq!(err.to_string(), "a needs a valid number");
    }

    #[test]
    fn test_formula_evaluator_calculate() {
        let evaluator = FormulaEvaluator::new();
        let formula = Formula::new("Sum", "a + b");

        let entry = evaluator.calculate(&formula, &inputs(&[("a", "2"), ("b", "3")])).unwrap();
        assert_eq!(entry.to_string(), "Sum: 5");

        let err = evaluator.calculate(&formula, &inputs(&[("a", "2"), ("b", "x")])).unwrap_err();
        assert_eq!(err, DomainError::InvalidBinding("b".to_string()));

        let broken = Formula::new("Broken", "(a");
        let err = evaluator.calculate(&broken, &inputs(&[("a", "1")])).unwrap_err();
        assert!(matches!(err, DomainError::Evaluation(EvaluationError::SyntaxError { .. })));
    }
}
