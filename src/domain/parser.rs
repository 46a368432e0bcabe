//! Expression parser for formula expressions.
//!
//! This module implements a recursive descent parser for arithmetic formulas
//! based on a formal BNF grammar, plus a tree-walking evaluator that resolves
//! free variables from a [`Bindings`] map.
//!
//! # BNF Grammar
//!
//! ```bnf
//! Expression     ::= Addition
//! Addition       ::= Multiplication ( ( "+" | "-" ) Multiplication )*
//! Multiplication ::= Power ( ( "*" | "/" ) Power )*
//! Power          ::= Unary ( ( "**" | "^" ) Power )?
//! Unary          ::= ( "+" | "-" ) Unary | Primary
//! Primary        ::= Number | Identifier | FunctionCall | "(" Expression ")"
//! FunctionCall   ::= Identifier "(" ArgumentList? ")"
//! ArgumentList   ::= Expression ( "," Expression )*
//! Number         ::= [0-9]+ ( "." [0-9]* )? | "." [0-9]+
//! Identifier     ::= [A-Za-z]+
//! ```
//!
//! - Addition and multiplication are left-associative
//! - Power is right-associative and binds tighter than `*` and `/`
//! - Unary signs apply to the power operand, so `-2**2` is `(-2)**2`
//! - `pi` and `e` are constants; `sqrt`, `sin`, `cos`, `tan`, `exp` and `log`
//!   are the only callable functions
//!
//! Positions reported in syntax errors are zero-based character offsets.

use std::collections::HashMap;
use std::f64::consts;
use super::errors::EvaluationError;
use super::models::Bindings;

/// Names of the built-in functions.
pub const FUNCTION_NAMES: [&str; 6] = ["sqrt", "sin", "cos", "tan", "exp", "log"];

/// Names of the built-in constants.
pub const CONSTANT_NAMES: [&str; 2] = ["pi", "e"];

/// Returns true if `name` belongs to the fixed function/constant vocabulary.
pub fn is_reserved(name: &str) -> bool {
    FUNCTION_NAMES.contains(&name) || CONSTANT_NAMES.contains(&name)
}

/// Represents a token in the expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Identifier(String),

    Plus,
    Minus,
    Multiply,
    Divide,
    Power,
    PowerAlt, // ^ alternative to **

    LeftParen,
    RightParen,
    Comma,

    Eof,
}

/// Built-in constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "pi" => Some(Constant::Pi),
            "e" => Some(Constant::E),
            _ => None,
        }
    }

    pub fn value(self) -> f64 {
        match self {
            Constant::Pi => consts::PI,
            Constant::E => consts::E,
        }
    }
}

/// Represents an Abstract Syntax Tree node for expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Variable(String),
    Constant(Constant),

    Binary {
        left: Box<Expr>,
        operator: BinaryOp,
        right: Box<Expr>,
    },

    Unary {
        operator: UnaryOp,
        operand: Box<Expr>,
    },

    FunctionCall {
        name: String,
        args: Vec<Expr>,
        /// Offset of the function name, for arity errors.
        position: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOp {
    Plus,
    Minus,
}

/// Lexical analyzer for tokenizing expressions.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    current_char: Option<char>,
    token_start: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let current_char = chars.first().copied();

        Self {
            input: chars,
            position: 0,
            current_char,
            token_start: 0,
        }
    }

    /// Offset of the first character of the most recently returned token.
    pub fn token_start(&self) -> usize {
        self.token_start
    }

    fn advance(&mut self) {
        self.position += 1;
        self.current_char = self.input.get(self.position).copied();
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Reads an integer or decimal literal.
    fn read_number(&mut self) -> Result<f64, EvaluationError> {
        let start = self.position;
        let mut number_str = String::new();

        while let Some(ch) = self.current_char {
            if ch.is_ascii_digit() {
                number_str.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if self.current_char == Some('.') {
            number_str.push('.');
            self.advance();

            while let Some(ch) = self.current_char {
                if ch.is_ascii_digit() {
                    number_str.push(ch);
                    self.advance();
                } else {
                    break;
                }
            }
        }

        number_str
            .parse::<f64>()
            .map_err(|_| EvaluationError::syntax(start, format!("invalid number '{}'", number_str)))
    }

    /// Reads a maximal run of ASCII letters.
    fn read_identifier(&mut self) -> String {
        let mut identifier = String::new();

        while let Some(ch) = self.current_char {
            if ch.is_ascii_alphabetic() {
                identifier.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        identifier
    }

    /// Gets the next token from the input.
    pub fn next_token(&mut self) -> Result<Token, EvaluationError> {
        self.skip_whitespace();
        self.token_start = self.position;

        let Some(ch) = self.current_char else {
            return Ok(Token::Eof);
        };

        let token = match ch {
            '0'..='9' | '.' => Token::Number(self.read_number()?),
            'A'..='Z' | 'a'..='z' => Token::Identifier(self.read_identifier()),
            '*' => {
                self.advance();
                if self.current_char == Some('*') {
                    self.advance();
                    Token::Power
                } else {
                    Token::Multiply
                }
            }
            _ => {
                let token = match ch {
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '/' => Token::Divide,
                    '^' => Token::PowerAlt,
                    '(' => Token::LeftParen,
                    ')' => Token::RightParen,
                    ',' => Token::Comma,
                    _ => {
                        return Err(EvaluationError::syntax(
                            self.position,
                            format!("unexpected character '{}'", ch),
                        ));
                    }
                };
                self.advance();
                token
            }
        };

        Ok(token)
    }
}

/// Signature of a built-in function.
pub type FunctionImpl = fn(f64) -> f64;

/// The fixed set of callable functions.
///
/// Functions follow plain `f64` semantics: out-of-domain arguments produce
/// NaN or infinities rather than errors.
#[derive(Debug)]
pub struct FunctionRegistry {
    functions: HashMap<&'static str, FunctionImpl>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        let mut functions: HashMap<&'static str, FunctionImpl> = HashMap::new();
        functions.insert("sqrt", f64::sqrt);
        functions.insert("sin", f64::sin);
        functions.insert("cos", f64::cos);
        functions.insert("tan", f64::tan);
        functions.insert("exp", f64::exp);
        functions.insert("log", f64::ln);

        Self { functions }
    }

    /// Looks up a function by its exact (case-sensitive) name.
    pub fn get_function(&self, name: &str) -> Option<&FunctionImpl> {
        self.functions.get(name)
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Deepest nesting of parentheses, unary signs and powers the parser accepts.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Recursive descent parser for formula expressions.
pub struct Parser {
    lexer: Lexer,
    current_token: Token,
    current_position: usize,
    depth: usize,
}

impl Parser {
    pub fn new(input: &str) -> Result<Self, EvaluationError> {
        let mut lexer = Lexer::new(input);
        let current_token = lexer.next_token()?;
        let current_position = lexer.token_start();

        Ok(Self {
            lexer,
            current_token,
            current_position,
            depth: 0,
        })
    }

    fn advance(&mut self) -> Result<(), EvaluationError> {
        self.current_token = self.lexer.next_token()?;
        self.current_position = self.lexer.token_start();
        Ok(())
    }

    fn unexpected(&self) -> EvaluationError {
        let message = match &self.current_token {
            Token::Eof => "unexpected end of expression".to_string(),
            token => format!("unexpected token {}", describe(token)),
        };
        EvaluationError::syntax(self.current_position, message)
    }

    fn expect(&mut self, expected: Token) -> Result<(), EvaluationError> {
        if self.current_token == expected {
            self.advance()
        } else {
            Err(EvaluationError::syntax(
                self.current_position,
                format!("expected {}, found {}", describe(&expected), describe(&self.current_token)),
            ))
        }
    }

    /// Parses the whole input as a single expression.
    pub fn parse(&mut self) -> Result<Expr, EvaluationError> {
        if self.current_token == Token::Eof {
            return Err(EvaluationError::SyntaxError {
                position: None,
                message: "empty expression".to_string(),
            });
        }

        let expr = self.parse_addition()?;

        if self.current_token != Token::Eof {
            return Err(EvaluationError::syntax(
                self.current_position,
                format!("unexpected {} after end of expression", describe(&self.current_token)),
            ));
        }

        Ok(expr)
    }

    fn parse_addition(&mut self) -> Result<Expr, EvaluationError> {
        let mut left = self.parse_multiplication()?;

        loop {
            let operator = match self.current_token {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Subtract,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_multiplication()?;
            left = Expr::Binary {
                left: Box::new(left),
                operator,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_multiplication(&mut self) -> Result<Expr, EvaluationError> {
        let mut left = self.parse_power()?;

        loop {
            let operator = match self.current_token {
                Token::Multiply => BinaryOp::Multiply,
                Token::Divide => BinaryOp::Divide,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_power()?;
            left = Expr::Binary {
                left: Box::new(left),
                operator,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// Parses power expressions (right-associative).
    fn parse_power(&mut self) -> Result<Expr, EvaluationError> {
        let left = self.parse_unary()?;

        if matches!(self.current_token, Token::Power | Token::PowerAlt) {
            self.advance()?;
            let right = self.parse_power()?;
            Ok(Expr::Binary {
                left: Box::new(left),
                operator: BinaryOp::Power,
                right: Box::new(right),
            })
        } else {
            Ok(left)
        }
    }

    /// Every recursive rule passes through here, so this bounds the
    /// recursion depth of parsing and of walking the resulting tree.
    fn parse_unary(&mut self) -> Result<Expr, EvaluationError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(EvaluationError::syntax(self.current_position, "expression nested too deeply"));
        }

        self.depth += 1;
        let result = self.parse_signed();
        self.depth -= 1;
        result
    }

    fn parse_signed(&mut self) -> Result<Expr, EvaluationError> {
        let operator = match self.current_token {
            Token::Plus => UnaryOp::Plus,
            Token::Minus => UnaryOp::Minus,
            _ => return self.parse_primary(),
        };
        self.advance()?;
        let operand = self.parse_unary()?;
        Ok(Expr::Unary {
            operator,
            operand: Box::new(operand),
        })
    }

    fn parse_primary(&mut self) -> Result<Expr, EvaluationError> {
        match &self.current_token {
            Token::Number(value) => {
                let value = *value;
                self.advance()?;
                Ok(Expr::Number(value))
            }

            Token::Identifier(name) => {
                let name = name.clone();
                let position = self.current_position;
                self.advance()?;

                if self.current_token == Token::LeftParen {
                    self.advance()?;
                    let args = self.parse_argument_list()?;
                    self.expect(Token::RightParen)?;
                    Ok(Expr::FunctionCall { name, args, position })
                } else if let Some(constant) = Constant::from_name(&name) {
                    Ok(Expr::Constant(constant))
                } else if FUNCTION_NAMES.contains(&name.as_str()) {
                    Err(EvaluationError::syntax(
                        position,
                        format!("function '{}' must be called with arguments", name),
                    ))
                } else {
                    Ok(Expr::Variable(name))
                }
            }

            Token::LeftParen => {
                self.advance()?;
                let expr = self.parse_addition()?;
                self.expect(Token::RightParen)?;
                Ok(expr)
            }

            _ => Err(self.unexpected()),
        }
    }

    fn parse_argument_list(&mut self) -> Result<Vec<Expr>, EvaluationError> {
        let mut args = Vec::new();

        if self.current_token == Token::RightParen {
            return Ok(args);
        }

        args.push(self.parse_addition()?);

        while self.current_token == Token::Comma {
            self.advance()?;
            args.push(self.parse_addition()?);
        }

        Ok(args)
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Number(value) => format!("number {}", value),
        Token::Identifier(name) => format!("identifier '{}'", name),
        Token::Plus => "'+'".to_string(),
        Token::Minus => "'-'".to_string(),
        Token::Multiply => "'*'".to_string(),
        Token::Divide => "'/'".to_string(),
        Token::Power => "'**'".to_string(),
        Token::PowerAlt => "'^'".to_string(),
        Token::LeftParen => "'('".to_string(),
        Token::RightParen => "')'".to_string(),
        Token::Comma => "','".to_string(),
        Token::Eof => "end of expression".to_string(),
    }
}

/// Expression evaluator that walks the AST and computes results.
pub struct ExpressionEvaluator<'a> {
    bindings: &'a Bindings,
    function_registry: &'a FunctionRegistry,
}

impl<'a> ExpressionEvaluator<'a> {
    pub fn new(bindings: &'a Bindings, function_registry: &'a FunctionRegistry) -> Self {
        Self {
            bindings,
            function_registry,
        }
    }

    /// Evaluates an expression AST to a numeric result.
    pub fn evaluate(&self, expr: &Expr) -> Result<f64, EvaluationError> {
        match expr {
            Expr::Number(value) => Ok(*value),

            Expr::Constant(constant) => Ok(constant.value()),

            Expr::Variable(name) => self
                .bindings
                .get(name)
                .copied()
                .ok_or_else(|| EvaluationError::UnknownVariable(name.clone())),

            Expr::Binary { left, operator, right } => {
                let left_val = self.evaluate(left)?;
                let right_val = self.evaluate(right)?;

                Ok(match operator {
                    BinaryOp::Add => left_val + right_val,
                    BinaryOp::Subtract => left_val - right_val,
                    BinaryOp::Multiply => left_val * right_val,
                    BinaryOp::Divide => left_val / right_val,
                    BinaryOp::Power => left_val.powf(right_val),
                })
            }

            Expr::Unary { operator, operand } => {
                let operand_val = self.evaluate(operand)?;

                Ok(match operator {
                    UnaryOp::Plus => operand_val,
                    UnaryOp::Minus => -operand_val,
                })
            }

            Expr::FunctionCall { name, args, position } => {
                let func = self
                    .function_registry
                    .get_function(name)
                    .ok_or_else(|| EvaluationError::UnknownFunction(name.clone()))?;

                match args.as_slice() {
                    [arg] => Ok(func(self.evaluate(arg)?)),
                    _ => Err(EvaluationError::syntax(
                        *position,
                        format!("{} expects 1 argument, got {}", name, args.len()),
                    )),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Expr, EvaluationError> {
        Parser::new(input)?.parse()
    }

    fn eval_with(input: &str, bindings: &[(&str, f64)]) -> Result<f64, EvaluationError> {
        let bindings: Bindings = bindings.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        let registry = FunctionRegistry::new();
        let expr = parse(input)?;
        ExpressionEvaluator::new(&bindings, &registry).evaluate(&expr)
    }

    #[test]
    fn test_lexer_numbers() {
        let mut lexer = Lexer::new("42 3.14 0.5 .25 7.");

        assert_eq!(lexer.next_token().unwrap(), Token::Number(42.0));
        assert_eq!(lexer.next_token().unwrap(), Token::Number(3.14));
        assert_eq!(lexer.next_token().unwrap(), Token::Number(0.5));
        assert_eq!(lexer.next_token().unwrap(), Token::Number(0.25));
        assert_eq!(lexer.next_token().unwrap(), Token::Number(7.0));
        assert_eq!(lexer.next_token().unwrap(), Token::Eof);
    }

    #[test]
    fn test_lexer_operators_and_delimiters() {
        let mut lexer = Lexer::new("+ - * / ** ^ ( ) ,");

        assert_eq!(lexer.next_token().unwrap(), Token::Plus);
        assert_eq!(lexer.next_token().unwrap(), Token::Minus);
        assert_eq!(lexer.next_token().unwrap(), Token::Multiply);
        assert_eq!(lexer.next_token().unwrap(), Token::Divide);
        assert_eq!(lexer.next_token().unwrap(), Token::Power);
        assert_eq!(lexer.next_token().unwrap(), Token::PowerAlt);
        assert_eq!(lexer.next_token().unwrap(), Token::LeftParen);
        assert_eq!(lexer.next_token().unwrap(), Token::RightParen);
        assert_eq!(lexer.next_token().unwrap(), Token::Comma);
        assert_eq!(lexer.next_token().unwrap(), Token::Eof);
    }

    #[test]
    fn test_lexer_identifiers_keep_case() {
        let mut lexer = Lexer::new("sqrt Rate x");

        assert_eq!(lexer.next_token().unwrap(), Token::Identifier("sqrt".to_string()));
        assert_eq!(lexer.next_token().unwrap(), Token::Identifier("Rate".to_string()));
        assert_eq!(lexer.next_token().unwrap(), Token::Identifier("x".to_string()));
        assert_eq!(lexer.next_token().unwrap(), Token::Eof);
    }

    #[test]
    fn test_lexer_token_positions() {
        let mut lexer = Lexer::new("  ab + 12");
        lexer.next_token().unwrap();
        assert_eq!(lexer.token_start(), 2);
        lexer.next_token().unwrap();
        assert_eq!(lexer.token_start(), 5);
        lexer.next_token().unwrap();
        assert_eq!(lexer.token_start(), 7);
    }

    #[test]
    fn test_lexer_error_handling() {
        let mut lexer = Lexer::new("a @ b");
        lexer.next_token().unwrap();
        assert_eq!(
            lexer.next_token().unwrap_err(),
            EvaluationError::syntax(2, "unexpected character '@'")
        );

        let mut lexer = Lexer::new(".");
        assert!(matches!(lexer.next_token(), Err(EvaluationError::SyntaxError { position: Some(0), .. })));
    }

    #[test]
    fn test_parser_operator_precedence() {
        // 2 + 3 * 4 is parsed as 2 + (3 * 4)
        let expr = parse("2 + 3 * 4").unwrap();
        match expr {
            Expr::Binary { left, operator: BinaryOp::Add, right } => {
                assert_eq!(*left, Expr::Number(2.0));
                assert!(matches!(*right, Expr::Binary { operator: BinaryOp::Multiply, .. }));
            }
            _ => panic!("Expected addition at top level"),
        }
    }

    #[test]
    fn test_parser_left_associative_subtraction() {
        // 10 - 4 - 3 is parsed as (10 - 4) - 3
        let expr = parse("10 - 4 - 3").unwrap();
        match expr {
            Expr::Binary { left, operator: BinaryOp::Subtract, right } => {
                assert!(matches!(*left, Expr::Binary { operator: BinaryOp::Subtract, .. }));
                assert_eq!(*right, Expr::Number(3.0));
            }
            _ => panic!("Expected subtraction at top level"),
        }
    }

    #[test]
    fn test_parser_power_right_associative() {
        let expr = parse("2 ** 3 ^ 2").unwrap();
        match expr {
            Expr::Binary { left, operator: BinaryOp::Power, right } => {
                assert_eq!(*left, Expr::Number(2.0));
                assert!(matches!(*right, Expr::Binary { operator: BinaryOp::Power, .. }));
            }
            _ => panic!("Expected power at top level"),
        }
    }

    #[test]
    fn test_parser_variables_constants_and_calls() {
        assert_eq!(parse("rate").unwrap(), Expr::Variable("rate".to_string()));
        assert_eq!(parse("pi").unwrap(), Expr::Constant(Constant::Pi));
        assert_eq!(parse("e").unwrap(), Expr::Constant(Constant::E));

        match parse("sqrt(b * b)").unwrap() {
            Expr::FunctionCall { name, args, position } => {
                assert_eq!(name, "sqrt");
                assert_eq!(args.len(), 1);
                assert_eq!(position, 0);
            }
            _ => panic!("Expected function call"),
        }
    }

    #[test]
    fn test_parser_unary_operations() {
        match parse("-x").unwrap() {
            Expr::Unary { operator, operand } => {
                assert_eq!(operator, UnaryOp::Minus);
                assert_eq!(*operand, Expr::Variable("x".to_string()));
            }
            _ => panic!("Expected unary expression"),
        }
        assert!(matches!(parse("--+2").unwrap(), Expr::Unary { .. }));
    }

    #[test]
    fn test_parser_error_handling() {
        assert_eq!(
            parse("").unwrap_err(),
            EvaluationError::SyntaxError { position: None, message: "empty expression".to_string() }
        );
        assert!(matches!(parse("   "), Err(EvaluationError::SyntaxError { position: None, .. })));
        assert!(matches!(parse("2 +"), Err(EvaluationError::SyntaxError { position: Some(3), .. })));
        assert!(matches!(parse("(2 + 3"), Err(EvaluationError::SyntaxError { position: Some(6), .. })));
        assert!(matches!(parse("2 + 3)"), Err(EvaluationError::SyntaxError { position: Some(5), .. })));
        assert!(matches!(parse("2 3"), Err(EvaluationError::SyntaxError { position: Some(2), .. })));
        assert!(matches!(parse("sqrt("), Err(EvaluationError::SyntaxError { .. })));
        assert!(matches!(parse("x1"), Err(EvaluationError::SyntaxError { position: Some(1), .. })));
    }

    #[test]
    fn test_parser_nesting_limit() {
        let n = 10_000;
        let deep_parens = format!("{}1{}", "(".repeat(n), ")".repeat(n));
        assert!(matches!(
            parse(&deep_parens),
            Err(EvaluationError::SyntaxError { message, .. }) if message == "expression nested too deeply"
        ));

        let deep_signs = format!("{}1", "-".repeat(n));
        assert!(matches!(parse(&deep_signs), Err(EvaluationError::SyntaxError { .. })));

        let deep_calls = format!("{}x{}", "sqrt(".repeat(n), ")".repeat(n));
        assert!(matches!(parse(&deep_calls), Err(EvaluationError::SyntaxError { .. })));

        let power_chain = vec!["2"; n].join("^");
        assert!(matches!(parse(&power_chain), Err(EvaluationError::SyntaxError { .. })));

        // Moderate nesting still parses and evaluates
        let nested = format!("{}1{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(eval_with(&nested, &[]).unwrap(), 1.0);
        assert_eq!(eval_with(&format!("{}3", "-".repeat(100)), &[]).unwrap(), 3.0);
    }

    #[test]
    fn test_parser_bare_function_name() {
        assert!(matches!(
            parse("2 * sqrt"),
            Err(EvaluationError::SyntaxError { position: Some(4), .. })
        ));
    }

    #[test]
    fn test_function_registry() {
        let registry = FunctionRegistry::new();

        for name in FUNCTION_NAMES {
            assert!(registry.get_function(name).is_some(), "{} should be registered", name);
        }
        assert!(registry.get_function("SQRT").is_none());
        assert!(registry.get_function("pi").is_none());
        assert!(registry.get_function("abs").is_none());

        let log = registry.get_function("log").unwrap();
        assert!((log(consts::E) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_evaluator_arithmetic() {
        assert_eq!(eval_with("2 + 3 * 4", &[]).unwrap(), 14.0);
        assert_eq!(eval_with("(2 + 3) * 4", &[]).unwrap(), 20.0);
        assert_eq!(eval_with("10 - 4 - 3", &[]).unwrap(), 3.0);
        assert_eq!(eval_with("8 / 4 / 2", &[]).unwrap(), 1.0);
        assert_eq!(eval_with("2 ** 3 ** 2", &[]).unwrap(), 512.0);
        assert_eq!(eval_with("-2 ^ 2", &[]).unwrap(), 4.0);
        assert_eq!(eval_with("-(2 + 3)", &[]).unwrap(), -5.0);
        assert_eq!(eval_with("+4", &[]).unwrap(), 4.0);
    }

    #[test]
    fn test_evaluator_variables_and_functions() {
        assert_eq!(eval_with("a * b", &[("a", 6.0), ("b", 7.0)]).unwrap(), 42.0);
        assert_eq!(eval_with("sqrt(x)", &[("x", 16.0)]).unwrap(), 4.0);
        assert_eq!(eval_with("exp(0)", &[]).unwrap(), 1.0);
        assert!((eval_with("log(e)", &[]).unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(eval_with("cos(0)", &[]).unwrap(), 1.0);
        assert!(eval_with("sin(pi)", &[]).unwrap().abs() < 1e-12);
        assert!((eval_with("tan(pi / 4)", &[]).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_evaluator_ieee_semantics() {
        assert_eq!(eval_with("1 / 0", &[]).unwrap(), f64::INFINITY);
        assert_eq!(eval_with("-1 / 0", &[]).unwrap(), f64::NEG_INFINITY);
        assert!(eval_with("0 / 0", &[]).unwrap().is_nan());
        assert!(eval_with("sqrt(-1)", &[]).unwrap().is_nan());
        assert_eq!(eval_with("log(0)", &[]).unwrap(), f64::NEG_INFINITY);
    }

    #[test]
    fn test_evaluator_errors() {
        assert_eq!(
            eval_with("a + 1", &[]).unwrap_err(),
            EvaluationError::UnknownVariable("a".to_string())
        );
        assert_eq!(
            eval_with("abs(2)", &[]).unwrap_err(),
            EvaluationError::UnknownFunction("abs".to_string())
        );
        assert_eq!(
            eval_with("pi(2)", &[]).unwrap_err(),
            EvaluationError::UnknownFunction("pi".to_string())
        );
        assert_eq!(
            eval_with("1 + sqrt(1, 2)", &[]).unwrap_err(),
            EvaluationError::syntax(4, "sqrt expects 1 argument, got 2")
        );
        assert!(matches!(
            eval_with("sin()", &[]),
            Err(EvaluationError::SyntaxError { position: Some(0), .. })
        ));
    }
}
