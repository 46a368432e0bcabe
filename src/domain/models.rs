use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Numeric values for the free variables of one evaluation.
pub type Bindings = BTreeMap<String, f64>;

/// Opaque identifier of a formula, unique for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormulaId(Uuid);

impl FormulaId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FormulaId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FormulaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named arithmetic expression with free variables.
///
/// The expression is stored as typed; it is only checked when evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    pub id: FormulaId,
    pub name: String,
    pub expression: String,
}

impl Formula {
    pub fn new(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            id: FormulaId::new(),
            name: name.into(),
            expression: expression.into(),
        }
    }
}

/// The in-memory formula collection, kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct FormulaBook {
    formulas: Vec<Formula>,
}

impl FormulaBook {
    pub fn add(&mut self, formula: Formula) -> FormulaId {
        let id = formula.id;
        self.formulas.push(formula);
        id
    }

    pub fn remove(&mut self, id: FormulaId) -> Option<Formula> {
        let index = self.position(id)?;
        Some(self.formulas.remove(index))
    }

    pub fn get(&self, id: FormulaId) -> Option<&Formula> {
        self.formulas.iter().find(|f| f.id == id)
    }

    pub fn get_at(&self, index: usize) -> Option<&Formula> {
        self.formulas.get(index)
    }

    pub fn position(&self, id: FormulaId) -> Option<usize> {
        self.formulas.iter().position(|f| f.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Formula> {
        self.formulas.iter()
    }

    pub fn len(&self) -> usize {
        self.formulas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formulas.is_empty()
    }
}

/// One line of calculation history, rendered as `<formula name>: <result>`.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub formula_name: String,
    pub result: String,
}

impl HistoryEntry {
    pub fn new(formula_name: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            formula_name: formula_name.into(),
            result: result.into(),
        }
    }
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.formula_name, self.result)
    }
}

/// Append-only log of successful calculations. Entries are never edited;
/// the log can only be cleared as a whole.
#[derive(Debug, Clone, Default)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
