//! Application state management for the formula calculator.
//!
//! This module contains the main application state, the tab and mode
//! machinery, and the command API the presentation layer drives.

use std::collections::BTreeMap;
use log::{info, warn};
use crate::domain::{
    DomainError, DomainResult, Formula, FormulaBook, FormulaEvaluator, FormulaId, HistoryEntry, HistoryLog,
};
use crate::infrastructure::AppConfig;

/// The three screens of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    /// List of formulas with add/delete
    Formulas,
    /// Variable inputs and result for the active formula
    Calculate,
    /// Past results
    History,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Formulas, Tab::Calculate, Tab::History];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Formulas => "Formulas",
            Tab::Calculate => "Calculate",
            Tab::History => "History",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Tab::Formulas => 0,
            Tab::Calculate => 1,
            Tab::History => 2,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Represents the current mode of the application.
///
/// The mode decides how key presses are interpreted and which popups are
/// drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Navigation between tabs and list items
    Normal,
    /// The add-formula form is open
    AddingFormula,
    /// User is typing into a variable field
    EditingVariable,
    /// Help screen is displayed
    Help,
    /// History export filename prompt is open
    ExportHistory,
}

/// Which field of the add-formula form has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Expression,
}

/// One input field of the calculation screen.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableInput {
    pub name: String,
    /// Text as typed; parsed only when calculating.
    pub value: String,
}

/// Main application state.
///
/// `App` owns the formula book and the history log and only changes them
/// through `&mut self` methods. The event loop is its single owner; a host
/// that shares it between threads must put it behind a lock.
///
/// # Examples
///
/// ```
/// use formulary::application::{App, Tab};
///
/// let mut app = App::default();
/// app.add_formula("Sum", "a + b").unwrap();
/// app.activate_selected_formula();
/// assert_eq!(app.tab, Tab::Calculate);
/// assert_eq!(app.variable_inputs.len(), 2);
/// ```
#[derive(Debug)]
pub struct App {
    /// All formulas, in display order
    pub formulas: FormulaBook,
    /// Successful calculations, oldest first
    pub history: HistoryLog,
    /// Currently visible tab
    pub tab: Tab,
    /// Current application mode
    pub mode: AppMode,
    /// Highlighted row in the formula list
    pub selected_formula: usize,
    /// Formula shown on the calculation screen
    pub active_formula: Option<FormulaId>,
    /// One field per free variable of the active formula, sorted by name
    pub variable_inputs: Vec<VariableInput>,
    /// Highlighted variable field
    pub selected_variable: usize,
    /// Formatted result of the last successful calculation
    pub last_result: Option<String>,
    /// Input buffer for the variable being edited
    pub input: String,
    /// Cursor position, in characters, within the buffer being edited
    pub cursor_position: usize,
    /// Add-formula form: name field
    pub form_name: String,
    /// Add-formula form: expression field
    pub form_expression: String,
    /// Add-formula form: focused field
    pub form_field: FormField,
    /// Input buffer for filename entry
    pub filename_input: String,
    /// File name offered by the export prompt
    pub export_filename: String,
    /// Scroll position in help text
    pub help_scroll: usize,
    /// Temporary status message to display
    pub status_message: Option<String>,
    evaluator: FormulaEvaluator,
}

impl Default for App {
    fn default() -> Self {
        Self {
            formulas: FormulaBook::default(),
            history: HistoryLog::default(),
            tab: Tab::Formulas,
            mode: AppMode::Normal,
            selected_formula: 0,
            active_formula: None,
            variable_inputs: Vec::new(),
            selected_variable: 0,
            last_result: None,
            input: String::new(),
            cursor_position: 0,
            form_name: String::new(),
            form_expression: String::new(),
            form_field: FormField::Name,
            filename_input: String::new(),
            export_filename: "history.csv".to_string(),
            help_scroll: 0,
            status_message: None,
            evaluator: FormulaEvaluator::new(),
        }
    }
}

impl App {
    /// Creates the application with the configured starter formulas.
    pub fn from_config(config: &AppConfig) -> Self {
        let mut app = Self {
            export_filename: config.export_filename.clone(),
            ..Self::default()
        };
        for seed in &config.formulas {
            app.formulas.add(seed.to_formula());
        }
        app
    }

    pub fn next_tab(&mut self) {
        self.tab = self.tab.next();
    }

    pub fn previous_tab(&mut self) {
        self.tab = self.tab.previous();
    }

    // Formula list

    pub fn select_next_formula(&mut self) {
        if self.selected_formula + 1 < self.formulas.len() {
            self.selected_formula += 1;
        }
    }

    pub fn select_previous_formula(&mut self) {
        self.selected_formula = self.selected_formula.saturating_sub(1);
    }

    /// Appends a formula to the book.
    ///
    /// Name and expression are trimmed and must not be empty. The expression
    /// is not parsed here; mistakes surface when it is evaluated.
    pub fn add_formula(&mut self, name: &str, expression: &str) -> DomainResult<FormulaId> {
        let name = name.trim();
        let expression = expression.trim();
        if name.is_empty() {
            return Err(DomainError::EmptyName);
        }
        if expression.is_empty() {
            return Err(DomainError::EmptyExpression);
        }

        let id = self.formulas.add(Formula::new(name, expression));
        info!("added formula '{}' = {}", name, expression);
        Ok(id)
    }

    /// Removes the highlighted formula. Clears the calculation screen if it
    /// was showing that formula.
    pub fn delete_selected_formula(&mut self) -> Option<Formula> {
        let id = self.formulas.get_at(self.selected_formula)?.id;
        let removed = self.formulas.remove(id)?;

        if self.active_formula == Some(id) {
            self.clear_calculation();
        }
        if self.selected_formula >= self.formulas.len() {
            self.selected_formula = self.formulas.len().saturating_sub(1);
        }

        info!("deleted formula '{}'", removed.name);
        self.status_message = Some(format!("Deleted formula '{}'", removed.name));
        Some(removed)
    }

    /// Makes the formula at `index` active and opens the calculation tab.
    ///
    /// The variable fields are rebuilt from scratch, so values typed for a
    /// previous formula are dropped.
    pub fn select_formula(&mut self, index: usize) -> bool {
        let Some(formula) = self.formulas.get_at(index) else {
            return false;
        };

        self.variable_inputs = self
            .evaluator
            .variables(formula)
            .into_iter()
            .map(|name| VariableInput { name, value: String::new() })
            .collect();
        self.active_formula = Some(formula.id);
        self.selected_formula = index;
        self.selected_variable = 0;
        self.last_result = None;
        self.tab = Tab::Calculate;
        true
    }

    pub fn activate_selected_formula(&mut self) -> bool {
        self.select_formula(self.selected_formula)
    }

    pub fn active_formula(&self) -> Option<&Formula> {
        self.active_formula.and_then(|id| self.formulas.get(id))
    }

    fn clear_calculation(&mut self) {
        self.active_formula = None;
        self.variable_inputs.clear();
        self.selected_variable = 0;
        self.last_result = None;
    }

    // Add-formula form

    pub fn start_add_formula(&mut self) {
        self.mode = AppMode::AddingFormula;
        self.form_name.clear();
        self.form_expression.clear();
        self.form_field = FormField::Name;
        self.cursor_position = 0;
        self.status_message = None;
    }

    /// Moves focus to the other form field, cursor at its end.
    pub fn toggle_form_field(&mut self) {
        self.form_field = match self.form_field {
            FormField::Name => FormField::Expression,
            FormField::Expression => FormField::Name,
        };
        self.cursor_position = self.active_buffer().map_or(0, |b| b.chars().count());
    }

    /// Submits the form. On a validation error the form stays open and the
    /// reason is shown in the status bar.
    pub fn finish_add_formula(&mut self) {
        let name = self.form_name.clone();
        let expression = self.form_expression.clone();

        match self.add_formula(&name, &expression) {
            Ok(_) => {
                self.selected_formula = self.formulas.len() - 1;
                self.status_message = Some(format!("Added formula '{}'", name.trim()));
                self.cancel_add_formula();
            }
            Err(error) => {
                self.status_message = Some(error.to_string());
            }
        }
    }

    pub fn cancel_add_formula(&mut self) {
        self.mode = AppMode::Normal;
        self.form_name.clear();
        self.form_expression.clear();
        self.form_field = FormField::Name;
        self.cursor_position = 0;
    }

    // Calculation screen

    pub fn select_next_variable(&mut self) {
        if self.selected_variable + 1 < self.variable_inputs.len() {
            self.selected_variable += 1;
        }
    }

    pub fn select_previous_variable(&mut self) {
        self.selected_variable = self.selected_variable.saturating_sub(1);
    }

    /// Opens the highlighted variable field for editing.
    pub fn start_editing_variable(&mut self) {
        if let Some(field) = self.variable_inputs.get(self.selected_variable) {
            self.input = field.value.clone();
            self.cursor_position = self.input.chars().count();
            self.mode = AppMode::EditingVariable;
            self.status_message = None;
        }
    }

    /// Stores the edited text and moves to the next field.
    pub fn finish_editing_variable(&mut self) {
        if let Some(field) = self.variable_inputs.get_mut(self.selected_variable) {
            field.value = std::mem::take(&mut self.input);
        }
        self.select_next_variable();
        self.cancel_editing();
    }

    /// Leaves the field without keeping the typed text.
    pub fn cancel_editing(&mut self) {
        self.mode = AppMode::Normal;
        self.input.clear();
        self.cursor_position = 0;
    }

    /// Typed values keyed by variable name.
    pub fn variable_values(&self) -> BTreeMap<String, String> {
        self.variable_inputs
            .iter()
            .map(|field| (field.name.clone(), field.value.clone()))
            .collect()
    }

    /// Evaluates the active formula with the typed values.
    ///
    /// On success the result is appended to the history; on failure the
    /// history and formulas are left as they were and the error is shown in
    /// the status bar.
    pub fn calculate(&mut self) -> DomainResult<HistoryEntry> {
        let outcome = match self.active_formula() {
            Some(formula) => self.evaluator.calculate(formula, &self.variable_values()),
            None => Err(DomainError::NoFormulaSelected),
        };

        match &outcome {
            Ok(entry) => {
                self.history.push(entry.clone());
                self.last_result = Some(entry.result.clone());
                self.status_message = Some(entry.to_string());
            }
            Err(error) => {
                warn!("calculation failed: {}", error);
                self.status_message = Some(error.to_string());
            }
        }

        outcome
    }

    // History

    pub fn clear_history(&mut self) {
        let count = self.history.len();
        self.history.clear();
        info!("cleared {} history entries", count);
        self.status_message = Some("History cleared".to_string());
    }

    /// Switches to export mode to prompt for a filename.
    pub fn start_history_export(&mut self) {
        self.mode = AppMode::ExportHistory;
        self.filename_input = self.export_filename.clone();
        self.cursor_position = self.filename_input.chars().count();
        self.status_message = None;
    }

    /// Returns the filename input if not empty, otherwise the configured default.
    pub fn get_export_filename(&self) -> String {
        if self.filename_input.trim().is_empty() {
            self.export_filename.clone()
        } else {
            self.filename_input.trim().to_string()
        }
    }

    /// Processes the result of an export and returns to normal mode.
    pub fn set_export_result(&mut self, result: Result<String, String>) {
        match result {
            Ok(filename) => {
                self.status_message = Some(format!(
                    "Exported {} entr{} to {}",
                    self.history.len(),
                    if self.history.len() == 1 { "y" } else { "ies" },
                    filename
                ));
            }
            Err(error) => {
                warn!("history export failed: {}", error);
                self.status_message = Some(format!("Export failed: {}", error));
            }
        }

        self.cancel_filename_input();
    }

    pub fn cancel_filename_input(&mut self) {
        self.mode = AppMode::Normal;
        self.filename_input.clear();
        self.cursor_position = 0;
    }

    pub fn set_clipboard_result(&mut self, result: Result<String, String>) {
        self.status_message = Some(match result {
            Ok(text) => format!("Copied {} to clipboard", text),
            Err(error) => format!("Copy failed: {}", error),
        });
    }

    /// Keeps the help scroll position within `max_scroll`.
    pub fn clamp_help_scroll(&mut self, max_scroll: usize) {
        self.help_scroll = self.help_scroll.min(max_scroll);
    }

    // Text editing on whichever buffer the mode is editing

    fn active_buffer(&self) -> Option<&String> {
        match self.mode {
            AppMode::AddingFormula => Some(match self.form_field {
                FormField::Name => &self.form_name,
                FormField::Expression => &self.form_expression,
            }),
            AppMode::EditingVariable => Some(&self.input),
            AppMode::ExportHistory => Some(&self.filename_input),
            AppMode::Normal | AppMode::Help => None,
        }
    }

    fn active_buffer_mut(&mut self) -> Option<&mut String> {
        match self.mode {
            AppMode::AddingFormula => Some(match self.form_field {
                FormField::Name => &mut self.form_name,
                FormField::Expression => &mut self.form_expression,
            }),
            AppMode::EditingVariable => Some(&mut self.input),
            AppMode::ExportHistory => Some(&mut self.filename_input),
            AppMode::Normal | AppMode::Help => None,
        }
    }

    pub fn insert_char(&mut self, c: char) {
        let cursor = self.cursor_position;
        if let Some(buffer) = self.active_buffer_mut() {
            let at = byte_offset(buffer, cursor);
            buffer.insert(at, c);
            self.cursor_position += 1;
        }
    }

    /// Backspace.
    pub fn delete_char_before_cursor(&mut self) {
        let cursor = self.cursor_position;
        if cursor == 0 {
            return;
        }
        if let Some(buffer) = self.active_buffer_mut() {
            let at = byte_offset(buffer, cursor - 1);
            buffer.remove(at);
            self.cursor_position -= 1;
        }
    }

    /// Delete.
    pub fn delete_char_at_cursor(&mut self) {
        let cursor = self.cursor_position;
        if let Some(buffer) = self.active_buffer_mut() {
            if cursor < buffer.chars().count() {
                let at = byte_offset(buffer, cursor);
                buffer.remove(at);
            }
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        let len = self.active_buffer().map_or(0, |b| b.chars().count());
        if self.cursor_position < len {
            self.cursor_position += 1;
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_position = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_position = self.active_buffer().map_or(0, |b| b.chars().count());
    }
}

fn byte_offset(text: &str, char_index: usize) -> usize {
    text.char_indices().nth(char_index).map_or(text.len(), |(i, _)| i)
}
