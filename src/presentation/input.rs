use crate::application::{App, AppMode, FormField, Tab};
use crate::infrastructure::{ClipboardService, HistoryExporter};
use crossterm::event::{KeyCode, KeyModifiers};

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        match app.mode {
            AppMode::Normal => Self::handle_normal_mode(app, key, modifiers),
            AppMode::AddingFormula => Self::handle_form_mode(app, key),
            AppMode::EditingVariable => Self::handle_editing_mode(app, key),
            AppMode::Help => Self::handle_help_mode(app, key),
            AppMode::ExportHistory => Self::handle_filename_input_mode(app, key),
        }
    }

    fn handle_normal_mode(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) {
            if key == KeyCode::Char('e') {
                app.start_history_export();
            }
            return;
        }

        app.status_message = None;

        match key {
            KeyCode::Tab => app.next_tab(),
            KeyCode::BackTab => app.previous_tab(),
            KeyCode::F(1) | KeyCode::Char('?') => {
                app.mode = AppMode::Help;
                app.help_scroll = 0;
            }
            _ => match app.tab {
                Tab::Formulas => Self::handle_formulas_tab(app, key),
                Tab::Calculate => Self::handle_calculate_tab(app, key),
                Tab::History => Self::handle_history_tab(app, key),
            },
        }
    }

    fn handle_formulas_tab(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Up | KeyCode::Char('k') => app.select_previous_formula(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next_formula(),
            KeyCode::Enter => {
                app.activate_selected_formula();
            }
            KeyCode::Char('a') => app.start_add_formula(),
            KeyCode::Char('d') | KeyCode::Delete => {
                app.delete_selected_formula();
            }
            _ => {}
        }
    }

    fn handle_calculate_tab(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Up | KeyCode::Char('k') => app.select_previous_variable(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next_variable(),
            // A formula without variables has nothing to edit
            KeyCode::Enter if app.variable_inputs.is_empty() => Self::calculate(app),
            KeyCode::Enter => app.start_editing_variable(),
            KeyCode::Char('c') => Self::calculate(app),
            KeyCode::Char('y') => {
                if let Some(result) = app.last_result.clone() {
                    let outcome = ClipboardService::copy(&result);
                    app.set_clipboard_result(outcome);
                }
            }
            _ => {}
        }
    }

    /// The outcome is reported through the status bar.
    fn calculate(app: &mut App) {
        app.calculate().ok();
    }

    fn handle_history_tab(app: &mut App, key: KeyCode) {
        if key == KeyCode::Char('x') {
            app.clear_history();
        }
    }

    fn handle_form_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter => match app.form_field {
                FormField::Name => app.toggle_form_field(),
                FormField::Expression => app.finish_add_formula(),
            },
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => app.toggle_form_field(),
            KeyCode::Esc => app.cancel_add_formula(),
            _ => Self::handle_text_editing(app, key),
        }
    }

    fn handle_editing_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter => app.finish_editing_variable(),
            KeyCode::Esc => app.cancel_editing(),
            _ => Self::handle_text_editing(app, key),
        }
    }

    fn handle_help_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q') => {
                app.mode = AppMode::Normal;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                app.help_scroll = app.help_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.help_scroll += 1;
            }
            KeyCode::PageUp => {
                app.help_scroll = app.help_scroll.saturating_sub(5);
            }
            KeyCode::PageDown => {
                app.help_scroll += 5;
            }
            KeyCode::Home => {
                app.help_scroll = 0;
            }
            _ => {}
        }
    }

    fn handle_filename_input_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter => {
                let filename = app.get_export_filename();
                let result = HistoryExporter::export_to_csv(&app.history, &filename);
                app.set_export_result(result);
            }
            KeyCode::Esc => app.cancel_filename_input(),
            _ => Self::handle_text_editing(app, key),
        }
    }

    fn handle_text_editing(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Backspace => app.delete_char_before_cursor(),
            KeyCode::Delete => app.delete_char_at_cursor(),
            KeyCode::Left => app.move_cursor_left(),
            KeyCode::Right => app.move_cursor_right(),
            KeyCode::Home => app.move_cursor_home(),
            KeyCode::End => app.move_cursor_end(),
            KeyCode::Char(c) => app.insert_char(c),
            _ => {}
        }
    }
}
