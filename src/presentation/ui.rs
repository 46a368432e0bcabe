use crate::application::{App, AppMode, FormField, Tab};
use crate::domain::extract_variables;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, Tabs},
    Frame,
};

/// Draws one frame. Takes `&mut App` so scroll positions can be clamped to
/// what the frame actually shows.
pub fn render_ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_tabs(f, app, chunks[0]);
    match app.tab {
        Tab::Formulas => render_formulas(f, app, chunks[1]),
        Tab::Calculate => render_calculate(f, app, chunks[1]),
        Tab::History => render_history(f, app, chunks[1]),
    }
    render_status_bar(f, app, chunks[2]);

    match app.mode {
        AppMode::AddingFormula => render_add_formula_popup(f, app),
        AppMode::Help => render_help_popup(f, app),
        _ => {}
    }
}

fn render_tabs(f: &mut Frame, app: &App, area: Rect) {
    let tabs = Tabs::new(Tab::ALL.iter().map(|tab| tab.title()))
        .select(app.tab.index())
        .block(Block::default().borders(Borders::ALL).title("formulary"))
        .style(Style::default().fg(Color::Cyan))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, area);
}

fn render_formulas(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Formulas ({})", app.formulas.len()));

    if app.formulas.is_empty() {
        let empty = Paragraph::new("No formulas yet. Press 'a' to add one.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .formulas
        .iter()
        .map(|formula| {
            let marker = if app.active_formula == Some(formula.id) { "*" } else { " " };
            ListItem::new(Line::from(vec![
                Span::raw(format!("{} ", marker)),
                Span::styled(formula.name.clone(), Style::default().fg(Color::Yellow)),
                Span::raw(" = "),
                Span::raw(formula.expression.clone()),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(Some(app.selected_formula));
    f.render_stateful_widget(list, area, &mut state);
}

fn render_calculate(f: &mut Frame, app: &App, area: Rect) {
    let Some(formula) = app.active_formula() else {
        let empty = Paragraph::new("No formula selected. Pick one on the Formulas tab and press Enter.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title("Calculate"));
        f.render_widget(empty, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let header = Paragraph::new(formula.expression.clone())
        .block(Block::default().borders(Borders::ALL).title(formula.name.clone()));
    f.render_widget(header, chunks[0]);

    let editing = matches!(app.mode, AppMode::EditingVariable);
    let rows: Vec<Row> = app
        .variable_inputs
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let selected = index == app.selected_variable;
            let (value, style) = if selected && editing {
                (format!("{}_", app.input), Style::default().fg(Color::Green))
            } else if selected {
                (field.value.clone(), Style::default().bg(Color::Blue).fg(Color::White))
            } else {
                (field.value.clone(), Style::default())
            };
            Row::new(vec![
                Cell::from(field.name.clone()).style(Style::default().fg(Color::Yellow)),
                Cell::from(value),
            ])
            .style(style)
        })
        .collect();

    let title = if app.variable_inputs.is_empty() {
        "Variables (none, press c to calculate)"
    } else {
        "Variables"
    };
    let table = Table::new(rows, [Constraint::Length(12), Constraint::Min(10)])
        .header(Row::new(vec!["Name", "Value"]).style(Style::default().add_modifier(Modifier::BOLD)))
        .block(Block::default().borders(Borders::ALL).title(title))
        .column_spacing(1);
    f.render_widget(table, chunks[1]);

    let result = Paragraph::new(app.last_result.clone().unwrap_or_else(|| "-".to_string()))
        .style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL).title("Result"));
    f.render_widget(result, chunks[2]);
}

fn render_history(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("History ({})", app.history.len()));

    if app.history.is_empty() {
        let empty = Paragraph::new("No calculations yet.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    // Keep the newest entries in view
    let visible = area.height.saturating_sub(2) as usize;
    let skip = app.history.len().saturating_sub(visible);
    let items: Vec<ListItem> = app
        .history
        .entries()
        .iter()
        .skip(skip)
        .map(|entry| ListItem::new(entry.to_string()))
        .collect();

    f.render_widget(List::new(items).block(block), area);
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let input_text = match app.mode {
        AppMode::Normal => {
            if let Some(ref status) = app.status_message {
                status.clone()
            } else {
                match app.tab {
                    Tab::Formulas => "Tab: switch | Enter: use | a: add | d: delete | Ctrl+E: export history | F1/?: help | q: quit",
                    Tab::Calculate => "Tab: switch | ↑↓: field | Enter: edit | c: calculate | y: copy result | F1/?: help | q: quit",
                    Tab::History => "Tab: switch | x: clear | Ctrl+E: export history | F1/?: help | q: quit",
                }
                .to_string()
            }
        }
        AppMode::AddingFormula => match app.status_message {
            Some(ref error) => format!("{} (Esc to cancel)", error),
            None => "Tab: switch field | Enter: next/save | Esc: cancel".to_string(),
        },
        AppMode::EditingVariable => {
            let name = app
                .variable_inputs
                .get(app.selected_variable)
                .map_or("", |field| field.name.as_str());
            format!("{} = {} (Enter to save, Esc to cancel)", name, app.input)
        }
        AppMode::Help => "↑↓/jk: scroll | PgUp/PgDn: fast scroll | Home: top | Esc/q: close help".to_string(),
        AppMode::ExportHistory => format!("Export history as: {} (Enter to export, Esc to cancel)", app.filename_input),
    };

    let input = Paragraph::new(input_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(match app.mode {
            AppMode::Normal => Style::default(),
            AppMode::AddingFormula => Style::default().fg(Color::Yellow),
            AppMode::EditingVariable => Style::default().fg(Color::Green),
            AppMode::Help => Style::default().fg(Color::Cyan),
            AppMode::ExportHistory => Style::default().fg(Color::Magenta),
        });
    f.render_widget(input, area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn render_add_formula_popup(f: &mut Frame, app: &App) {
    let popup_area = centered_rect(f.area().width * 3 / 4, 8, f.area());
    f.render_widget(Clear, popup_area);

    let field_line = |label: &str, value: &str, field: FormField| {
        let focused = app.form_field == field;
        let style = if focused {
            Style::default().fg(Color::Green)
        } else {
            Style::default()
        };
        let text = if focused { format!("{}_", value) } else { value.to_string() };
        Line::from(vec![
            Span::styled(format!("{:<12}", label), Style::default().fg(Color::Yellow)),
            Span::styled(text, style),
        ])
    };

    let variables = extract_variables(&app.form_expression);
    let preview = if variables.is_empty() {
        "-".to_string()
    } else {
        variables.join(", ")
    };

    let lines = vec![
        field_line("Name:", &app.form_name, FormField::Name),
        field_line("Expression:", &app.form_expression, FormField::Expression),
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("{:<12}", "Variables:"), Style::default().fg(Color::DarkGray)),
            Span::styled(preview, Style::default().fg(Color::DarkGray)),
        ]),
    ];

    let popup = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Add formula")
            .style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(popup, popup_area);
}

fn render_help_popup(f: &mut Frame, app: &mut App) {
    let area = f.area();
    let popup_area = Rect {
        x: area.width / 10,
        y: area.height / 10,
        width: area.width * 4 / 5,
        height: area.height * 4 / 5,
    };

    f.render_widget(Clear, popup_area);

    let help_lines: Vec<&str> = HELP_TEXT.lines().collect();
    let visible_height = popup_area.height.saturating_sub(2) as usize;

    app.clamp_help_scroll(help_lines.len().saturating_sub(visible_height));
    let start_line = app.help_scroll;
    let end_line = (start_line + visible_height).min(help_lines.len());

    let visible_text = help_lines[start_line..end_line].join("\n");

    let help_widget = Paragraph::new(visible_text)
        .block(Block::default()
            .borders(Borders::ALL)
            .title(format!("formulary Help (Line {}/{})", start_line + 1, help_lines.len()))
            .style(Style::default().fg(Color::Cyan)))
        .style(Style::default().fg(Color::White));

    f.render_widget(help_widget, popup_area);
}

const HELP_TEXT: &str = r#"FORMULARY REFERENCE

=== FORMULAS ===
• A formula is a name plus an arithmetic expression
• Every letter run that is not a function or constant is a variable
• Variables are single letters or words: r, rate, total
• Names are case sensitive: Pi is a variable, pi is the constant

=== OPERATORS ===
+       Addition                    a + b
-       Subtraction / negation      a - b, -a
*       Multiplication              2 * pi * r
/       Division                    d / t
**      Power                       r ** 2
^       Power (same as **)          r ^ 2

Precedence, highest first: unary minus, power, * and /, + and -
Power is right associative: 2 ** 3 ** 2 = 512
Parentheses group: (a + b) * c

=== FUNCTIONS ===
sqrt(x)     Square root
sin(x)      Sine (radians)
cos(x)      Cosine (radians)
tan(x)      Tangent (radians)
exp(x)      e raised to x
log(x)      Natural logarithm

=== CONSTANTS ===
pi          3.141592653589793
e           2.718281828459045

=== RESULTS ===
• Whole numbers are shown without a fraction: 4, not 4.0
• Division by zero gives inf or -inf; 0/0 and sqrt(-1) give NaN
• Very large or very small values use exponent notation: 1e20

=== KEYS ===
Tab / Shift+Tab     Next / previous tab
↑↓ or j/k           Move selection
F1 or ?             This help
q                   Quit
Ctrl+E              Export history to CSV

Formulas tab
  Enter             Use formula on the Calculate tab
  a                 Add formula
  d / Delete        Delete formula

Calculate tab
  Enter             Edit variable (Enter saves, Esc cancels)
  c                 Calculate and add to history
  y                 Copy last result to clipboard

History tab
  x                 Clear history

=== CONFIGURATION ===
formulary.json in the working directory, or the file named by
FORMULARY_CONFIG, sets the starting formulas, the export file name
and the log file. FORMULARY_LOG_FILE overrides the log file and
FORMULARY_LOG sets the log filter (e.g. debug).
"#;
