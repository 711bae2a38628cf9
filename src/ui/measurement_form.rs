use std::collections::BTreeMap;

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};

use crate::db::CustomerMeasurement;
use crate::templates::{Choice, DESIGN_OPTIONS, EXTRA_FIELDS, MEASUREMENT_FIELDS, SELECT_FIELDS};
use crate::ui::input::TextInput;

pub enum RowKind {
    Text(TextInput),
    Select {
        choices: &'static [Choice],
        selected: Option<usize>,
    },
    Toggle(bool),
}

pub struct FormRow {
    pub key: &'static str,
    pub label: String,
    pub kind: RowKind,
}

/// State for the measurement form. Every edit is reported to the caller
/// so it can feed the autosave controller.
pub struct MeasurementForm {
    pub customer_id: i64,
    pub customer_name: String,
    pub rows: Vec<FormRow>,
    pub focus: usize,
    pub scroll: usize,
}

impl MeasurementForm {
    pub fn new(customer_id: i64, customer_name: &str, existing: &CustomerMeasurement) -> Self {
        let mut rows = Vec::new();

        for field in MEASUREMENT_FIELDS.iter().chain(EXTRA_FIELDS) {
            rows.push(FormRow {
                key: field.key,
                label: format!("{} ({})", field.label_en, field.label_ur),
                kind: RowKind::Text(TextInput::with_value(existing.field(field.key))),
            });
        }
        for select in SELECT_FIELDS {
            let value = existing.field(select.key);
            let selected = select.choices.iter().position(|c| c.value == value);
            rows.push(FormRow {
                key: select.key,
                label: format!("{} ({})", select.label_en, select.label_ur),
                kind: RowKind::Select {
                    choices: select.choices,
                    selected,
                },
            });
        }
        for option in DESIGN_OPTIONS {
            rows.push(FormRow {
                key: option.key,
                label: format!("{} ({})", option.label_en, option.label_ur),
                kind: RowKind::Toggle(existing.option(option.key)),
            });
        }

        Self {
            customer_id,
            customer_name: customer_name.to_string(),
            rows,
            focus: 0,
            scroll: 0,
        }
    }

    pub fn next_row(&mut self) {
        if self.focus + 1 < self.rows.len() {
            self.focus += 1;
        }
    }

    pub fn prev_row(&mut self) {
        self.focus = self.focus.saturating_sub(1);
    }

    /// Type into the focused row. Returns true if the form changed.
    pub fn handle_char(&mut self, c: char) -> bool {
        match &mut self.rows[self.focus].kind {
            RowKind::Text(input) => {
                input.handle_char(c);
                true
            }
            RowKind::Select { choices, selected } if c == ' ' => {
                *selected = Some(match selected {
                    Some(i) => (*i + 1) % choices.len(),
                    None => 0,
                });
                true
            }
            RowKind::Toggle(value) if c == ' ' => {
                *value = !*value;
                true
            }
            _ => false,
        }
    }

    pub fn backspace(&mut self) -> bool {
        match &mut self.rows[self.focus].kind {
            RowKind::Text(input) => {
                input.backspace();
                true
            }
            // Backspace clears a dropdown back to unset
            RowKind::Select { selected, .. } => {
                let had = selected.is_some();
                *selected = None;
                had
            }
            RowKind::Toggle(_) => false,
        }
    }

    /// Left/right cycles a dropdown, moves the cursor in a text field.
    pub fn handle_left(&mut self) -> bool {
        match &mut self.rows[self.focus].kind {
            RowKind::Text(input) => {
                input.move_cursor_left();
                false
            }
            RowKind::Select { choices, selected } => {
                *selected = Some(match selected {
                    Some(0) | None => choices.len() - 1,
                    Some(i) => *i - 1,
                });
                true
            }
            RowKind::Toggle(_) => false,
        }
    }

    pub fn handle_right(&mut self) -> bool {
        match &mut self.rows[self.focus].kind {
            RowKind::Text(input) => {
                input.move_cursor_right();
                false
            }
            RowKind::Select { choices, selected } => {
                *selected = Some(match selected {
                    Some(i) => (*i + 1) % choices.len(),
                    None => 0,
                });
                true
            }
            RowKind::Toggle(_) => false,
        }
    }

    /// Current form contents as the maps stored in the database.
    pub fn snapshot(&self) -> (BTreeMap<String, String>, BTreeMap<String, bool>) {
        let mut fields = BTreeMap::new();
        let mut options = BTreeMap::new();
        for row in &self.rows {
            match &row.kind {
                RowKind::Text(input) => {
                    let value = input.value.trim();
                    if !value.is_empty() {
                        fields.insert(row.key.to_string(), value.to_string());
                    }
                }
                RowKind::Select { choices, selected } => {
                    if let Some(i) = selected {
                        fields.insert(row.key.to_string(), choices[*i].value.to_string());
                    }
                }
                RowKind::Toggle(value) => {
                    options.insert(row.key.to_string(), *value);
                }
            }
        }
        (fields, options)
    }
}

pub fn render(frame: &mut Frame, dialog: &mut MeasurementForm, area: Rect, save_status: &str) {
    let dialog_width = 70.min(area.width.saturating_sub(2));
    let dialog_height = area.height.saturating_sub(2);
    let x = (area.width - dialog_width) / 2;
    let dialog_area = Rect::new(x, 1, dialog_width, dialog_height);

    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" Measurements: {} ", dialog.customer_name))
        .title_style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(block, dialog_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Min(5),    // Rows
            Constraint::Length(1), // Save status
            Constraint::Length(1), // Footer
        ])
        .split(dialog_area);

    let visible = chunks[0].height as usize;
    if dialog.focus < dialog.scroll {
        dialog.scroll = dialog.focus;
    } else if dialog.focus >= dialog.scroll + visible {
        dialog.scroll = dialog.focus + 1 - visible;
    }

    let items: Vec<ListItem> = dialog
        .rows
        .iter()
        .enumerate()
        .skip(dialog.scroll)
        .take(visible)
        .map(|(i, row)| {
            let focused = i == dialog.focus;
            let label_style = if focused {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let mut spans = vec![Span::styled(format!("{:32}", row.label), label_style)];
            match &row.kind {
                RowKind::Text(input) => spans.extend(input.spans(focused).spans),
                RowKind::Select { choices, selected } => {
                    let text = match selected {
                        Some(i) => format!("{} ({})", choices[*i].label_en, choices[*i].label_ur),
                        None => "-".to_string(),
                    };
                    spans.push(Span::styled(
                        text,
                        Style::default().fg(if selected.is_some() {
                            Color::Green
                        } else {
                            Color::DarkGray
                        }),
                    ));
                }
                RowKind::Toggle(value) => {
                    spans.push(Span::raw(if *value { "[x]" } else { "[ ]" }));
                }
            }
            ListItem::new(Line::from(spans))
        })
        .collect();
    frame.render_widget(List::new(items), chunks[0]);

    let status = Paragraph::new(save_status).style(Style::default().fg(Color::Green));
    frame.render_widget(status, chunks[1]);

    let footer = Paragraph::new(
        "Up/Down: field | Space: toggle/cycle | Left/Right: choice | Esc: save and close",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[2]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> MeasurementForm {
        MeasurementForm::new(1, "Bilal", &CustomerMeasurement::empty(1))
    }

    fn focus_on(form: &mut MeasurementForm, key: &str) {
        form.focus = form.rows.iter().position(|r| r.key == key).unwrap();
    }

    #[test]
    fn test_snapshot_skips_blank_fields() {
        let mut f = form();
        focus_on(&mut f, "length");
        for c in "42.5".chars() {
            f.handle_char(c);
        }
        let (fields, options) = f.snapshot();
        assert_eq!(fields.get("length").map(String::as_str), Some("42.5"));
        assert!(!fields.contains_key("chest"));
        // toggles are always present
        assert_eq!(options.get("zip_shalwar"), Some(&false));
    }

    #[test]
    fn test_select_cycles_and_clears() {
        let mut f = form();
        focus_on(&mut f, "cuff");
        assert!(f.handle_char(' '));
        let (fields, _) = f.snapshot();
        assert_eq!(fields.get("cuff").map(String::as_str), Some("single"));

        assert!(f.handle_right());
        let (fields, _) = f.snapshot();
        assert_eq!(fields.get("cuff").map(String::as_str), Some("double"));

        assert!(f.backspace());
        let (fields, _) = f.snapshot();
        assert!(!fields.contains_key("cuff"));
    }

    #[test]
    fn test_toggle_flips() {
        let mut f = form();
        focus_on(&mut f, "double_silai");
        assert!(f.handle_char(' '));
        let (_, options) = f.snapshot();
        assert_eq!(options.get("double_silai"), Some(&true));
    }

    #[test]
    fn test_seeded_from_existing_record() {
        let mut existing = CustomerMeasurement::empty(1);
        existing.fields.insert("length".to_string(), "40".to_string());
        existing.fields.insert("cuff".to_string(), "round".to_string());
        existing.design_options.insert("mobile_pocket".to_string(), true);

        let f = MeasurementForm::new(1, "Bilal", &existing);
        let (fields, options) = f.snapshot();
        assert_eq!(fields.get("length").map(String::as_str), Some("40"));
        assert_eq!(fields.get("cuff").map(String::as_str), Some("round"));
        assert_eq!(options.get("mobile_pocket"), Some(&true));
    }
}
