use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::db::Customer;
use crate::ui::input::TextInput;
use crate::validate::validate_customer;

const FIELD_COUNT: usize = 3;

/// State for the add/edit customer dialog
pub struct CustomerForm {
    /// `Some(id)` when editing an existing customer
    pub editing: Option<i64>,
    pub name: TextInput,
    pub phone: TextInput,
    pub address: TextInput,
    pub focus: usize,
    pub error: Option<String>,
}

impl CustomerForm {
    pub fn new() -> Self {
        Self {
            editing: None,
            name: TextInput::default(),
            phone: TextInput::default(),
            address: TextInput::default(),
            focus: 0,
            error: None,
        }
    }

    pub fn edit(customer: &Customer) -> Self {
        Self {
            editing: customer.id,
            name: TextInput::with_value(&customer.name),
            phone: TextInput::with_value(&customer.phone),
            address: TextInput::with_value(customer.address.as_deref().unwrap_or("")),
            focus: 0,
            error: None,
        }
    }

    pub fn focused_input_mut(&mut self) -> &mut TextInput {
        match self.focus {
            0 => &mut self.name,
            1 => &mut self.phone,
            _ => &mut self.address,
        }
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % FIELD_COUNT;
    }

    pub fn prev_field(&mut self) {
        self.focus = (self.focus + FIELD_COUNT - 1) % FIELD_COUNT;
    }

    /// Validate the form; on success the error is cleared and the caller
    /// may persist.
    pub fn validate(&mut self) -> bool {
        let errors = validate_customer(&self.name.value, &self.phone.value);
        match errors.first() {
            Some(e) => {
                self.error = Some(e.to_string());
                false
            }
            None => {
                self.error = None;
                true
            }
        }
    }

    pub fn address_value(&self) -> Option<&str> {
        let trimmed = self.address.value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }
}

pub fn render(frame: &mut Frame, dialog: &CustomerForm, area: Rect) {
    let dialog_width = 60.min(area.width.saturating_sub(4));
    let dialog_height = 14.min(area.height.saturating_sub(4));
    let x = (area.width - dialog_width) / 2;
    let y = (area.height - dialog_height) / 2;
    let dialog_area = Rect::new(x, y, dialog_width, dialog_height);

    frame.render_widget(Clear, dialog_area);

    let title = if dialog.editing.is_some() {
        " Edit Customer "
    } else {
        " New Customer "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title)
        .title_style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(block, dialog_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Name
            Constraint::Length(3), // Phone
            Constraint::Length(3), // Address
            Constraint::Length(1), // Error
            Constraint::Length(1), // Footer
        ])
        .split(dialog_area);

    let fields = [
        (" Name ", &dialog.name, 0),
        (" Phone ", &dialog.phone, 1),
        (" Address ", &dialog.address, 2),
    ];
    for (title, input, index) in fields {
        let focused = dialog.focus == index;
        let border = if focused { Color::Yellow } else { Color::DarkGray };
        let widget = Paragraph::new(input.spans(focused)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(border)),
        );
        frame.render_widget(widget, chunks[index]);
    }

    if let Some(ref error) = dialog.error {
        let msg = Paragraph::new(error.as_str()).style(Style::default().fg(Color::Red));
        frame.render_widget(msg, chunks[3]);
    }

    let footer = Paragraph::new("Enter: save | Tab: next field | Esc: cancel")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[4]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_reports_first_error() {
        let mut form = CustomerForm::new();
        assert!(!form.validate());
        assert!(form.error.is_some());

        form.name = TextInput::with_value("Bilal");
        form.phone = TextInput::with_value("12345");
        assert!(!form.validate());

        form.phone = TextInput::with_value("0313-9001122");
        assert!(form.validate());
        assert!(form.error.is_none());
    }

    #[test]
    fn test_blank_address_becomes_none() {
        let mut form = CustomerForm::new();
        form.address = TextInput::with_value("   ");
        assert_eq!(form.address_value(), None);
        form.address = TextInput::with_value(" Main Bazaar ");
        assert_eq!(form.address_value(), Some("Main Bazaar"));
    }
}
