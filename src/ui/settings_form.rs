use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::db::Settings;
use crate::ui::input::TextInput;

const FIELD_COUNT: usize = 5;

/// State for the shop settings dialog
pub struct SettingsForm {
    pub shop_name: TextInput,
    pub address: TextInput,
    pub phone1: TextInput,
    pub phone2: TextInput,
    pub printer: TextInput,
    pub focus: usize,
    pub error: Option<String>,
}

impl SettingsForm {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            shop_name: TextInput::with_value(&settings.shop_name),
            address: TextInput::with_value(&settings.address),
            phone1: TextInput::with_value(&settings.phone1),
            phone2: TextInput::with_value(&settings.phone2),
            printer: TextInput::with_value(settings.default_printer.as_deref().unwrap_or("")),
            focus: 0,
            error: None,
        }
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % FIELD_COUNT;
    }

    pub fn prev_field(&mut self) {
        self.focus = (self.focus + FIELD_COUNT - 1) % FIELD_COUNT;
    }

    pub fn focused_input_mut(&mut self) -> &mut TextInput {
        match self.focus {
            0 => &mut self.shop_name,
            1 => &mut self.address,
            2 => &mut self.phone1,
            3 => &mut self.phone2,
            _ => &mut self.printer,
        }
    }

    pub fn validate(&mut self) -> bool {
        if self.shop_name.value.trim().is_empty() {
            self.error = Some("Shop name is required".to_string());
            return false;
        }
        self.error = None;
        true
    }

    pub fn to_settings(&self) -> Settings {
        let printer = self.printer.value.trim();
        Settings {
            shop_name: self.shop_name.value.trim().to_string(),
            address: self.address.value.trim().to_string(),
            phone1: self.phone1.value.trim().to_string(),
            phone2: self.phone2.value.trim().to_string(),
            default_printer: if printer.is_empty() {
                None
            } else {
                Some(printer.to_string())
            },
        }
    }
}

pub fn render(frame: &mut Frame, dialog: &SettingsForm, area: Rect) {
    let dialog_width = 60.min(area.width.saturating_sub(4));
    let dialog_height = 20.min(area.height.saturating_sub(2));
    let x = (area.width - dialog_width) / 2;
    let y = (area.height - dialog_height) / 2;
    let dialog_area = Rect::new(x, y, dialog_width, dialog_height);

    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Shop Settings ")
        .title_style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(block, dialog_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1), // Error
            Constraint::Length(1), // Footer
        ])
        .split(dialog_area);

    let fields = [
        (" Shop Name ", &dialog.shop_name, 0),
        (" Address ", &dialog.address, 1),
        (" Phone 1 ", &dialog.phone1, 2),
        (" Phone 2 ", &dialog.phone2, 3),
        (" Default Printer (blank = preview) ", &dialog.printer, 4),
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
        frame.render_widget(
            Paragraph::new(error.as_str()).style(Style::default().fg(Color::Red)),
            chunks[5],
        );
    }
    let footer = Paragraph::new("Enter: save | Tab: next field | Esc: cancel")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[6]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_with_blank_printer() {
        let settings = Settings {
            shop_name: "Al-Noor Tailors".to_string(),
            address: "Main Bazaar".to_string(),
            phone1: "0313-9003733".to_string(),
            phone2: String::new(),
            default_printer: None,
        };
        let form = SettingsForm::from_settings(&settings);
        assert_eq!(form.to_settings(), settings);
    }

    #[test]
    fn test_shop_name_required() {
        let mut form = SettingsForm::from_settings(&Settings::default());
        form.shop_name = TextInput::with_value("  ");
        assert!(!form.validate());
    }
}
