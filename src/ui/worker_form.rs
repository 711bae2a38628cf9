use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::db::{Worker, WorkerRole};
use crate::ui::input::TextInput;

const FIELD_COUNT: usize = 3;

/// State for the add/edit worker dialog
pub struct WorkerForm {
    pub editing: Option<i64>,
    pub name: TextInput,
    pub phone: TextInput,
    pub role_index: usize,
    pub focus: usize,
    pub error: Option<String>,
}

impl WorkerForm {
    pub fn new() -> Self {
        Self {
            editing: None,
            name: TextInput::default(),
            phone: TextInput::default(),
            role_index: 0,
            focus: 0,
            error: None,
        }
    }

    pub fn edit(worker: &Worker) -> Self {
        Self {
            editing: worker.id,
            name: TextInput::with_value(&worker.name),
            phone: TextInput::with_value(worker.phone.as_deref().unwrap_or("")),
            role_index: WorkerRole::ALL
                .iter()
                .position(|r| *r == worker.role)
                .unwrap_or(0),
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

    pub fn focused_input_mut(&mut self) -> Option<&mut TextInput> {
        match self.focus {
            0 => Some(&mut self.name),
            1 => Some(&mut self.phone),
            _ => None,
        }
    }

    pub fn cycle_role(&mut self, delta: i32) {
        let len = WorkerRole::ALL.len() as i32;
        self.role_index = (self.role_index as i32 + delta).rem_euclid(len) as usize;
    }

    pub fn role(&self) -> WorkerRole {
        WorkerRole::ALL[self.role_index]
    }

    pub fn validate(&mut self) -> bool {
        if self.name.value.trim().is_empty() {
            self.error = Some("Name is required".to_string());
            return false;
        }
        self.error = None;
        true
    }

    pub fn phone_value(&self) -> Option<&str> {
        let trimmed = self.phone.value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }
}

pub fn render(frame: &mut Frame, dialog: &WorkerForm, area: Rect) {
    let dialog_width = 50.min(area.width.saturating_sub(4));
    let dialog_height = 12.min(area.height.saturating_sub(4));
    let x = (area.width - dialog_width) / 2;
    let y = (area.height - dialog_height) / 2;
    let dialog_area = Rect::new(x, y, dialog_width, dialog_height);

    frame.render_widget(Clear, dialog_area);

    let title = if dialog.editing.is_some() {
        " Edit Worker "
    } else {
        " New Worker "
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
            Constraint::Length(1), // Role
            Constraint::Length(1), // Error
            Constraint::Length(1), // Footer
        ])
        .split(dialog_area);

    let inputs = [(" Name ", &dialog.name, 0), (" Phone ", &dialog.phone, 1)];
    for (title, input, index) in inputs {
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

    let role_style = if dialog.focus == 2 {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let role_line = Line::from(vec![
        Span::styled("Role      ", role_style),
        Span::raw(format!("< {} >", dialog.role().display_name())),
    ]);
    frame.render_widget(Paragraph::new(role_line), chunks[2]);

    if let Some(ref error) = dialog.error {
        frame.render_widget(
            Paragraph::new(error.as_str()).style(Style::default().fg(Color::Red)),
            chunks[3],
        );
    }
    let footer = Paragraph::new("Enter: save | Tab: next | Left/Right: role | Esc: cancel")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[4]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_cycle_wraps() {
        let mut form = WorkerForm::new();
        form.cycle_role(-1);
        assert_eq!(form.role(), WorkerRole::Karigar);
        form.cycle_role(1);
        assert_eq!(form.role(), WorkerRole::Cutter);
    }

    #[test]
    fn test_name_required() {
        let mut form = WorkerForm::new();
        assert!(!form.validate());
        form.name = TextInput::with_value("Rashid");
        assert!(form.validate());
    }
}
