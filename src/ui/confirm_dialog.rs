use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

/// What to do once the user confirms.
pub enum ConfirmAction {
    DeleteCustomer(i64),
    DeleteOrder(i64),
    DeleteWorker(i64),
    /// JSON text of a backup file picked for restore
    ImportBackup(String),
}

/// State for the confirmation dialog
pub struct ConfirmDialog {
    pub title: String,
    pub message: String,
    pub action: ConfirmAction,
}

impl ConfirmDialog {
    pub fn new(title: &str, message: &str, action: ConfirmAction) -> Self {
        Self {
            title: title.to_string(),
            message: message.to_string(),
            action,
        }
    }
}

pub fn render(frame: &mut Frame, dialog: &ConfirmDialog, area: Rect) {
    let dialog_width = 56.min(area.width.saturating_sub(4));
    let dialog_height = 8.min(area.height.saturating_sub(4));
    let x = (area.width - dialog_width) / 2;
    let y = (area.height - dialog_height) / 2;
    let dialog_area = Rect::new(x, y, dialog_width, dialog_height);

    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(format!(" {} ", dialog.title))
        .title_style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(block, dialog_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(2), Constraint::Length(1)])
        .split(dialog_area);

    let message = Paragraph::new(dialog.message.as_str()).wrap(Wrap { trim: true });
    frame.render_widget(message, chunks[0]);

    let footer = Paragraph::new("Enter: confirm | Esc: cancel")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[1]);
}
