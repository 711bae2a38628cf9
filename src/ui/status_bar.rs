use ratatui::{prelude::*, widgets::Paragraph};

use crate::app::{App, AppMode, Page};
use crate::autosave::SaveStatus;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let left = if let Some(ref message) = app.status_message {
        message.clone()
    } else {
        match app.page {
            Page::Dashboard => "1-5: pages | ?: help | q: quit".to_string(),
            Page::Customers => {
                "n: new | e: edit | d: delete | m: measure | p: print | Enter: detail".to_string()
            }
            Page::CustomerDetail => "o: new order | m: measure | p: print | Esc: back".to_string(),
            Page::Orders => {
                "Tab: filter | 1-5 or ]/[: status | e: edit | d: delete | Esc: back".to_string()
            }
            Page::Workers => "n: new | e: edit | a: toggle active | d: delete".to_string(),
            Page::Backup => "e: export | i: import | c: csv".to_string(),
        }
    };

    let mut right_parts: Vec<Span> = Vec::new();
    if app.mode == AppMode::MeasurementForm {
        let status = app.autosave_status();
        let color = match status {
            SaveStatus::Saving => Color::Yellow,
            SaveStatus::Saved => Color::Green,
            SaveStatus::Error => Color::Red,
            SaveStatus::Idle => Color::DarkGray,
        };
        if !status.indicator().is_empty() {
            right_parts.push(Span::styled(
                format!("{} ", status.indicator()),
                Style::default().fg(color),
            ));
        }
    }
    right_parts.push(Span::styled(
        page_name(app.page),
        Style::default().fg(Color::Cyan),
    ));

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(24)])
        .split(area);

    frame.render_widget(
        Paragraph::new(left).style(Style::default().fg(Color::White).bg(Color::Black)),
        chunks[0],
    );
    frame.render_widget(
        Paragraph::new(Line::from(right_parts)).alignment(Alignment::Right),
        chunks[1],
    );
}

fn page_name(page: Page) -> &'static str {
    match page {
        Page::Dashboard => "Dashboard",
        Page::Customers => "Customers",
        Page::CustomerDetail => "Customer",
        Page::Orders => "Orders",
        Page::Workers => "Workers",
        Page::Backup => "Backup",
    }
}
