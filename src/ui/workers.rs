use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::app::App;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    if app.workers.is_empty() {
        let empty = Paragraph::new("No workers yet (press n)")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(" Workers "));
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .workers
        .iter()
        .enumerate()
        .map(|(i, worker)| {
            let selected = i == app.worker_index;
            let mut style = if selected {
                Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            if !worker.is_active {
                style = style.fg(Color::DarkGray);
            }
            let marker = if worker.is_active { " " } else { "inactive" };
            ListItem::new(Line::styled(
                format!(
                    "{:24} {:10} {:16} {}",
                    worker.name,
                    worker.role.display_name(),
                    worker.phone.as_deref().unwrap_or(""),
                    marker
                ),
                style,
            ))
        })
        .collect();

    let title = format!(" Workers ({}) ", app.workers.len());
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, area);
}
