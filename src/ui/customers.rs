use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::app::{App, AppMode};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    // Search bar
    let searching = app.mode == AppMode::Searching;
    let search_text = if searching {
        Line::from(vec![
            Span::raw(app.search_query.as_str()),
            Span::styled(
                "|",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ])
    } else if app.search_query.is_empty() {
        Line::styled("press / to search", Style::default().fg(Color::DarkGray))
    } else {
        Line::raw(app.search_query.as_str())
    };
    let search = Paragraph::new(search_text).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Search (name or phone) ")
            .border_style(Style::default().fg(if searching {
                Color::Yellow
            } else {
                Color::DarkGray
            })),
    );
    frame.render_widget(search, chunks[0]);

    let items: Vec<ListItem> = app
        .customers
        .iter()
        .enumerate()
        .map(|(i, customer)| {
            let selected = i == app.customer_index;
            let style = if selected {
                Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Line::styled(
                format!(
                    "{:28} {:16} {}",
                    customer.name,
                    customer.phone,
                    customer.address.as_deref().unwrap_or("")
                ),
                style,
            ))
        })
        .collect();

    let title = format!(" Customers ({}) ", app.customers.len());
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, chunks[1]);
}
