use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::app::App;
use crate::format::format_indian_number;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(6)])
        .split(area);

    let summary = Paragraph::new(vec![
        Line::from(format!(
            "Customers: {}   Orders: {}",
            format_indian_number(app.stats.customers),
            format_indian_number(app.stats.total_orders)
        )),
        Line::styled(
            "A backup contains every customer, order and measurement.",
            Style::default().fg(Color::DarkGray),
        ),
    ])
    .block(Block::default().borders(Borders::ALL).title(" Data "));
    frame.render_widget(summary, chunks[0]);

    let actions = Paragraph::new(vec![
        Line::from(vec![
            Span::styled("e", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw("  Export backup (JSON)"),
        ]),
        Line::from(vec![
            Span::styled("i", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw("  Import backup (overwrites matching records)"),
        ]),
        Line::from(vec![
            Span::styled("c", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw("  Export customer list (CSV for Excel)"),
        ]),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Backup & Restore "),
    );
    frame.render_widget(actions, chunks[1]);
}
