use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::app::App;
use crate::db::OrderStatus;
use crate::format::{format_date, format_indian_number};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(4), // Totals
            Constraint::Length(7), // Orders by status
            Constraint::Min(4),    // Due today
        ])
        .split(area);

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            app.settings.shop_name.as_str(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            app.settings.phones_line(),
            Style::default().fg(Color::DarkGray),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" darzi {} ", app.shell.app_version()))
            .title_alignment(Alignment::Right)
            .title_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(header, chunks[0]);

    let totals = Paragraph::new(vec![
        Line::from(format!(
            "Customers: {}",
            format_indian_number(app.stats.customers)
        )),
        Line::from(format!(
            "Orders:    {}",
            format_indian_number(app.stats.total_orders)
        )),
    ])
    .block(Block::default().borders(Borders::ALL).title(" Totals "));
    frame.render_widget(totals, chunks[1]);

    let status_lines: Vec<Line> = OrderStatus::ALL
        .iter()
        .map(|status| {
            let count = app
                .stats
                .by_status
                .iter()
                .find(|(s, _)| s == status)
                .map(|(_, n)| *n)
                .unwrap_or(0);
            let color = if status.is_open() && count > 0 {
                Color::Yellow
            } else {
                Color::White
            };
            Line::from(vec![
                Span::raw(format!("{:12}", status.display_name())),
                Span::styled(format_indian_number(count), Style::default().fg(color)),
            ])
        })
        .collect();
    let by_status = Paragraph::new(status_lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Orders by Status "),
    );
    frame.render_widget(by_status, chunks[2]);

    let due_items: Vec<ListItem> = if app.stats.due_today.is_empty() {
        vec![ListItem::new("Nothing due today")]
    } else {
        app.stats
            .due_today
            .iter()
            .map(|(order, customer_name)| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{:24}", customer_name),
                        Style::default().fg(Color::Yellow),
                    ),
                    Span::raw(format!(
                        "{:12} due {}",
                        order.status.display_name(),
                        format_date(&order.due_date)
                    )),
                ]))
            })
            .collect()
    };
    let due_list = List::new(due_items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Due Today ")
            .border_style(Style::default().fg(Color::Red)),
    );
    frame.render_widget(due_list, chunks[3]);
}
