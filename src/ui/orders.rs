use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph, Tabs},
};

use crate::app::App;
use crate::db::OrderStatus;
use crate::format::format_date;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    // Status filter tabs: All first, then each status
    let titles: Vec<String> = std::iter::once("All".to_string())
        .chain(OrderStatus::ALL.iter().map(|s| s.display_name().to_string()))
        .collect();
    let selected = match app.order_filter {
        None => 0,
        Some(status) => {
            OrderStatus::ALL
                .iter()
                .position(|s| *s == status)
                .unwrap_or(0)
                + 1
        }
    };
    let tabs = Tabs::new(titles)
        .select(selected)
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Filter (Tab to cycle) "),
        );
    frame.render_widget(tabs, chunks[0]);

    if app.orders.is_empty() {
        let empty = Paragraph::new("No orders")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(" Orders "));
        frame.render_widget(empty, chunks[1]);
        return;
    }

    let items: Vec<ListItem> = app
        .orders
        .iter()
        .enumerate()
        .map(|(i, order)| {
            let selected = i == app.order_index;
            let base = if selected {
                Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let status_color = match order.status {
                OrderStatus::New => Color::White,
                OrderStatus::InProgress => Color::Yellow,
                OrderStatus::Ready => Color::Green,
                OrderStatus::Delivered | OrderStatus::Completed => Color::DarkGray,
            };
            let name = app
                .order_customer_names
                .get(&order.customer_id)
                .map(String::as_str)
                .unwrap_or("?");
            ListItem::new(Line::from(vec![
                Span::styled(format!("#{:<5}", order.id.unwrap_or(0)), base),
                Span::styled(format!("{:24}", name), base),
                Span::styled(
                    format!("{:12}", order.status.display_name()),
                    base.fg(status_color),
                ),
                Span::styled(format!("due {}  ", format_date(&order.due_date)), base),
                Span::styled(
                    order.advance_payment.as_deref().unwrap_or("").to_string(),
                    base.fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let title = format!(" Orders ({}) ", app.orders.len());
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, chunks[1]);
}
