use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::app::App;
use crate::format::format_date;
use crate::templates::{EXTRA_FIELDS, MEASUREMENT_FIELDS, SELECT_FIELDS};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref customer) = app.detail_customer else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Info
            Constraint::Length(3), // Measurement summary
            Constraint::Min(3),    // Orders
        ])
        .split(area);

    let info = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(
                customer.name.as_str(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::raw(customer.phone.as_str()),
        ]),
        Line::raw(customer.address.as_deref().unwrap_or("")),
        Line::styled(
            format!("Customer since {}", format_date(&customer.created_at)),
            Style::default().fg(Color::DarkGray),
        ),
    ])
    .block(Block::default().borders(Borders::ALL).title(" Customer "));
    frame.render_widget(info, chunks[0]);

    let measurement_line = match app.detail_measurement {
        Some(ref m) => {
            let total = MEASUREMENT_FIELDS.len() + EXTRA_FIELDS.len() + SELECT_FIELDS.len();
            let farmaish = m.design_options.values().filter(|v| **v).count();
            Line::from(format!(
                "{} of {} fields recorded, {} farmaish | updated {}",
                m.fields.len(),
                total,
                farmaish,
                format_date(&m.updated_at)
            ))
        }
        None => Line::styled(
            "No measurements recorded (press m)",
            Style::default().fg(Color::DarkGray),
        ),
    };
    let measurement = Paragraph::new(measurement_line).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Measurements "),
    );
    frame.render_widget(measurement, chunks[1]);

    let items: Vec<ListItem> = if app.detail_orders.is_empty() {
        vec![ListItem::new("No orders yet (press o)")]
    } else {
        app.detail_orders
            .iter()
            .enumerate()
            .map(|(i, order)| {
                let selected = i == app.detail_order_index;
                let style = if selected {
                    Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                ListItem::new(Line::styled(
                    format!(
                        "#{:<5} {:12} due {}  {}",
                        order.id.unwrap_or(0),
                        order.status.display_name(),
                        format_date(&order.due_date),
                        order.delivery_notes.as_deref().unwrap_or("")
                    ),
                    style,
                ))
            })
            .collect()
    };
    let title = format!(" Orders ({}) ", app.detail_orders.len());
    let orders = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(orders, chunks[2]);
}
