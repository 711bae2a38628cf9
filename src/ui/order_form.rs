use chrono::NaiveDate;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::db::{Order, OrderStatus, Worker};
use crate::format::today_ymd;
use crate::ui::input::TextInput;

const FIELD_COUNT: usize = 7;

/// State for the add/edit order dialog
pub struct OrderForm {
    pub editing: Option<i64>,
    pub customer_id: i64,
    pub customer_name: String,
    pub due_date: TextInput,
    pub advance: TextInput,
    pub notes: TextInput,
    pub status_index: usize,
    pub cutters: Vec<Worker>,
    pub checkers: Vec<Worker>,
    pub karigars: Vec<Worker>,
    pub cutter_index: Option<usize>,
    pub checker_index: Option<usize>,
    pub karigar_index: Option<usize>,
    pub focus: usize,
    pub error: Option<String>,
}

impl OrderForm {
    pub fn new(
        customer_id: i64,
        customer_name: &str,
        cutters: Vec<Worker>,
        checkers: Vec<Worker>,
        karigars: Vec<Worker>,
    ) -> Self {
        Self {
            editing: None,
            customer_id,
            customer_name: customer_name.to_string(),
            due_date: TextInput::with_value(&today_ymd()),
            advance: TextInput::default(),
            notes: TextInput::default(),
            status_index: 0,
            cutters,
            checkers,
            karigars,
            cutter_index: None,
            checker_index: None,
            karigar_index: None,
            focus: 0,
            error: None,
        }
    }

    pub fn edit(
        order: &Order,
        customer_name: &str,
        cutters: Vec<Worker>,
        checkers: Vec<Worker>,
        karigars: Vec<Worker>,
    ) -> Self {
        let position = |workers: &[Worker], id: Option<i64>| {
            id.and_then(|id| workers.iter().position(|w| w.id == Some(id)))
        };
        let cutter_index = position(&cutters, order.cutter_id);
        let checker_index = position(&checkers, order.checker_id);
        let karigar_index = position(&karigars, order.karigar_id);
        Self {
            editing: order.id,
            customer_id: order.customer_id,
            customer_name: customer_name.to_string(),
            due_date: TextInput::with_value(&order.due_date),
            advance: TextInput::with_value(order.advance_payment.as_deref().unwrap_or("")),
            notes: TextInput::with_value(order.delivery_notes.as_deref().unwrap_or("")),
            status_index: OrderStatus::ALL
                .iter()
                .position(|s| *s == order.status)
                .unwrap_or(0),
            cutters,
            checkers,
            karigars,
            cutter_index,
            checker_index,
            karigar_index,
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
            0 => Some(&mut self.due_date),
            1 => Some(&mut self.advance),
            2 => Some(&mut self.notes),
            _ => None,
        }
    }

    /// Cycle the focused dropdown. `delta` is +1 or -1.
    pub fn cycle(&mut self, delta: i32) {
        fn step(index: &mut Option<usize>, len: usize, delta: i32) {
            if len == 0 {
                return;
            }
            // None sits before the first entry so cycling reaches "unassigned"
            let positions = len + 1;
            let current = index.map(|i| i + 1).unwrap_or(0) as i32;
            let next = (current + delta).rem_euclid(positions as i32) as usize;
            *index = if next == 0 { None } else { Some(next - 1) };
        }
        match self.focus {
            3 => {
                let len = OrderStatus::ALL.len() as i32;
                self.status_index = (self.status_index as i32 + delta).rem_euclid(len) as usize;
            }
            4 => step(&mut self.cutter_index, self.cutters.len(), delta),
            5 => step(&mut self.checker_index, self.checkers.len(), delta),
            6 => step(&mut self.karigar_index, self.karigars.len(), delta),
            _ => {}
        }
    }

    pub fn validate(&mut self) -> bool {
        if NaiveDate::parse_from_str(self.due_date.value.trim(), "%Y-%m-%d").is_err() {
            self.error = Some("Due date must be YYYY-MM-DD".to_string());
            return false;
        }
        self.error = None;
        true
    }

    pub fn to_order(&self) -> Order {
        let worker_id = |workers: &[Worker], index: Option<usize>| {
            index.and_then(|i| workers.get(i)).and_then(|w| w.id)
        };
        let optional = |input: &TextInput| {
            let trimmed = input.value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        };
        Order {
            id: self.editing,
            customer_id: self.customer_id,
            status: OrderStatus::ALL[self.status_index],
            due_date: self.due_date.value.trim().to_string(),
            advance_payment: optional(&self.advance),
            delivery_notes: optional(&self.notes),
            cutter_id: worker_id(&self.cutters, self.cutter_index),
            checker_id: worker_id(&self.checkers, self.checker_index),
            karigar_id: worker_id(&self.karigars, self.karigar_index),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }
}

pub fn render(frame: &mut Frame, dialog: &OrderForm, area: Rect) {
    let dialog_width = 62.min(area.width.saturating_sub(4));
    let dialog_height = 21.min(area.height.saturating_sub(2));
    let x = (area.width - dialog_width) / 2;
    let y = (area.height - dialog_height) / 2;
    let dialog_area = Rect::new(x, y, dialog_width, dialog_height);

    frame.render_widget(Clear, dialog_area);

    let title = if dialog.editing.is_some() {
        format!(" Edit Order: {} ", dialog.customer_name)
    } else {
        format!(" New Order: {} ", dialog.customer_name)
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
            Constraint::Length(3), // Due date
            Constraint::Length(3), // Advance
            Constraint::Length(3), // Notes
            Constraint::Length(1), // Status
            Constraint::Length(1), // Cutter
            Constraint::Length(1), // Checker
            Constraint::Length(1), // Karigar
            Constraint::Length(1), // Error
            Constraint::Length(1), // Footer
        ])
        .split(dialog_area);

    let inputs = [
        (" Due Date (YYYY-MM-DD) ", &dialog.due_date, 0),
        (" Advance Payment ", &dialog.advance, 1),
        (" Delivery Notes ", &dialog.notes, 2),
    ];
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

    let worker_name = |workers: &[Worker], index: Option<usize>| match index {
        Some(i) => workers
            .get(i)
            .map(|w| w.name.clone())
            .unwrap_or_else(|| "-".to_string()),
        None => "-".to_string(),
    };
    let selects = [
        (
            "Status",
            OrderStatus::ALL[dialog.status_index].display_name().to_string(),
            3,
        ),
        ("Cutter", worker_name(&dialog.cutters, dialog.cutter_index), 4),
        ("Checker", worker_name(&dialog.checkers, dialog.checker_index), 5),
        ("Karigar", worker_name(&dialog.karigars, dialog.karigar_index), 6),
    ];
    for (label, value, index) in selects {
        let focused = dialog.focus == index;
        let style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let line = Line::from(vec![
            Span::styled(format!("{:10}", label), style),
            Span::raw("< "),
            Span::raw(value),
            Span::raw(" >"),
        ]);
        frame.render_widget(Paragraph::new(line), chunks[index]);
    }

    if let Some(ref error) = dialog.error {
        let msg = Paragraph::new(error.as_str()).style(Style::default().fg(Color::Red));
        frame.render_widget(msg, chunks[7]);
    }
    let footer = Paragraph::new("Enter: save | Tab: next | Left/Right: choose | Esc: cancel")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[8]);
}
