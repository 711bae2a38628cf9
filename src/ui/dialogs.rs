use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

/// Help overlay listing the keybindings.
pub fn render_help(frame: &mut Frame, area: Rect) {
    let dialog_width = 64.min(area.width.saturating_sub(4));
    let dialog_height = 24.min(area.height.saturating_sub(2));
    let x = (area.width - dialog_width) / 2;
    let y = (area.height - dialog_height) / 2;
    let dialog_area = Rect::new(x, y, dialog_width, dialog_height);

    frame.render_widget(Clear, dialog_area);

    let text = vec![
        Line::styled("Pages", Style::default().add_modifier(Modifier::BOLD)),
        Line::raw("  1  Dashboard        2  Customers"),
        Line::raw("  3  Orders           4  Workers"),
        Line::raw("  5  Backup           s  Shop settings"),
        Line::raw(""),
        Line::styled("Customers", Style::default().add_modifier(Modifier::BOLD)),
        Line::raw("  j/k or arrows  move      /  search"),
        Line::raw("  n  new    e  edit    d  delete    Enter  detail"),
        Line::raw("  m  measurements       p  print slip"),
        Line::raw(""),
        Line::styled("Orders", Style::default().add_modifier(Modifier::BOLD)),
        Line::raw("  Tab  cycle status filter"),
        Line::raw("  1-5 or ]/[  set status of selected order"),
        Line::raw("  e  edit    d  delete    Esc  back to dashboard"),
        Line::raw(""),
        Line::styled("Customer detail", Style::default().add_modifier(Modifier::BOLD)),
        Line::raw("  o  new order    m  measurements    p  print slip"),
        Line::raw(""),
        Line::styled("Backup", Style::default().add_modifier(Modifier::BOLD)),
        Line::raw("  e  export JSON    i  import JSON    c  export CSV"),
        Line::raw(""),
        Line::raw("  q  quit    ?  close this help"),
    ];

    let help = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Help ")
            .title_style(Style::default().add_modifier(Modifier::BOLD)),
    );
    frame.render_widget(help, dialog_area);
}
