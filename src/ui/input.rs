use ratatui::prelude::*;

/// Single-line text input with cursor editing, shared by the form dialogs.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    pub value: String,
    pub cursor: usize,
}

impl TextInput {
    pub fn with_value(value: &str) -> Self {
        Self {
            value: value.to_string(),
            cursor: value.len(),
        }
    }

    pub fn handle_char(&mut self, c: char) {
        self.value.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let prev = prev_boundary(&self.value, self.cursor);
            self.value.replace_range(prev..self.cursor, "");
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.value.len() {
            let next = next_boundary(&self.value, self.cursor);
            self.value.replace_range(self.cursor..next, "");
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor > 0 {
            self.cursor = prev_boundary(&self.value, self.cursor);
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor < self.value.len() {
            self.cursor = next_boundary(&self.value, self.cursor);
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor = self.value.len();
    }

    /// Value with a visible cursor for focused rendering.
    pub fn spans(&self, focused: bool) -> Line<'_> {
        if !focused {
            return Line::raw(self.value.as_str());
        }
        Line::from(vec![
            Span::raw(&self.value[..self.cursor]),
            Span::styled(
                "|",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::raw(&self.value[self.cursor..]),
        ])
    }
}

fn prev_boundary(s: &str, from: usize) -> usize {
    let mut i = from - 1;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn next_boundary(s: &str, from: usize) -> usize {
    let mut i = from + 1;
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editing_at_cursor() {
        let mut input = TextInput::with_value("0313");
        input.handle_char('-');
        assert_eq!(input.value, "0313-");
        input.move_cursor_home();
        input.delete();
        assert_eq!(input.value, "313-");
        input.move_cursor_end();
        input.backspace();
        assert_eq!(input.value, "313");
    }

    #[test]
    fn test_multibyte_navigation() {
        let mut input = TextInput::with_value("بلال");
        input.backspace();
        assert_eq!(input.value, "بلا");
        input.move_cursor_left();
        input.move_cursor_left();
        input.handle_char('x');
        assert_eq!(input.value, "بxلا");
    }
}
