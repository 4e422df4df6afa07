use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
};

use crate::{
    MIN_HEIGHT, MIN_WIDTH,
    app::App,
    message::{Message, MessageType},
};

const SPINNER_CHARS: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub struct Spinner {
    pub current_frame: usize,
    pub is_spinning: bool,
}

impl Default for Spinner {
    fn default() -> Self {
        Self::new()
    }
}

impl Spinner {
    pub fn new() -> Self {
        Spinner {
            current_frame: 0,
            is_spinning: false,
        }
    }

    pub fn start(&mut self) {
        self.is_spinning = true;
    }

    pub fn stop(&mut self) {
        self.is_spinning = false;
    }

    pub fn tick(&mut self) {
        if self.is_spinning {
            self.current_frame = (self.current_frame + 1) % SPINNER_CHARS.len();
        }
    }

    pub fn get_frame(&self) -> char {
        SPINNER_CHARS[self.current_frame]
    }
}

pub fn spinner_frame(spinner: &Spinner) -> String {
    format!(" The storyteller is thinking {} ", spinner.get_frame())
}

pub fn draw(f: &mut Frame, app: &mut App) {
    let size = f.area();

    if size.width < MIN_WIDTH || size.height < MIN_HEIGHT {
        let warning = Paragraph::new("Terminal too small. Please resize.")
            .style(Style::default().fg(Color::Red))
            .alignment(Alignment::Center);
        f.render_widget(warning, size);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(size);

    draw_messages(f, app, chunks[0]);
    draw_input(f, app, chunks[1]);

    if app.spinner.is_spinning {
        let spinner_area = Rect::new(
            chunks[0].x,
            chunks[0].bottom() - 1,
            chunks[0].width,
            1,
        );
        let spinner_widget = Paragraph::new(spinner_frame(&app.spinner))
            .style(Style::default().fg(Color::Green))
            .alignment(Alignment::Center);
        f.render_widget(spinner_widget, spinner_area);
    }
}

fn draw_messages(f: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::bordered().title(" QuestWeaver ");
    let inner = block.inner(area);

    let lines = wrapped_lines(&app.messages, inner.width as usize);
    let visible = inner.height as usize;

    // Scroll offset counts lines up from the bottom so that new text stays in
    // view unless the player has scrolled away.
    let max_offset = lines.len().saturating_sub(visible);
    app.scroll_offset = app.scroll_offset.min(max_offset);
    let end = lines.len() - app.scroll_offset;
    let start = end.saturating_sub(visible);

    let paragraph = Paragraph::new(lines[start..end].to_vec()).block(block);
    f.render_widget(paragraph, area);
}

fn wrapped_lines(messages: &[Message], width: usize) -> Vec<Line<'static>> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for message in messages {
        let style = match message.message_type {
            MessageType::User => Style::default().fg(Color::Cyan),
            MessageType::Game => Style::default().fg(Color::White),
            MessageType::System => Style::default().fg(Color::Yellow),
        };
        let text = match message.message_type {
            MessageType::User => format!("> {}", message.content),
            _ => message.content.clone(),
        };
        for wrapped in textwrap::wrap(&text, width) {
            lines.push(Line::from(Span::styled(wrapped.into_owned(), style)));
        }
        lines.push(Line::default());
    }
    lines
}

fn draw_input(f: &mut Frame, app: &App, area: Rect) {
    let (title, style) = if app.spinner.is_spinning {
        (" Waiting... ", Style::default().fg(Color::DarkGray))
    } else {
        (" Your move ", Style::default().fg(Color::Green))
    };
    let block = Block::bordered()
        .title(title)
        .border_style(style.add_modifier(Modifier::BOLD));
    let inner = block.inner(area);

    // Show the tail of the input when it overflows the box.
    let width = inner.width.saturating_sub(1) as usize;
    let visible: String = app
        .input
        .chars()
        .rev()
        .take(width)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    let cursor_x = inner.x + visible.chars().count() as u16;

    let input = Paragraph::new(visible).block(block);
    f.render_widget(input, area);
    if !app.spinner.is_spinning {
        f.set_cursor_position(Position::new(cursor_x, inner.y));
    }
}
