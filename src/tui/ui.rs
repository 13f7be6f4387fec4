//! TUI event loop and rendering for cursochat.

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use tokio::sync::mpsc;
use unicode_width::UnicodeWidthStr;

use crate::client::ChatbotClient;
use crate::config::Config;
use crate::core::events::Event;
use crate::core::reveal::{RevealOptions, spawn_reveal_worker};
use crate::core::session::spawn_session_engine;
use crate::core::transcript::{Message, RevealState, Sender, new_shared_transcript};
use crate::notify::{SharedNotifier, Silent, TerminalBell};
use crate::render::{Segment, render};
use crate::settings::Settings;

use super::app::{App, TuiOptions};

// === Constants ===

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const ACCENT: Color = Color::Green;

/// Run the interactive TUI event loop.
pub async fn run_tui(config: &Config, settings: &Settings, options: TuiOptions) -> Result<()> {
    let transcript = new_shared_transcript();
    let (tx_event, mut rx_event) = mpsc::unbounded_channel();
    let notifier: SharedNotifier = if options.sound && settings.sound {
        Arc::new(TerminalBell)
    } else {
        Arc::new(Silent)
    };
    let reveal = spawn_reveal_worker(
        transcript.clone(),
        tx_event.clone(),
        notifier.clone(),
        RevealOptions::from_settings(settings),
    );
    let client = ChatbotClient::new(config)?;
    let engine = spawn_session_engine(
        client,
        transcript.clone(),
        reveal.clone(),
        tx_event,
        notifier,
    );
    let mut app = App::new(transcript, engine, reveal);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_event_loop(&mut terminal, &mut app, &mut rx_event).await;

    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    result
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    rx_event: &mut mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    loop {
        while let Ok(event) = rx_event.try_recv() {
            app.handle_event(&event);
        }

        terminal.draw(|frame| draw(frame, app))?;

        if event::poll(POLL_INTERVAL)?
            && let TermEvent::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            handle_key(app, key).await;
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

async fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    if !app.surface.is_open() {
        match key.code {
            KeyCode::Char('o') | KeyCode::Enter => app.open_chat(),
            KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc => app.close_chat(),
        KeyCode::Enter => app.submit_input().await,
        KeyCode::Backspace => app.pop_input_char(),
        KeyCode::Up => app.scroll_up(),
        KeyCode::Down => app.scroll_down(),
        KeyCode::Char(ch) => app.push_input_char(ch),
        _ => {}
    }
}

// === Drawing ===

fn draw(frame: &mut Frame, app: &App) {
    if !app.surface.is_open() {
        draw_closed_hint(frame);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    draw_header(frame, chunks[0]);
    draw_transcript(frame, chunks[1], app);
    draw_status(frame, chunks[2], app);
    draw_composer(frame, chunks[3], app);
}

fn draw_closed_hint(frame: &mut Frame) {
    let lines = vec![
        Line::from(Span::styled(
            "Chatbot de Cursos — UdeA",
            Style::new().fg(ACCENT).bold(),
        )),
        Line::from(""),
        Line::from("Pulsa 'o' para abrir el chat, 'q' para salir."),
    ];
    let hint = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(hint, centered_rect(frame.area(), 50, 5));
}

fn draw_header(frame: &mut Frame, area: Rect) {
    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            "Chatbot de Cursos — UdeA",
            Style::new().fg(ACCENT).bold(),
        )),
        Line::from(Span::styled(
            "Te ayudo a encontrar cursos perfectos",
            Style::new().dim(),
        )),
    ]);
    frame.render_widget(header, area);
}

fn draw_transcript(frame: &mut Frame, area: Rect, app: &App) {
    if app.display_suppressed {
        return;
    }

    let lines = {
        let guard = match app.transcript.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        transcript_lines(guard.messages())
    };

    // Stick to the bottom unless the user scrolled up.
    let wrapped_rows: u16 = lines
        .iter()
        .map(|line| wrapped_row_count(line, area.width))
        .sum();
    let bottom_offset = wrapped_rows.saturating_sub(area.height);
    let offset = bottom_offset.saturating_sub(app.scroll_offset.min(bottom_offset));

    let transcript = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((offset, 0));
    frame.render_widget(transcript, area);
}

fn draw_status(frame: &mut Frame, area: Rect, app: &App) {
    let status = if app.turn_in_flight {
        Line::from(Span::styled(
            "El asistente está escribiendo…",
            Style::new().fg(ACCENT).italic(),
        ))
    } else {
        Line::from(Span::styled(
            "Enter envía · Esc cierra el chat · ↑/↓ desplazan",
            Style::new().dim(),
        ))
    };
    frame.render_widget(Paragraph::new(status), area);
}

fn draw_composer(frame: &mut Frame, area: Rect, app: &App) {
    let placeholder = app.input.is_empty();
    let text = if placeholder {
        "Escribe tu mensaje aquí..."
    } else {
        app.input.as_str()
    };
    let style = if placeholder {
        Style::new().dim()
    } else {
        Style::new()
    };
    let composer = Paragraph::new(Line::from(Span::styled(text, style)))
        .block(Block::default().borders(Borders::ALL).border_style(Style::new().fg(ACCENT)));
    frame.render_widget(composer, area);

    if !placeholder {
        let width = app.input.width() as u16;
        let x = area.x + 1 + width.min(area.width.saturating_sub(3));
        frame.set_cursor_position((x, area.y + 1));
    }
}

// === Message Layout ===

fn transcript_lines(messages: &[Message]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for message in messages {
        lines.push(heading_line(message));
        lines.extend(content_lines(message));
        lines.push(Line::from(""));
    }
    lines
}

fn heading_line(message: &Message) -> Line<'static> {
    let time = message
        .timestamp
        .with_timezone(&chrono::Local)
        .format("%H:%M");
    match message.sender {
        Sender::User => Line::from(Span::styled(
            format!("Tú · {time}"),
            Style::new().fg(ACCENT).bold(),
        ))
        .alignment(Alignment::Right),
        Sender::Bot => Line::from(Span::styled(
            format!("Asistente · {time}"),
            Style::new().bold(),
        )),
    }
}

fn content_lines(message: &Message) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    for segment in render(&message.content) {
        match segment {
            Segment::Break => {
                lines.push(Line::from(std::mem::take(&mut current)));
            }
            Segment::Text(text) => push_text_spans(&mut lines, &mut current, &text, Style::new()),
            Segment::Strong(text) => push_text_spans(
                &mut lines,
                &mut current,
                &text,
                Style::new().add_modifier(Modifier::BOLD),
            ),
            Segment::Emphasis(text) => push_text_spans(
                &mut lines,
                &mut current,
                &text,
                Style::new().add_modifier(Modifier::ITALIC),
            ),
            Segment::Link { display, .. } => current.push(Span::styled(
                display,
                Style::new().fg(ACCENT).add_modifier(Modifier::UNDERLINED),
            )),
        }
    }
    if message.reveal_state == RevealState::Revealing {
        current.push(Span::styled("▌", Style::new().fg(ACCENT)));
    }
    if !current.is_empty() {
        lines.push(Line::from(current));
    }
    if message.sender == Sender::User {
        for line in &mut lines {
            *line = std::mem::take(line).alignment(Alignment::Right);
        }
    }
    lines
}

/// Split multi-line text into spans, flushing a display line at each
/// newline.
fn push_text_spans(
    lines: &mut Vec<Line<'static>>,
    current: &mut Vec<Span<'static>>,
    text: &str,
    style: Style,
) {
    let mut parts = text.split('\n').peekable();
    while let Some(part) = parts.next() {
        if !part.is_empty() {
            current.push(Span::styled(part.to_string(), style));
        }
        if parts.peek().is_some() {
            lines.push(Line::from(std::mem::take(current)));
        }
    }
}

fn wrapped_row_count(line: &Line<'_>, width: u16) -> u16 {
    if width == 0 {
        return 1;
    }
    let line_width = line.width() as u16;
    if line_width == 0 {
        1
    } else {
        line_width.div_ceil(width)
    }
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}
