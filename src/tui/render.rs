//! View — error banner, the two translation cards, and the footer.
//!
//! Pure rendering: reads `TuiApp`, mutates nothing. The input card owns
//! the terminal cursor; its content is character-wrapped by hand so the
//! cursor cell can be computed from the same wrapping.

use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;
use unicode_width::UnicodeWidthChar;

use super::app::TuiApp;

pub fn draw(frame: &mut Frame, app: &TuiApp) {
    let banner_height = if app.session.error().is_some() { 3 } else { 0 };
    let rows = Layout::vertical([
        Constraint::Length(banner_height),
        Constraint::Min(5),
        Constraint::Length(1),
    ])
    .split(frame.area());

    if let Some(error) = app.session.error() {
        draw_error_banner(frame, rows[0], &error.message);
    }

    let cards =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(rows[1]);
    draw_input_card(frame, cards[0], app);
    draw_output_card(frame, cards[1], app);
    draw_footer(frame, rows[2], app);
}

fn draw_error_banner(frame: &mut Frame, area: Rect, message: &str) {
    let banner = Paragraph::new(format!("{message}  (Ctrl+D to dismiss)"))
        .style(Style::default().fg(Color::Red))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        );
    frame.render_widget(banner, area);
}

fn draw_input_card(frame: &mut Frame, area: Rect, app: &TuiApp) {
    let mut title = format!(" {} ", app.session.source_lang());
    if app.session.listening() {
        title.push_str("● listening ");
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_style(Style::default().add_modifier(Modifier::BOLD));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let (lines, (row, col)) = wrap_cursor(app.input.content(), app.input.cursor(), inner.width);
    // Keep the cursor row visible; scroll the top off first.
    let scroll = row.saturating_sub(inner.height - 1);
    let text: Vec<Line> = lines.into_iter().map(Line::from).collect();
    frame.render_widget(Paragraph::new(text).scroll((scroll, 0)), inner);

    frame.set_cursor_position(Position::new(
        inner.x + col.min(inner.width - 1),
        inner.y + (row - scroll),
    ));
}

fn draw_output_card(frame: &mut Frame, area: Rect, app: &TuiApp) {
    let target = app.session.target_lang();
    let title = if target.supports_formality() {
        let register = if app.session.polite() { "polite" } else { "casual" };
        format!(" {target} · {register} ")
    } else {
        format!(" {target} ")
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_style(Style::default().add_modifier(Modifier::BOLD));
    let output = Paragraph::new(app.session.output_text())
        .wrap(Wrap { trim: false })
        .block(block);
    frame.render_widget(output, area);
}

fn draw_footer(frame: &mut Frame, area: Rect, app: &TuiApp) {
    let footer = match &app.notice {
        Some(notice) => {
            Paragraph::new(notice.as_str()).style(Style::default().fg(Color::Yellow))
        }
        None => Paragraph::new(
            "Enter translate now   Tab swap   F2/F3 language   Ctrl+P register   \
             Ctrl+R mic   Ctrl+T speak   Ctrl+Y copy   Esc clear   Ctrl+C quit",
        )
        .style(Style::default().fg(Color::DarkGray)),
    };
    frame.render_widget(footer, area);
}

/// Character-wrap `text` to `width` columns and locate the cursor (a
/// character offset) in the wrapped grid. Returns the wrapped lines and
/// the cursor's (row, column) in display cells. Newlines force a break;
/// wide characters count their display width.
fn wrap_cursor(text: &str, cursor: usize, width: u16) -> (Vec<String>, (u16, u16)) {
    let width = width.max(1) as usize;
    let mut lines = vec![String::new()];
    let mut col = 0usize;
    let mut cursor_cell = None;

    for (i, ch) in text.chars().enumerate() {
        if i == cursor {
            cursor_cell = Some((lines.len() as u16 - 1, col as u16));
        }
        if ch == '\n' {
            lines.push(String::new());
            col = 0;
            continue;
        }
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if col + w > width {
            lines.push(String::new());
            col = 0;
            if i == cursor {
                cursor_cell = Some((lines.len() as u16 - 1, 0));
            }
        }
        if let Some(line) = lines.last_mut() {
            line.push(ch);
        }
        col += w;
    }

    let cursor_cell = cursor_cell.unwrap_or((lines.len() as u16 - 1, col as u16));
    (lines, cursor_cell)
}
