use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

#[cfg(test)]
extern crate insta;

use crate::app::App;
use crate::widgets::{candidate_labels, status_line, PROMPT};

/// Main render function called from the prompt loop.
///
/// Layout, top to bottom:
///   [matching candidates, bottom-aligned]
///   [status line]
///   [prompt line]
pub fn render(frame: &mut Frame, app: &App) {
    let [body, status, prompt] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_candidates(frame, app, body);
    render_status(frame, app, status);
    render_prompt(frame, app, prompt);
}

/// Render the filtered candidates so the last one sits right above the
/// status line. If they don't all fit, the tail of the list is shown.
fn render_candidates(frame: &mut Frame, app: &App, area: Rect) {
    let labels = candidate_labels(&app.filtered);
    let visible = labels.len().min(area.height as usize);
    let lines: Vec<Line> = labels[labels.len() - visible..]
        .iter()
        .map(|label| Line::from(label.as_str()))
        .collect();

    let height = visible as u16;
    let list_area = Rect {
        y: area.y + area.height - height,
        height,
        ..area
    };
    frame.render_widget(Paragraph::new(lines), list_area);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let style = if app.pattern_error.is_some() {
        Style::default().fg(Color::Red)
    } else {
        Style::default()
    };
    frame.render_widget(Paragraph::new(Span::styled(status_line(app), style)), area);
}

fn render_prompt(frame: &mut Frame, app: &App, area: Rect) {
    let line = Line::from(vec![Span::raw(PROMPT), Span::raw(app.query.as_str())]);
    let cursor_x = area.x.saturating_add(line.width() as u16);
    frame.render_widget(Paragraph::new(line), area);
    frame.set_cursor_position((cursor_x.min(area.right().saturating_sub(1)), area.y));
}
