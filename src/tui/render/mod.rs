pub mod helpers;
pub mod item_view;
pub mod lists;
pub mod outline_view;
pub mod overlay;
#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use crate::tui::theme;
use crate::util::text::truncate_to_width;

use super::app::{App, View};

/// Main render function. Pure: reads the app, draws the frame, never
/// mutates state.
pub fn render(frame: &mut Frame, app: &App) {
    let theme = theme::current();
    let area = frame.area();

    // Background fill
    frame.render_widget(
        Block::default().style(Style::default().bg(theme.background)),
        area,
    );

    // Layout: breadcrumb (1 row) | content | minibuffer (1 row)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    render_breadcrumb(frame, app, chunks[0]);

    match app.view {
        View::ProjectList => lists::render_project_list(frame, app, chunks[1]),
        View::OutlineList => lists::render_outline_list(frame, app, chunks[1]),
        View::Outline => outline_view::render_outline_view(frame, app, chunks[1]),
        View::Item => item_view::render_item_view(frame, app, chunks[1]),
        View::Archived => lists::render_archived_view(frame, app, chunks[1]),
        View::Agenda => lists::render_agenda_view(frame, app, chunks[1]),
        View::Capture => lists::render_capture_view(frame, app, chunks[1]),
    }

    render_minibuffer(frame, app, chunks[2]);

    // Modals draw on top of everything
    if app.modal.is_some() {
        overlay::render_modal(frame, app, frame.area());
    }
}

/// One-line location trail: project, outline, open item.
fn render_breadcrumb(frame: &mut Frame, app: &App, area: Rect) {
    let theme = theme::current();
    let glyphs = super::glyphs::current();
    let snap = &app.ws.snapshot;

    let mut parts: Vec<String> = Vec::new();
    if let Some(project) = app
        .current_project_id
        .as_ref()
        .and_then(|id| snap.project(id))
    {
        parts.push(truncate_to_width(&project.name, 32));
    }
    if let Some(outline) = app
        .current_outline_id
        .as_ref()
        .and_then(|id| snap.outline(id))
    {
        parts.push(truncate_to_width(&outline.description, 32));
    }
    if app.view == View::Item
        && let Some(item) = app.open_item_id.as_ref().and_then(|id| snap.item(id))
    {
        parts.push(truncate_to_width(&item.title, 48));
    }

    let label = match app.view {
        View::ProjectList => Some("projects"),
        View::OutlineList => Some("outlines"),
        View::Archived => Some("archived"),
        View::Agenda => Some("agenda"),
        View::Capture => Some("capture"),
        View::Outline | View::Item => None,
    };

    let mut spans: Vec<Span> = vec![Span::raw(" ")];
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(
                format!(" {} ", glyphs.arrow),
                theme.dim_style(),
            ));
        }
        spans.push(Span::styled(part.clone(), theme.accent_style()));
    }
    if let Some(label) = label {
        if !parts.is_empty() {
            spans.push(Span::styled(
                format!(" {} ", glyphs.arrow),
                theme.dim_style(),
            ));
        }
        spans.push(Span::styled(label, theme.accent_style()));
    }
    if app.view == View::Item && app.read_only {
        spans.push(Span::styled("  [read-only]", theme.dim_style()));
    }
    if let Some(applied) = &app.filter.applied {
        spans.push(Span::styled(format!("  /{applied}"), theme.dim_style()));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Bottom row: filter prompt while entering, otherwise the transient
/// notice, otherwise the applied filter dimmed.
fn render_minibuffer(frame: &mut Frame, app: &App, area: Rect) {
    let theme = theme::current();

    let line = if app.filter.entering {
        Line::from(vec![
            Span::styled(
                format!(" /{}", app.filter.input),
                Style::default().fg(theme.text_bright),
            ),
            Span::styled("\u{258C}", theme.accent_style()),
            Span::styled("  Enter apply  Esc cancel", theme.dim_style()),
        ])
    } else if let Some(notice) = &app.minibuffer {
        Line::from(Span::styled(format!(" {notice}"), theme.accent_style()))
    } else if let Some(applied) = &app.filter.applied {
        Line::from(Span::styled(format!(" /{applied}"), theme.dim_style()))
    } else {
        Line::from("")
    };

    frame.render_widget(Paragraph::new(line), area);
}
