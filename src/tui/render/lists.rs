use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::{AggregateScope, Item};
use crate::tui::app::{App, View};
use crate::tui::theme;

/// Project list: one card per project with aggregate progress.
pub fn render_project_list(frame: &mut Frame, app: &App, area: Rect) {
    let theme = theme::current();
    let projects = app.visible_projects();

    if projects.is_empty() {
        frame.render_widget(
            Paragraph::new(" No projects yet  (N creates one)").style(theme.dim_style()),
            area,
        );
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    for (i, project) in projects.iter().enumerate() {
        let selected = i == app.project_cursor;
        if i > 0 {
            lines.push(Line::from(""));
        }
        let name_style = if selected {
            theme.selected()
        } else {
            Style::default()
                .fg(theme.text_bright)
                .add_modifier(Modifier::BOLD)
        };
        lines.push(Line::from(vec![
            Span::raw(" "),
            Span::styled(project.name.clone(), name_style),
        ]));

        let meta = app
            .ws
            .snapshot
            .aggregate_meta(AggregateScope::Project(&project.id));
        let outlines = app.ws.snapshot.outlines_of(&project.id).len();
        lines.push(Line::from(Span::styled(
            format!(
                "   {} outline(s)  {} item(s)  {} done  {} on hold",
                outlines, meta.total, meta.done, meta.on_hold
            ),
            theme.dim_style(),
        )));
    }

    render_scrolled(frame, area, lines, app.project_cursor * 3);
}

/// Outlines of the current project.
pub fn render_outline_list(frame: &mut Frame, app: &App, area: Rect) {
    let theme = theme::current();
    let outlines = app.visible_outlines();

    if outlines.is_empty() {
        frame.render_widget(
            Paragraph::new(" No outlines yet  (N creates one)").style(theme.dim_style()),
            area,
        );
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    for (i, outline) in outlines.iter().enumerate() {
        let selected = i == app.outline_list_cursor;
        let style = if selected { theme.selected() } else { theme.base() };
        let meta = app
            .ws
            .snapshot
            .aggregate_meta(AggregateScope::Outline(&outline.id));
        lines.push(Line::from(vec![
            Span::raw(" "),
            Span::styled(outline.description.clone(), style),
            Span::styled(
                format!("  {}/{}", meta.done, meta.total),
                theme.dim_style(),
            ),
        ]));
    }

    render_scrolled(frame, area, lines, app.outline_list_cursor);
}

pub fn render_archived_view(frame: &mut Frame, app: &App, area: Rect) {
    let items = app.archived_items();
    render_item_list(
        frame,
        app,
        area,
        &items,
        app.archived_cursor,
        " Nothing archived",
    );
}

pub fn render_agenda_view(frame: &mut Frame, app: &App, area: Rect) {
    let items = app.agenda_items();
    render_item_list(
        frame,
        app,
        area,
        &items,
        app.agenda_cursor,
        " Agenda is clear",
    );
}

fn render_item_list(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    items: &[&Item],
    cursor: usize,
    empty_text: &str,
) {
    let theme = theme::current();
    let snap = &app.ws.snapshot;

    if items.is_empty() {
        frame.render_widget(
            Paragraph::new(empty_text.to_string()).style(theme.dim_style()),
            area,
        );
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let selected = i == cursor;
        let style = if selected { theme.selected() } else { theme.base() };
        let mut spans: Vec<Span> = vec![Span::raw(" ")];
        if item.priority {
            spans.push(Span::styled("! ", Style::default().fg(theme.priority)));
        }
        spans.push(Span::styled(item.title.clone(), style));
        if let Some(project) = snap.project(&item.project_id) {
            spans.push(Span::styled(
                format!("  ({})", project.name),
                theme.dim_style(),
            ));
        }
        lines.push(Line::from(spans));
    }

    render_scrolled(frame, area, lines, cursor);
}

/// The quick-capture form: title and description fields, the active
/// one marked with the cursor block.
pub fn render_capture_view(frame: &mut Frame, app: &App, area: Rect) {
    let theme = theme::current();
    debug_assert_eq!(app.view, View::Capture);

    let cursor = Span::styled("\u{258C}", theme.accent_style());
    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(
        " capture",
        Style::default()
            .fg(theme.text_bright)
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));

    let mut title_spans = vec![
        Span::styled(" title: ", theme.dim_style()),
        Span::styled(app.capture.title.clone(), theme.base()),
    ];
    if !app.capture.in_description {
        title_spans.push(cursor.clone());
    }
    lines.push(Line::from(title_spans));
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled(" notes:", theme.dim_style())));
    let body_lines: Vec<&str> = app.capture.description.lines().collect();
    if body_lines.is_empty() {
        let mut spans = vec![Span::raw("   ")];
        if app.capture.in_description {
            spans.push(cursor.clone());
        }
        lines.push(Line::from(spans));
    } else {
        let last = body_lines.len() - 1;
        for (i, body) in body_lines.iter().enumerate() {
            let mut spans = vec![Span::raw("   "), Span::styled(body.to_string(), theme.base())];
            if i == last && app.capture.in_description {
                spans.push(cursor.clone());
            }
            lines.push(Line::from(spans));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " Tab switch field   Ctrl+S capture   Esc leave (draft kept)",
        theme.dim_style(),
    )));

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_scrolled(frame: &mut Frame, area: Rect, lines: Vec<Line>, cursor_line: usize) {
    let height = area.height as usize;
    let scroll = cursor_line.saturating_sub(height.saturating_sub(1));
    let visible: Vec<Line> = lines.into_iter().skip(scroll).take(height).collect();
    frame.render_widget(Paragraph::new(visible), area);
}
