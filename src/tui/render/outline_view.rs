use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::Outline;
use crate::ops::projection::{OutlineRow, Row};
use crate::tui::app::{App, Pane};
use crate::tui::{glyphs, markdown, theme};

use super::helpers::{spans_width, status_label};

/// Render the outline view: the row tree, with an optional detail pane
/// for the selected item when the preview is on.
pub fn render_outline_view(frame: &mut Frame, app: &App, area: Rect) {
    let Some(outline) = app
        .current_outline_id
        .as_ref()
        .and_then(|id| app.ws.snapshot.outline(id))
    else {
        let theme = theme::current();
        frame.render_widget(
            Paragraph::new(" No outline selected").style(theme.dim_style()),
            area,
        );
        return;
    };

    if app.show_preview {
        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area);
        render_rows(frame, app, outline, panes[0]);
        render_preview(frame, app, panes[1]);
    } else {
        render_rows(frame, app, outline, area);
    }
}

fn render_rows(frame: &mut Frame, app: &App, outline: &Outline, area: Rect) {
    let theme = theme::current();
    let height = area.height as usize;
    let width = area.width as usize;

    // Keep the cursor in view
    let scroll = app.outline_cursor.saturating_sub(height.saturating_sub(1));

    let mut lines: Vec<Line> = Vec::new();
    for (i, row) in app.rows.iter().enumerate().skip(scroll).take(height) {
        let is_cursor = i == app.outline_cursor && app.pane == Pane::OutlinePane;
        lines.push(match row {
            OutlineRow::Item(row) => item_line(app, outline, row, is_cursor, width),
            OutlineRow::AddRow => add_line(is_cursor, width),
        });
    }

    if app.rows.is_empty() {
        lines.push(Line::from(Span::styled(
            " Outline is empty",
            theme.dim_style(),
        )));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn item_line<'a>(app: &App, outline: &Outline, row: &Row, is_cursor: bool, width: usize) -> Line<'a> {
    let theme = theme::current();
    let glyphs = glyphs::current();
    let Some(item) = app.ws.snapshot.item(&row.item_id) else {
        return Line::from("");
    };

    let bg = if is_cursor {
        Style::default().bg(theme.selection_bg)
    } else {
        Style::default()
    };

    let twisty = if !row.has_children {
        glyphs.bullet
    } else if row.collapsed {
        glyphs.twisty_collapsed
    } else {
        glyphs.twisty_expanded
    };

    let done = outline.is_end_state(&item.status_id);
    let mut title_style = if done {
        Style::default().fg(theme.done).add_modifier(Modifier::CROSSED_OUT)
    } else if is_cursor {
        Style::default().fg(theme.text_bright).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text)
    }
    .patch(bg);
    if item.on_hold {
        title_style = title_style.add_modifier(Modifier::DIM);
    }

    let mut spans: Vec<Span> = Vec::new();
    spans.push(Span::styled(
        format!(" {}{} ", "  ".repeat(row.depth), twisty),
        theme.dim_style().patch(bg),
    ));
    if item.priority {
        spans.push(Span::styled(
            "! ",
            Style::default().fg(theme.priority).patch(bg),
        ));
    }
    spans.push(Span::styled(item.title.clone(), title_style));

    let status = status_label(outline, item);
    if !status.is_empty() {
        spans.push(Span::styled(
            format!("  [{status}]"),
            theme.dim_style().patch(bg),
        ));
    }
    if item.on_hold {
        spans.push(Span::styled(
            "  (on hold)",
            Style::default().fg(theme.on_hold).patch(bg),
        ));
    }
    if row.collapsed && row.total_children > 0 {
        spans.push(Span::styled(
            format!("  {}/{}", row.done_children, row.total_children),
            theme.dim_style().patch(bg),
        ));
    }

    pad_line(spans, is_cursor, width, bg)
}

fn add_line<'a>(is_cursor: bool, width: usize) -> Line<'a> {
    let theme = theme::current();
    let bg = if is_cursor {
        Style::default().bg(theme.selection_bg)
    } else {
        Style::default()
    };
    let spans = vec![Span::styled(" + add item", theme.dim_style().patch(bg))];
    pad_line(spans, is_cursor, width, bg)
}

fn pad_line(mut spans: Vec<Span<'_>>, is_cursor: bool, width: usize, bg: Style) -> Line<'_> {
    if is_cursor {
        let content = spans_width(&spans);
        if content < width {
            spans.push(Span::styled(" ".repeat(width - content), bg));
        }
    }
    Line::from(spans)
}

/// Right-hand preview of the selected item's description.
fn render_preview(frame: &mut Frame, app: &App, area: Rect) {
    let theme = theme::current();
    let Some(item) = app
        .selected_outline_item()
        .and_then(|id| app.ws.snapshot.item(id))
    else {
        return;
    };

    let width = (area.width as usize).saturating_sub(2);
    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(
        format!(" {}", item.title),
        Style::default()
            .fg(theme.text_bright)
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));
    if item.description.is_empty() {
        lines.push(Line::from(Span::styled(
            " (no description)",
            theme.dim_style(),
        )));
    } else {
        for line in markdown::render(&item.description, width).lines() {
            lines.push(Line::from(Span::styled(
                format!(" {line}"),
                theme.base(),
            )));
        }
    }

    frame.render_widget(Paragraph::new(lines), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::pipeline::{Mutation, Position};
    use crate::tui::app::tests::{seed_outline, test_app};
    use crate::tui::render::test_helpers::render_to_string;
    use tempfile::TempDir;

    #[test]
    fn collapsed_parent_shows_progress_counts() {
        let tmp = TempDir::new().unwrap();
        let mut app = test_app(&tmp);
        let outline = seed_outline(&mut app);
        let parent = app
            .mutate(Mutation::CreateItem {
                outline_id: outline.clone(),
                parent_id: None,
                title: "release".into(),
                description: String::new(),
                position: Position::End,
            })
            .unwrap()
            .created_id
            .unwrap();
        let child = app
            .mutate(Mutation::CreateItem {
                outline_id: outline,
                parent_id: Some(parent.clone()),
                title: "ship it".into(),
                description: String::new(),
                position: Position::End,
            })
            .unwrap()
            .created_id
            .unwrap();
        app.mutate(Mutation::SetStatus {
            id: child,
            status_id: "done".into(),
        })
        .unwrap();
        app.set_collapsed(&parent, true);

        let text = render_to_string(60, 10, |frame, area| {
            render_outline_view(frame, &app, area);
        });
        assert!(text.contains("release"));
        assert!(!text.contains("ship it"));
        assert!(text.contains("1/1"));
        assert!(text.contains("+ add item"));
    }

    #[test]
    fn priority_and_hold_markers_visible() {
        let tmp = TempDir::new().unwrap();
        let mut app = test_app(&tmp);
        let outline = seed_outline(&mut app);
        let item = app
            .mutate(Mutation::CreateItem {
                outline_id: outline,
                parent_id: None,
                title: "urgent".into(),
                description: String::new(),
                position: Position::End,
            })
            .unwrap()
            .created_id
            .unwrap();
        app.mutate(Mutation::TogglePriority { id: item.clone() })
            .unwrap();
        app.mutate(Mutation::ToggleOnHold { id: item }).unwrap();

        let text = render_to_string(60, 10, |frame, area| {
            render_outline_view(frame, &app, area);
        });
        assert!(text.contains("! urgent"));
        assert!(text.contains("(on hold)"));
    }
}
