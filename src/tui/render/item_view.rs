use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::ops::projection::OutlineRow;
use crate::tui::app::{App, ItemFocus};
use crate::tui::{glyphs, markdown, theme};

use super::helpers::status_label;

/// Render the item view: title, status line, description, children,
/// and the comment thread. The focused region carries an accent mark.
pub fn render_item_view(frame: &mut Frame, app: &App, area: Rect) {
    let theme = theme::current();
    let glyphs = glyphs::current();
    let snap = &app.ws.snapshot;

    let Some(item) = app.open_item_id.as_ref().and_then(|id| snap.item(id)) else {
        frame.render_widget(
            Paragraph::new(" Item not found").style(theme.dim_style()),
            area,
        );
        return;
    };
    let outline = snap.outline(&item.outline_id);
    let width = (area.width as usize).saturating_sub(4);

    let focus_mark = |focus: ItemFocus| -> Span<'static> {
        if app.item_focus == focus {
            Span::styled(format!("{} ", glyphs.arrow), theme.accent_style())
        } else {
            Span::raw("  ")
        }
    };

    let mut lines: Vec<Line> = Vec::new();

    // Title
    lines.push(Line::from(vec![
        Span::raw(" "),
        focus_mark(ItemFocus::Title),
        Span::styled(
            item.title.clone(),
            Style::default()
                .fg(theme.text_bright)
                .add_modifier(Modifier::BOLD),
        ),
    ]));

    // Status and priority
    let status = outline.map(|o| status_label(o, item)).unwrap_or("");
    lines.push(Line::from(vec![
        Span::raw(" "),
        focus_mark(ItemFocus::Status),
        Span::styled("status: ", theme.dim_style()),
        Span::styled(
            if status.is_empty() { "(none)" } else { status }.to_string(),
            theme.base(),
        ),
    ]));
    let mut flag_spans = vec![
        Span::raw(" "),
        focus_mark(ItemFocus::Priority),
        Span::styled("priority: ", theme.dim_style()),
        Span::styled(
            if item.priority { "yes" } else { "no" },
            if item.priority {
                Style::default().fg(theme.priority)
            } else {
                theme.base()
            },
        ),
    ];
    if item.on_hold {
        flag_spans.push(Span::styled(
            "   on hold",
            Style::default().fg(theme.on_hold),
        ));
    }
    lines.push(Line::from(flag_spans));

    // Assignees and tags
    if !item.assignee_actor_ids.is_empty() {
        let names: Vec<String> = item
            .assignee_actor_ids
            .iter()
            .map(|id| {
                snap.actor(id)
                    .map(|a| a.name.clone())
                    .unwrap_or_else(|| id.clone())
            })
            .collect();
        lines.push(Line::from(vec![
            Span::raw("   "),
            Span::styled("assigned: ", theme.dim_style()),
            Span::styled(names.join(", "), theme.base()),
        ]));
    }
    if !item.tags.is_empty() {
        let tags: Vec<String> = item.tags.iter().map(|t| format!("#{t}")).collect();
        lines.push(Line::from(vec![
            Span::raw("   "),
            Span::styled(tags.join(" "), theme.accent_style()),
        ]));
    }
    lines.push(Line::from(""));

    // Description
    lines.push(Line::from(vec![
        Span::raw(" "),
        focus_mark(ItemFocus::Description),
        Span::styled(
            "description",
            Style::default().fg(theme.text_bright),
        ),
    ]));
    if item.description.is_empty() {
        lines.push(Line::from(Span::styled("   (none)", theme.dim_style())));
    } else {
        for line in markdown::render(&item.description, width).lines() {
            lines.push(Line::from(Span::styled(
                format!("   {line}"),
                theme.base(),
            )));
        }
    }
    lines.push(Line::from(""));

    // Children (narrowed rows; row 0 is the open item itself)
    lines.push(Line::from(vec![
        Span::raw(" "),
        focus_mark(ItemFocus::Children),
        Span::styled("children", Style::default().fg(theme.text_bright)),
    ]));
    let children: Vec<&OutlineRow> = app
        .item_rows
        .iter()
        .skip(1)
        .filter(|r| matches!(r, OutlineRow::Item(_)))
        .collect();
    if children.is_empty() {
        lines.push(Line::from(Span::styled("   (none)", theme.dim_style())));
    } else {
        for (i, row) in children.iter().enumerate() {
            let OutlineRow::Item(row) = row else { continue };
            let Some(child) = snap.item(&row.item_id) else {
                continue;
            };
            let selected = app.item_focus == ItemFocus::Children && i == app.child_cursor;
            let style = if selected { theme.selected() } else { theme.base() };
            let done = outline.is_some_and(|o| o.is_end_state(&child.status_id));
            let mark = if done { glyphs.bullet } else { glyphs.twisty_collapsed };
            lines.push(Line::from(vec![
                Span::styled(
                    format!("   {}{} ", "  ".repeat(row.depth.saturating_sub(1)), mark),
                    theme.dim_style(),
                ),
                Span::styled(child.title.clone(), style),
            ]));
        }
    }
    lines.push(Line::from(""));

    // Comments, threaded
    lines.push(Line::from(vec![
        Span::raw(" "),
        focus_mark(ItemFocus::Comments),
        Span::styled("comments", Style::default().fg(theme.text_bright)),
    ]));
    let thread = app.comment_thread(&item.id);
    if thread.is_empty() {
        lines.push(Line::from(Span::styled("   (none)", theme.dim_style())));
    }
    for (i, (comment_id, depth)) in thread.iter().enumerate() {
        let Some(comment) = snap.comment(comment_id) else {
            continue;
        };
        let author = snap
            .actor(&comment.author_id)
            .map(|a| a.name.clone())
            .unwrap_or_else(|| comment.author_id.clone());
        let selected = app.item_focus == ItemFocus::Comments && i == app.comment_cursor;
        let header_style = if selected {
            theme.selected()
        } else {
            theme.dim_style()
        };
        let indent = "  ".repeat(*depth);
        lines.push(Line::from(vec![
            Span::raw(format!("   {indent}")),
            Span::styled(
                format!("{author} · {}", comment.created_at.format("%Y-%m-%d %H:%M")),
                header_style,
            ),
        ]));
        for body_line in comment.body.lines() {
            lines.push(Line::from(Span::styled(
                format!("   {indent}{body_line}"),
                theme.base(),
            )));
        }
    }

    let height = area.height as usize;
    let visible: Vec<Line> = if lines.len() > height {
        lines.into_iter().take(height).collect()
    } else {
        lines
    };
    frame.render_widget(Paragraph::new(visible), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::pipeline::{Mutation, Position};
    use crate::tui::app::tests::{seed_outline, test_app};
    use crate::tui::render::test_helpers::render_to_string;
    use tempfile::TempDir;

    #[test]
    fn renders_threaded_comments_indented() {
        let tmp = TempDir::new().unwrap();
        let mut app = test_app(&tmp);
        let outline = seed_outline(&mut app);
        let item = app
            .mutate(Mutation::CreateItem {
                outline_id: outline,
                parent_id: None,
                title: "discussion".into(),
                description: String::new(),
                position: Position::End,
            })
            .unwrap()
            .created_id
            .unwrap();
        let root = app
            .mutate(Mutation::CreateComment {
                item_id: item.clone(),
                body: "first take".into(),
                reply_to: None,
            })
            .unwrap()
            .created_id
            .unwrap();
        app.mutate(Mutation::CreateComment {
            item_id: item.clone(),
            body: "counterpoint".into(),
            reply_to: Some(root),
        })
        .unwrap();
        app.open_item(item, false);

        let text = render_to_string(70, 24, |frame, area| {
            render_item_view(frame, &app, area);
        });
        assert!(text.contains("discussion"));
        let first = text.lines().find(|l| l.contains("first take")).unwrap();
        let reply = text.lines().find(|l| l.contains("counterpoint")).unwrap();
        let indent = |l: &str| l.len() - l.trim_start().len();
        assert!(indent(reply) > indent(first));
    }
}
