use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::tui::actions::{self, is_mutating};
use crate::tui::app::{App, EditState, Modal, PanelKind, PickState, TitleTarget};
use crate::tui::theme::{self, Theme};

/// Render the active modal or action panel on top of the frame.
pub fn render_modal(frame: &mut Frame, app: &App, area: Rect) {
    let Some(modal) = &app.modal else {
        return;
    };
    let theme = theme::current();

    match modal {
        Modal::EditTitle { target, edit } => {
            let title = match target {
                TitleTarget::Item(_) => "edit title",
                TitleTarget::NewItem { .. } => "new item",
                TitleTarget::NewProject => "new project",
                TitleTarget::NewOutline { .. } => "new outline",
            };
            render_line_editor(frame, &theme, area, title, edit, "Enter save  Esc cancel");
        }
        Modal::EditDescription { edit, .. } => {
            render_text_editor(frame, &theme, area, "edit description", edit);
        }
        Modal::AddComment { edit, .. } => {
            render_text_editor(frame, &theme, area, "add comment", edit);
        }
        Modal::ReplyComment { edit, .. } => {
            render_text_editor(frame, &theme, area, "reply", edit);
        }
        Modal::ViewEntry { title, body } => {
            let popup = super::helpers::centered_rect(70, 70, area);
            frame.render_widget(Clear, popup);
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(theme.dim_style())
                .title(Span::styled(format!(" {title} "), theme.accent_style()));
            let paragraph = Paragraph::new(body.clone())
                .style(theme.base())
                .wrap(Wrap { trim: false })
                .block(block);
            frame.render_widget(paragraph, popup);
        }
        Modal::PickStatus { pick, .. } => render_picker(frame, &theme, area, "set status", pick),
        Modal::PickAssignee { pick, .. } => {
            render_picker(frame, &theme, area, "assign", pick);
        }
        Modal::PickTargets { pick, .. } => {
            render_picker(frame, &theme, area, "attachments", pick);
        }
        Modal::ConfirmArchive { item_id } => {
            let title = app
                .ws
                .snapshot
                .item(item_id)
                .map(|i| i.title.clone())
                .unwrap_or_default();
            render_confirm(
                frame,
                &theme,
                area,
                "archive",
                &format!("Archive \"{title}\" and its subtree?"),
            );
        }
        Modal::ConfirmExit => {
            render_confirm(
                frame,
                &theme,
                area,
                "quit",
                "Discard the capture draft and quit?",
            );
        }
        Modal::ActionPanel { stack } => {
            if let Some(kind) = stack.last() {
                render_panel(frame, app, &theme, area, *kind);
            }
        }
    }
}

fn render_line_editor(
    frame: &mut Frame,
    theme: &Theme,
    area: Rect,
    title: &str,
    edit: &EditState,
    hint: &str,
) {
    let popup = super::helpers::centered_rect(60, 20, area);
    frame.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.accent_style())
        .title(Span::styled(format!(" {title} "), theme.accent_style()));

    let (before, after) = edit.buffer.split_at(edit.cursor);
    let lines = vec![
        Line::from(vec![
            Span::styled(before.to_string(), Style::default().fg(theme.text_bright)),
            Span::styled("\u{258C}", theme.accent_style()),
            Span::styled(after.to_string(), Style::default().fg(theme.text_bright)),
        ]),
        Line::from(Span::styled(hint.to_string(), theme.dim_style())),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn render_text_editor(frame: &mut Frame, theme: &Theme, area: Rect, title: &str, edit: &EditState) {
    let popup = super::helpers::centered_rect(70, 60, area);
    frame.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.accent_style())
        .title(Span::styled(format!(" {title} "), theme.accent_style()));

    let (before, after) = edit.buffer.split_at(edit.cursor);
    let mut text = String::with_capacity(edit.buffer.len() + 4);
    text.push_str(before);
    text.push('\u{258C}');
    text.push_str(after);
    text.push_str("\n\nCtrl+S save  Esc cancel");
    let paragraph = Paragraph::new(text)
        .style(theme.base())
        .wrap(Wrap { trim: false })
        .block(block);
    frame.render_widget(paragraph, popup);
}

fn render_picker(frame: &mut Frame, theme: &Theme, area: Rect, title: &str, pick: &PickState) {
    let popup = super::helpers::centered_rect(40, 50, area);
    frame.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.accent_style())
        .title(Span::styled(format!(" {title} "), theme.accent_style()));

    let lines: Vec<Line> = pick
        .options
        .iter()
        .enumerate()
        .map(|(i, (_, label))| {
            let style = if i == pick.cursor {
                theme.selected()
            } else {
                theme.base()
            };
            Line::from(Span::styled(format!(" {label}"), style))
        })
        .collect();
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn render_confirm(frame: &mut Frame, theme: &Theme, area: Rect, title: &str, question: &str) {
    let popup = super::helpers::centered_rect(50, 20, area);
    frame.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.error))
        .title(Span::styled(format!(" {title} "), theme.accent_style()));
    let lines = vec![
        Line::from(Span::styled(question.to_string(), theme.base())),
        Line::from(Span::styled("y confirm  n cancel", theme.dim_style())),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }).block(block), popup);
}

/// The action panel: one line per key binding of the top panel.
fn render_panel(frame: &mut Frame, app: &App, theme: &Theme, area: Rect, kind: PanelKind) {
    let entries = actions::panel_actions(app, kind);
    let title = match kind {
        PanelKind::Context => "actions",
        PanelKind::Nav => "go",
        PanelKind::Agenda => "agenda",
        PanelKind::Capture => "capture",
    };

    let height = (entries.len() as u16 + 2).min(area.height);
    let width = 34u16.min(area.width);
    // Bottom-right anchored, like a hover menu
    let popup = Rect {
        x: area.x + area.width.saturating_sub(width),
        y: area.y + area.height.saturating_sub(height + 1),
        width,
        height,
    };
    frame.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.dim_style())
        .title(Span::styled(format!(" {title} "), theme.accent_style()));

    let lines: Vec<Line> = entries
        .iter()
        .map(|(key, action, label)| {
            let key_style = if is_mutating(*action) {
                Style::default()
                    .fg(theme.priority)
                    .add_modifier(Modifier::BOLD)
            } else {
                theme.accent_style().add_modifier(Modifier::BOLD)
            };
            Line::from(vec![
                Span::styled(format!(" {key}  "), key_style),
                Span::styled((*label).to_string(), theme.base()),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}
