use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::ops::pipeline::{Mutation, Position};
use crate::tui::app::{App, View};

/// Keys in the quick-capture view. All printables go into the draft;
/// Ctrl+S files the item into the capture outline and clears the form.
pub fn handle(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('s') if key.modifiers == KeyModifiers::CONTROL => submit(app),
        KeyCode::Tab | KeyCode::BackTab => {
            app.capture.in_description = !app.capture.in_description;
        }
        KeyCode::Enter => {
            if app.capture.in_description {
                app.capture.description.push('\n');
            } else {
                app.capture.in_description = true;
            }
        }
        KeyCode::Backspace => {
            let field = if app.capture.in_description {
                &mut app.capture.description
            } else {
                &mut app.capture.title
            };
            field.pop();
        }
        KeyCode::Char(c) if super::plain(&key) => {
            if app.capture.in_description {
                app.capture.description.push(c);
            } else {
                app.capture.title.push(c);
            }
        }
        KeyCode::Esc => {
            // The draft is kept; quitting with a non-empty draft asks first
            app.view = View::ProjectList;
        }
        _ => {}
    }
}

fn submit(app: &mut App) {
    if app.capture.title.trim().is_empty() {
        app.notify("title is empty");
        return;
    }
    let Some(outline_id) = app.capture_outline() else {
        app.notify("no outline to capture into");
        return;
    };
    let title = app.capture.title.trim().to_string();
    let description = app.capture.description.trim().to_string();
    if app
        .mutate(Mutation::CreateItem {
            outline_id,
            parent_id: None,
            title,
            description,
            position: Position::End,
        })
        .is_some()
    {
        app.capture = Default::default();
        app.notify("captured");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::app::tests::{seed_outline, test_app};
    use crate::tui::input::{ctrl, handle_key, press, press_char};
    use tempfile::TempDir;

    #[test]
    fn typing_fills_draft_and_ctrl_s_files_item() {
        let tmp = TempDir::new().unwrap();
        let mut app = test_app(&tmp);
        seed_outline(&mut app);
        app.view = View::Capture;

        for c in "quick note".chars() {
            handle_key(&mut app, press_char(c));
        }
        handle_key(&mut app, press(KeyCode::Enter));
        for c in "details".chars() {
            handle_key(&mut app, press_char(c));
        }
        assert_eq!(app.capture.title, "quick note");
        assert_eq!(app.capture.description, "details");

        handle_key(&mut app, ctrl('s'));
        assert!(app.capture.is_empty());
        assert!(app.minibuffer.as_deref().unwrap().contains("captured"));
        let item = app
            .ws
            .snapshot
            .items
            .values()
            .find(|i| i.title == "quick note")
            .unwrap();
        assert_eq!(item.description, "details");
    }

    #[test]
    fn quit_with_dirty_draft_asks_for_confirmation() {
        let tmp = TempDir::new().unwrap();
        let mut app = test_app(&tmp);
        seed_outline(&mut app);
        app.view = View::Capture;
        for c in "wip".chars() {
            handle_key(&mut app, press_char(c));
        }
        // 'q' is draft text here, not the quit hotkey
        handle_key(&mut app, press_char('q'));
        assert_eq!(app.capture.title, "wipq");
        assert!(!app.should_quit);

        app.request_quit();
        assert!(!app.should_quit);
        assert!(matches!(
            app.modal,
            Some(crate::tui::app::Modal::ConfirmExit)
        ));
    }
}
