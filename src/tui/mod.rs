pub mod actions;
pub mod app;
pub mod glyphs;
pub mod input;
pub mod markdown;
pub mod render;
pub mod theme;

use std::io;
use std::path::Path;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::ops::pipeline::Workspace;
use crate::store::config::read_config;
use crate::store::lock::WorkspaceLock;
use crate::store::Store;

use app::App;

/// Run the interactive terminal application against the workspace at
/// `dir`. Holds the workspace lock for the whole session.
pub fn run(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let _lock = WorkspaceLock::acquire_default(dir)?;
    let store = Store::open(dir)?;
    let config = read_config(dir);

    theme::install(theme::detect(&config.appearance));
    glyphs::install(glyphs::detect(&config.appearance));

    let snapshot = store.load()?;
    let actor_id = resolve_actor(&snapshot)?;
    let ws = Workspace::open(store, actor_id)?;
    let mut app = App::new(ws, config);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// The acting identity: `CLARITY_ACTOR` names an actor id, otherwise
/// the first human in the workspace acts.
fn resolve_actor(snapshot: &crate::model::Snapshot) -> Result<String, Box<dyn std::error::Error>> {
    if let Ok(id) = std::env::var("CLARITY_ACTOR") {
        if snapshot.actor(&id).is_none() {
            return Err(format!("unknown actor id: {id}").into());
        }
        return Ok(id);
    }
    snapshot
        .actors
        .values()
        .find(|a| !a.is_agent())
        .map(|a| a.id.clone())
        .ok_or_else(|| "workspace has no human actor".into())
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
