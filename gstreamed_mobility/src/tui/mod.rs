pub mod app;
pub mod ui;

use std::io;
use std::path::Path;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use mobility_common::config::AnalysisConfig;
use ratatui::{backend::CrosstermBackend, Terminal};

use app::{EditorApp, Mode};

/// Interactive terminal editor for the arena zones of a config file.
pub fn run_zone_editor(config_path: &Path, frame_dims: Option<(u32, u32)>) -> Result<()> {
    // A missing config is fine here, the editor is how one gets created.
    let config = if config_path.exists() {
        AnalysisConfig::load(config_path)?
    } else {
        log::info!("Config {config_path:?} not found, starting empty");
        AnalysisConfig::default()
    };
    let mut app = EditorApp::new(config, config_path.to_path_buf(), frame_dims);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_editor_loop(&mut terminal, &mut app);

    // Cleanup terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_editor_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut EditorApp,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match app.mode {
                        Mode::Rename { .. } => handle_rename_key(app, key.code),
                        Mode::Browse => handle_browse_key(app, key.code, key.modifiers)?,
                    }
                }
            }
        }

        if app.should_quit() {
            break;
        }

        // Small sleep to prevent busy-waiting
        thread::sleep(Duration::from_millis(5));
    }

    Ok(())
}

fn handle_rename_key(app: &mut EditorApp, code: KeyCode) {
    match code {
        KeyCode::Enter => app.rename_commit(),
        KeyCode::Esc => app.rename_cancel(),
        KeyCode::Backspace => app.rename_backspace(),
        KeyCode::Char(c) => app.rename_push(c),
        _ => {}
    }
}

fn handle_browse_key(app: &mut EditorApp, code: KeyCode, modifiers: KeyModifiers) -> Result<()> {
    let step = if modifiers.contains(KeyModifiers::SHIFT) {
        10
    } else {
        1
    };
    match code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => app.quit(),
        KeyCode::Up => app.select_prev(),
        KeyCode::Down => app.select_next(),
        KeyCode::Tab => app.next_field(),
        KeyCode::BackTab => app.prev_field(),
        KeyCode::Left | KeyCode::Char('-') => app.nudge(-step),
        KeyCode::Right | KeyCode::Char('+') | KeyCode::Char('=') => app.nudge(step),
        KeyCode::Char('a') | KeyCode::Char('A') => app.add_zone(),
        KeyCode::Char('d') | KeyCode::Char('D') => app.delete_zone(),
        KeyCode::Char('r') | KeyCode::Char('R') => app.begin_rename(),
        KeyCode::Char('s') | KeyCode::Char('S') => {
            if let Err(err) = app.save() {
                app.status = format!("Save failed: {err}");
                log::error!("Failed to save config: {err:?}");
            }
        }
        _ => {}
    }
    Ok(())
}
