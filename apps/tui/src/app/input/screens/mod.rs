use crate::app::page::Page;
use crate::app::state::App;
use crossterm::event::KeyCode;

mod dashboard;
mod detect;
mod heatmap;
mod history;

pub fn dispatch_input(app: &mut App, key: KeyCode) {
    let capturing_text = app.editing || app.search_active;
    if handle_help_keys(app, key, capturing_text) {
        return;
    }

    // Only cancelling or quitting gets through the loading overlay
    if app.is_busy() {
        match key {
            KeyCode::Esc => app.cancel_load(),
            KeyCode::Char('q') => app.running = false,
            _ => {}
        }
        return;
    }

    if !capturing_text && handle_global_input(app, key) {
        return;
    }

    match app.page {
        Page::Dashboard => dashboard::handle_dashboard_input(app, key),
        Page::Heatmap => heatmap::handle_heatmap_input(app, key),
        Page::History => history::handle_history_input(app, key),
        Page::Detect => detect::handle_detect_input(app, key),
    }
}

/// F1 always toggles the help popup; `?` only does when it would not be typed
/// into an input. While the popup is open it takes every key.
fn handle_help_keys(app: &mut App, key: KeyCode, capturing_text: bool) -> bool {
    let toggle = key == KeyCode::F(1) || (key == KeyCode::Char('?') && !capturing_text);
    if toggle {
        app.show_help = !app.show_help;
        return true;
    }
    if app.show_help {
        if key == KeyCode::Esc {
            app.show_help = false;
        }
        return true;
    }
    false
}

fn handle_global_input(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Char('q') => app.running = false,
        KeyCode::Char(' ') => app.toggle_animation_pause(),
        KeyCode::Tab => app.next_page(),
        KeyCode::BackTab => app.previous_page(),
        KeyCode::Char('r') => app.refresh(),
        KeyCode::Char(digit @ '1'..='4') => {
            let index = digit as usize - '1' as usize;
            if let Some(page) = Page::from_index(index) {
                app.open_page(page);
            }
        }
        _ => return false,
    }
    true
}

/// Line editing shared by the text inputs. Returns `true` when the key was
/// consumed.
fn edit_text(buffer: &mut String, key: KeyCode) -> bool {
    match key {
        KeyCode::Char(ch) => buffer.push(ch),
        KeyCode::Backspace => {
            buffer.pop();
        }
        _ => return false,
    }
    true
}
