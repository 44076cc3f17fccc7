use crate::app::input::screens::edit_text;
use crate::app::state::App;
use crossterm::event::KeyCode;

pub fn handle_history_input(app: &mut App, key: KeyCode) {
    if app.search_active {
        match key {
            KeyCode::Esc => app.clear_search(),
            KeyCode::Enter | KeyCode::Down => app.search_active = false,
            _ => {
                if edit_text(&mut app.search_query, key) {
                    app.apply_search_filter();
                }
            }
        }
        return;
    }

    let total = app.filtered_history.len();
    match key {
        KeyCode::Char('/') => app.search_active = true,
        KeyCode::Esc => app.clear_search(),
        KeyCode::Up => {
            app.selected_history = app.selected_history.saturating_sub(1);
        }
        KeyCode::Down => {
            if app.selected_history + 1 < total {
                app.selected_history += 1;
            }
        }
        KeyCode::PageUp => {
            app.selected_history = app.selected_history.saturating_sub(5);
        }
        KeyCode::PageDown => {
            app.selected_history = (app.selected_history + 5).min(total.saturating_sub(1));
        }
        KeyCode::Home => app.selected_history = 0,
        KeyCode::End => app.selected_history = total.saturating_sub(1),
        _ => {}
    }
}
