use crate::app::input::screens::edit_text;
use crate::app::state::App;
use crossterm::event::KeyCode;

pub fn handle_detect_input(app: &mut App, key: KeyCode) {
    if app.editing {
        match key {
            KeyCode::Esc => app.editing = false,
            KeyCode::Enter => {
                if !app.submit_detection() {
                    app.status_message = "Enter the path of an image".to_string();
                }
            }
            _ => {
                edit_text(&mut app.detect_input, key);
            }
        }
        return;
    }

    match key {
        KeyCode::Char('i') | KeyCode::Enter => app.editing = true,
        KeyCode::Char('c') => {
            app.detection = None;
            app.detect_input.clear();
        }
        _ => {}
    }
}
