use crate::app::input::screens::edit_text;
use crate::app::state::App;
use crossterm::event::KeyCode;

pub fn handle_dashboard_input(app: &mut App, key: KeyCode) {
    if app.editing {
        match key {
            KeyCode::Esc => app.editing = false,
            KeyCode::Enter => {
                if !app.submit_analysis() {
                    app.status_message = "Describe the complaint first".to_string();
                }
            }
            _ => {
                edit_text(&mut app.analysis_input, key);
            }
        }
        return;
    }

    if matches!(key, KeyCode::Char('i') | KeyCode::Enter) {
        app.editing = true;
    }
}
