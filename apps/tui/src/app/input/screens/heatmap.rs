use crate::app::input::helpers::{wrap_decrement, wrap_increment};
use crate::app::state::App;
use crossterm::event::KeyCode;

pub fn handle_heatmap_input(app: &mut App, key: KeyCode) {
    let total = app.hotspots.len();

    match key {
        KeyCode::Up => {
            app.selected_hotspot = wrap_decrement(app.selected_hotspot, total);
        }
        KeyCode::Down => {
            app.selected_hotspot = wrap_increment(app.selected_hotspot, total);
        }
        KeyCode::Home => app.selected_hotspot = 0,
        KeyCode::End => app.selected_hotspot = total.saturating_sub(1),
        KeyCode::Enter => {
            app.request_recommendation();
        }
        KeyCode::Char('f') => app.cycle_urgency_filter(),
        KeyCode::Esc => app.popup.close(),
        _ => {}
    }
}
