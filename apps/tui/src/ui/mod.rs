// UI module for civic-dash
// Handles all UI rendering functions

pub mod screens;
pub mod widgets;

use crate::app::{App, Page};
use ratatui::Frame;

pub fn ui(app: &App, f: &mut Frame<'_>) {
    let area = f.area();
    let layout = screens::chrome::build_layout(area);

    screens::chrome::render_tabs(app, f, layout[0]);
    match app.page {
        Page::Dashboard => screens::dashboard::render_dashboard(app, f, layout[1]),
        Page::Heatmap => screens::heatmap::render_heatmap(app, f, layout[1]),
        Page::History => screens::history::render_history(app, f, layout[1]),
        Page::Detect => screens::detect::render_detect(app, f, layout[1]),
    }
    screens::chrome::render_status_section(app, f, layout[2]);
    screens::chrome::render_shortcuts(app, f, layout[3]);

    if app.is_busy() {
        widgets::loading::render_loading_overlay(
            f,
            area,
            &app.status_message,
            app.animation_counter,
        );
    }

    if app.show_help {
        screens::chrome::render_help_popup(f, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::tests::client_for;
    use crate::app::AppActions;
    use crate::config::DEFAULT_CITY_CENTER;
    use crate::history::HistoryStore;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(ratatui::buffer::Cell::symbol)
            .collect()
    }

    #[tokio::test]
    async fn every_page_renders_without_data() -> Result<(), Box<dyn std::error::Error>> {
        let (actions, _outcomes) = AppActions::new(client_for("http://127.0.0.1:9")?);
        let mut app = App::new(actions, HistoryStore::in_memory(), DEFAULT_CITY_CENTER);
        let mut terminal = Terminal::new(TestBackend::new(140, 45))?;

        for page in Page::ALL {
            app.page = page;
            terminal.draw(|f| ui(&app, f))?;
            let text = buffer_text(&terminal);
            assert!(text.contains("Civic Dashboard"), "{page} is missing the tab bar");
        }
        Ok(())
    }

    #[tokio::test]
    async fn loading_overlay_is_drawn_while_busy() -> Result<(), Box<dyn std::error::Error>> {
        let (actions, _outcomes) = AppActions::new(client_for("http://127.0.0.1:9")?);
        let mut app = App::new(actions, HistoryStore::in_memory(), DEFAULT_CITY_CENTER);
        app.refresh();
        assert!(app.is_busy());

        let mut terminal = Terminal::new(TestBackend::new(140, 45))?;
        terminal.draw(|f| ui(&app, f))?;
        assert!(buffer_text(&terminal).contains("Esc to cancel"));
        Ok(())
    }
}
