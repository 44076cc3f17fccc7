use crate::ui::widgets::popup::{centered_rect, ClearWidget};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use throbber_widgets_tui::{Throbber, ThrobberState, WhichUse, BRAILLE_SIX};

/// Throbber frame for an animation phase in `[0, 2*PI)`.
pub fn throbber_step(phase: f64) -> i8 {
    #[allow(clippy::cast_possible_truncation)]
    let step = (phase * 4.0).floor().rem_euclid(f64::from(i8::MAX)) as i8;
    step
}

/// Full-screen blocking indicator shown while the current page is loading.
pub fn render_loading_overlay(f: &mut Frame<'_>, area: Rect, label: &str, phase: f64) {
    let popup_area = centered_rect(40, 20, area);
    f.render_widget(ClearWidget, popup_area);

    let block = Block::default()
        .title(" Please wait ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(popup_area);
    f.render_widget(block, popup_area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let mut state = ThrobberState::default();
    state.calc_step(throbber_step(phase));

    let throbber = Throbber::default()
        .label(label.to_string())
        .style(Style::default().fg(Color::White))
        .throbber_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .throbber_set(BRAILLE_SIX)
        .use_type(WhichUse::Spin);
    f.render_stateful_widget(throbber, rows[0], &mut state);

    let hint = Paragraph::new("Esc to cancel").style(Style::default().fg(Color::Gray));
    f.render_widget(hint, rows[1]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throbber_step_advances_with_phase() {
        assert_eq!(throbber_step(0.0), 0);
        assert!(throbber_step(1.0) < throbber_step(2.0));
        assert!(throbber_step(2.0 * std::f64::consts::PI) >= 0);
    }
}
