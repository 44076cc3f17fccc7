use crate::map::{PopupContent, RecommendationPopup};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::Buffer;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Widget, Wrap};
use ratatui::Frame;

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

pub struct ClearWidget;

impl Widget for ClearWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        ratatui::widgets::Clear.render(area, buf);
    }
}

/// Recommendation for the selected hotspot, drawn over the heatmap.
pub fn render_recommendation_popup(popup: &RecommendationPopup, f: &mut Frame<'_>, area: Rect) {
    let (Some(subject), Some(content)) = (popup.subject(), popup.content()) else {
        return;
    };

    let popup_area = centered_rect(60, 50, area);
    f.render_widget(ClearWidget, popup_area);

    let (body, color) = match content {
        PopupContent::Loading => ("Fetching recommendation...".to_string(), Color::Gray),
        PopupContent::Ready(text) => (text.clone(), Color::White),
        PopupContent::Failed(error) => (format!("Error: {error}"), Color::Red),
    };

    let lines = vec![
        TextLine::from(Span::styled(
            "Recommended action",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        TextLine::from(""),
        TextLine::from(Span::styled(body, Style::default().fg(color))),
        TextLine::from(""),
        TextLine::from(Span::styled(
            "Esc to close, Enter to ask again",
            Style::default().fg(Color::Gray),
        )),
    ];

    let paragraph = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .title(format!(" {subject} "))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, popup_area);
}
