use crate::app::App;
use crate::domain::HistoryEntry;
use crate::map::tiers::urgency_color;
use crate::ui::screens::chrome::{cursor_char, input_line};
use crate::ui::widgets::charts::{render_category_barchart, render_timeline_chart};
use crate::ui::widgets::map::{render_marker_map, MapView};
use crate::ui::widgets::tables::{header_style, truncate};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap};
use ratatui::Frame;

pub fn render_dashboard(app: &App, f: &mut Frame<'_>, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(8)])
        .split(columns[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(8),
            Constraint::Min(8),
            Constraint::Length(8),
        ])
        .split(columns[1]);

    render_marker_map(
        f,
        left[0],
        &MapView {
            title: "Complaints",
            markers: app.complaint_layer.markers(),
            center: app.city_center,
            selected: None,
            pulse_radius_m: Some(app.pulse_radius_m),
            phase: app.animation_counter,
        },
    );
    render_recent_history(app, f, left[1]);

    render_input(app, f, right[0]);
    render_last_analysis(app.last_analysis.as_ref(), f, right[1]);
    render_timeline_chart(app, f, right[2]);
    render_category_barchart(app, f, right[3]);
}

fn render_input(app: &App, f: &mut Frame<'_>, area: Rect) {
    let border = if app.editing { Color::Green } else { Color::Gray };
    let block = Block::default()
        .title(" Describe a complaint ")
        .title_style(Style::default().fg(border))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    let cursor = cursor_char(app.editing, app.animation_counter);
    let paragraph = Paragraph::new(input_line(&app.analysis_input, cursor)).block(block);
    f.render_widget(paragraph, area);
}

fn render_last_analysis(entry: Option<&HistoryEntry>, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(" Last Analysis ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let Some(entry) = entry else {
        let paragraph = Paragraph::new("Submit a complaint to see its analysis.")
            .style(Style::default().fg(Color::Gray))
            .block(block);
        f.render_widget(paragraph, area);
        return;
    };

    let result = &entry.result;
    let urgency = result.urgency();
    let mut lines = vec![
        TextLine::from(vec![
            Span::styled("Category: ", Style::default().fg(Color::Gray)),
            Span::styled(
                result.category().label(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled("  Urgency: ", Style::default().fg(Color::Gray)),
            Span::styled(
                urgency.map_or("-", |urgency| urgency.label()),
                Style::default().fg(urgency.map_or(Color::Gray, urgency_color)),
            ),
        ]),
        TextLine::from(Span::styled(
            entry.question.clone(),
            Style::default().fg(Color::White),
        )),
    ];
    if let Some(action) = &result.recommended_action {
        lines.push(TextLine::from(vec![
            Span::styled("Action: ", Style::default().fg(Color::Gray)),
            Span::styled(action.clone(), Style::default().fg(Color::Green)),
        ]));
    }
    if !result.retrieved.is_empty() {
        lines.push(TextLine::from(Span::styled(
            format!("{} similar complaints retrieved", result.retrieved.len()),
            Style::default().fg(Color::Gray),
        )));
    }

    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_recent_history(app: &App, f: &mut Frame<'_>, area: Rect) {
    let title = format!(
        " Recent Analyses ({}/{}) ",
        app.history.len(),
        crate::history::HISTORY_CAPACITY
    );
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if app.history.is_empty() {
        let paragraph = Paragraph::new("No analyses yet.")
            .style(Style::default().fg(Color::Gray))
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("When"),
        Cell::from("Category"),
        Cell::from("Urgency"),
        Cell::from("Complaint"),
    ])
    .style(header_style());

    let max_rows = area.height.saturating_sub(3) as usize;
    let rows = app.history.entries().iter().take(max_rows).map(|entry| {
        let urgency = entry.result.urgency();
        Row::new(vec![
            Cell::from(short_time(&entry.timestamp)),
            Cell::from(entry.result.category().label()),
            Cell::from(urgency.map_or("-", |urgency| urgency.label()))
                .style(Style::default().fg(urgency.map_or(Color::Gray, urgency_color))),
            Cell::from(truncate(&entry.question, 48)),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(12),
            Constraint::Length(9),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(block);
    f.render_widget(table, area);
}

/// `HH:MM` of an RFC 3339 timestamp, or the raw text if it does not parse.
pub fn short_time(timestamp: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(timestamp).map_or_else(
        |_| timestamp.to_string(),
        |time| time.with_timezone(&chrono::Local).format("%H:%M").to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_time_falls_back_to_raw_text() {
        assert_eq!(short_time("yesterday"), "yesterday");
        assert_eq!(short_time("2025-11-17T10:30:00Z").len(), 5);
    }
}
