use crate::app::App;
use crate::domain::ServerHistoryItem;
use crate::map::tiers::{category_color, urgency_color};
use crate::ui::screens::chrome::cursor_char;
use crate::ui::widgets::tables::{header_style, scroll_offset, selected_row_style, truncate};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap};
use ratatui::Frame;

pub fn render_history(app: &App, f: &mut Frame<'_>, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(9),
        ])
        .split(area);

    render_search_bar(app, f, rows[0]);
    render_history_table(app, f, rows[1]);
    render_item_details(app.selected_history_item(), f, rows[2]);
}

fn render_search_bar(app: &App, f: &mut Frame<'_>, area: Rect) {
    let color = if app.search_active { Color::Green } else { Color::Gray };
    let block = Block::default()
        .title(" Search ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));

    let cursor = cursor_char(app.search_active, app.animation_counter);
    let line = if app.search_query.is_empty() && !app.search_active {
        TextLine::from(Span::styled(
            "Press / to search by category, area or date",
            Style::default().fg(Color::Gray),
        ))
    } else {
        TextLine::from(vec![
            Span::styled("/", Style::default().fg(Color::Yellow)),
            Span::raw(format!("{}{cursor}", app.search_query)),
            Span::styled(
                format!("  ({} of {})", app.filtered_history.len(), app.server_history.len()),
                Style::default().fg(Color::Gray),
            ),
        ])
    };

    f.render_widget(Paragraph::new(line).block(block), area);
}

fn render_history_table(app: &App, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(" Detection History ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    if app.filtered_history.is_empty() {
        let message = if app.server_history.is_empty() {
            "No detections recorded."
        } else {
            "No detections match the search."
        };
        let paragraph = Paragraph::new(message)
            .block(block)
            .alignment(ratatui::layout::Alignment::Center);
        f.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("ID"),
        Cell::from("Category"),
        Cell::from("Urgency"),
        Cell::from("Area"),
        Cell::from("Boxes"),
        Cell::from("Time"),
    ])
    .style(header_style());

    let max_visible_rows = area.height.saturating_sub(3) as usize;
    let offset = scroll_offset(
        app.filtered_history.len(),
        max_visible_rows,
        app.selected_history,
    );

    let rows = app
        .filtered_history
        .iter()
        .enumerate()
        .skip(offset)
        .take(max_visible_rows)
        .filter_map(|(position, index)| {
            let item = app.server_history.get(*index)?;
            let style = if position == app.selected_history {
                selected_row_style()
            } else {
                Style::default().fg(category_color(&item.category))
            };
            Some(
                Row::new(vec![
                    Cell::from(item.id.to_string()),
                    Cell::from(item.category.label()),
                    Cell::from(item.urgency.map_or("-", |urgency| urgency.label())),
                    Cell::from(truncate(&item.area, 24)),
                    Cell::from(item.yolo_boxes.len().to_string()),
                    Cell::from(truncate(&item.timestamp, 19)),
                ])
                .style(style),
            )
        });

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(12),
            Constraint::Length(9),
            Constraint::Min(12),
            Constraint::Length(6),
            Constraint::Length(20),
        ],
    )
    .header(header)
    .block(block);
    f.render_widget(table, area);
}

fn render_item_details(item: Option<&ServerHistoryItem>, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(" Details ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let Some(item) = item else {
        f.render_widget(block, area);
        return;
    };

    let mut lines = vec![TextLine::from(vec![
        Span::styled(
            item.category.label(),
            Style::default()
                .fg(category_color(&item.category))
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" in {}", item.area)),
        Span::styled(
            item.urgency
                .map_or_else(String::new, |urgency| format!("  [{urgency}]")),
            Style::default().fg(item.urgency.map_or(Color::Gray, urgency_color)),
        ),
    ])];

    if let Some(coordinates) = item.coordinates {
        lines.push(TextLine::from(Span::styled(
            format!("{:.4}, {:.4}", coordinates.latitude, coordinates.longitude),
            Style::default().fg(Color::Gray),
        )));
    }
    if let Some(image) = &item.image {
        lines.push(TextLine::from(Span::styled(
            format!("Image: {}", truncate(image, 60)),
            Style::default().fg(Color::Gray),
        )));
    }
    for detection in &item.yolo_boxes {
        lines.push(TextLine::from(format!(
            "  {} {:.0}% at ({:.0}, {:.0}) {:.0}x{:.0}",
            detection.class,
            detection.confidence * 100.0,
            detection.x,
            detection.y,
            detection.width,
            detection.height
        )));
    }

    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}
