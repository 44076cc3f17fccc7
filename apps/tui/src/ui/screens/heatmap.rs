use crate::app::App;
use crate::map::tiers::{hotspot_tier, urgency_color, SeverityTier, TIER_THRESHOLDS};
use crate::ui::widgets::map::{render_marker_map, MapView};
use crate::ui::widgets::popup::render_recommendation_popup;
use crate::ui::widgets::tables::{header_style, scroll_offset, selected_row_style, truncate};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;

pub fn render_heatmap(app: &App, f: &mut Frame<'_>, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Min(6),
            Constraint::Length(7),
        ])
        .split(columns[1]);

    render_marker_map(
        f,
        columns[0],
        &MapView {
            title: "Hotspots",
            markers: app.hotspot_layer.markers(),
            center: app.city_center,
            selected: (!app.hotspots.is_empty()).then_some(app.selected_hotspot),
            pulse_radius_m: None,
            phase: app.animation_counter,
        },
    );

    render_stats(app, f, right[0]);
    render_hotspot_table(app, f, right[1]);
    render_legend(f, right[2]);

    render_recommendation_popup(&app.popup, f, columns[0]);
}

fn render_stats(app: &App, f: &mut Frame<'_>, area: Rect) {
    let stats = app.heatmap_stats();
    let block = Block::default()
        .title(" Overview ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let value = |text: String, color: Color| {
        Span::styled(text, Style::default().fg(color).add_modifier(Modifier::BOLD))
    };
    let lines = vec![
        TextLine::from(vec![
            Span::styled("High priority areas: ", Style::default().fg(Color::Gray)),
            value(stats.high_priority.to_string(), Color::Red),
        ]),
        TextLine::from(vec![
            Span::styled("Total complaints:    ", Style::default().fg(Color::Gray)),
            value(stats.total_complaints.to_string(), Color::Yellow),
        ]),
        TextLine::from(vec![
            Span::styled("Areas monitored:     ", Style::default().fg(Color::Gray)),
            value(stats.areas.to_string(), Color::Green),
        ]),
        TextLine::from(vec![
            Span::styled("Urgency filter:      ", Style::default().fg(Color::Gray)),
            value(app.urgency_filter.label().to_string(), Color::Cyan),
        ]),
    ];

    f.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
}

fn render_hotspot_table(app: &App, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(" Hotspots ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    if app.hotspots.is_empty() {
        let paragraph = Paragraph::new("No hotspots found.")
            .block(block)
            .alignment(ratatui::layout::Alignment::Center);
        f.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("Area"),
        Cell::from("Count"),
        Cell::from("Urgency"),
    ])
    .style(header_style());

    let max_visible_rows = area.height.saturating_sub(3) as usize;
    let offset = scroll_offset(app.hotspots.len(), max_visible_rows, app.selected_hotspot);

    let rows = app
        .hotspots
        .iter()
        .enumerate()
        .skip(offset)
        .take(max_visible_rows)
        .map(|(index, hotspot)| {
            let style = if index == app.selected_hotspot {
                selected_row_style()
            } else {
                Style::default().fg(hotspot_tier(hotspot.count).color())
            };
            Row::new(vec![
                Cell::from(truncate(&hotspot.area, 24)),
                Cell::from(hotspot.count.to_string()),
                Cell::from(hotspot.avg_urgency.label())
                    .style(Style::default().fg(urgency_color(hotspot.avg_urgency))),
            ])
            .style(style)
        });

    let table = Table::new(
        rows,
        [
            Constraint::Min(12),
            Constraint::Length(6),
            Constraint::Length(9),
        ],
    )
    .header(header)
    .block(block);
    f.render_widget(table, area);
}

fn render_legend(f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(" Complaint Density ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let lines: Vec<TextLine<'_>> = TIER_THRESHOLDS
        .iter()
        .map(|(floor, tier)| {
            TextLine::from(vec![
                Span::styled("● ", Style::default().fg(tier.color())),
                Span::raw(format!("{:<8} {}", tier.label(), legend_range(*floor, *tier))),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
}

fn legend_range(floor: u32, tier: SeverityTier) -> String {
    let next_floor = TIER_THRESHOLDS
        .iter()
        .filter(|(_, other)| *other > tier)
        .map(|(other_floor, _)| *other_floor)
        .min();
    match next_floor {
        Some(next) => format!("{floor}-{}", next - 1),
        None => format!("{floor}+"),
    }
}
