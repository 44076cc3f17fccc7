use crate::app::App;
use crate::domain::{Category, Timeline};
use crate::map::tiers::category_color;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph,
};
use ratatui::Frame;

fn empty_panel(f: &mut Frame<'_>, area: Rect, title: &str, message: &str) {
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let paragraph = Paragraph::new(message.to_string())
        .block(block)
        .alignment(ratatui::layout::Alignment::Center);
    f.render_widget(paragraph, area);
}

/// Points for each timeline series, x being the day index.
#[allow(clippy::cast_precision_loss)]
pub fn timeline_points(timeline: &Timeline) -> Vec<(String, Vec<(f64, f64)>)> {
    timeline
        .series
        .iter()
        .map(|(name, counts)| {
            let points = counts
                .iter()
                .enumerate()
                .map(|(day, count)| (day as f64, *count as f64))
                .collect();
            (name.clone(), points)
        })
        .collect()
}

pub fn render_timeline_chart(app: &App, f: &mut Frame<'_>, area: Rect) {
    let title = "Incident Timeline";
    if app.timeline.is_empty() {
        empty_panel(f, area, title, "No timeline data");
        return;
    }

    let series = timeline_points(&app.timeline);
    let max_count = app
        .timeline
        .series
        .iter()
        .flat_map(|(_, counts)| counts.iter().copied())
        .max()
        .unwrap_or(0)
        .max(1);

    let datasets = series
        .iter()
        .map(|(name, points)| {
            Dataset::default()
                .name(name.clone())
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(category_color(&Category::parse(name))))
                .data(points)
        })
        .collect::<Vec<_>>();

    let labels = &app.timeline.labels;
    let x_labels = match (labels.first(), labels.last()) {
        (Some(first), Some(last)) if labels.len() > 1 => {
            vec![Span::raw(first.clone()), Span::raw(last.clone())]
        }
        (Some(first), _) => vec![Span::raw(first.clone())],
        _ => Vec::new(),
    };

    #[allow(clippy::cast_precision_loss)]
    let x_max = labels.len().saturating_sub(1).max(1) as f64;
    #[allow(clippy::cast_precision_loss)]
    let y_max = max_count as f64;

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title("Incidents")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, y_max])
                .labels(vec![Span::raw("0"), Span::raw(max_count.to_string())]),
        );

    f.render_widget(chart, area);
}

pub fn render_category_barchart(app: &App, f: &mut Frame<'_>, area: Rect) {
    let title = "Complaints by Category";
    let counts = app.category_counts();
    if counts.is_empty() {
        empty_panel(f, area, title, "No complaints available");
        return;
    }

    let bars: Vec<Bar<'_>> = counts
        .iter()
        .map(|(label, value)| {
            Bar::default()
                .value(*value)
                .label(TextLine::from(label.clone()))
                .style(Style::default().fg(category_color(&Category::parse(label))))
                .value_style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
        })
        .collect();

    let max_value = counts.iter().map(|(_, count)| *count).max().unwrap_or(0).max(1);

    let chart = BarChart::default()
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .data(BarGroup::default().bars(&bars))
        .max(max_value)
        .bar_gap(1)
        .bar_width(9);

    f.render_widget(chart, area);
}
