use crate::app::App;
use crate::domain::DetectionReport;
use crate::ui::screens::chrome::{cursor_char, input_line};
use crate::ui::widgets::tables::header_style;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;
use std::path::Path;

pub fn render_detect(app: &App, f: &mut Frame<'_>, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(6),
        ])
        .split(area);

    let border = if app.editing { Color::Green } else { Color::Gray };
    let input = Paragraph::new(input_line(
        &app.detect_input,
        cursor_char(app.editing, app.animation_counter),
    ))
    .block(
        Block::default()
            .title(" Image path ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(input, rows[0]);

    match &app.detection {
        Some((path, report)) => {
            render_summary(path, report, f, rows[1]);
            render_detections(report, f, rows[2]);
        }
        None => {
            let paragraph = Paragraph::new("Upload an image to run object detection.")
                .style(Style::default().fg(Color::Gray))
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(paragraph, rows[1]);
        }
    }
}

pub fn summary_text(path: &Path, report: &DetectionReport) -> String {
    let size = match (report.width, report.height) {
        (Some(width), Some(height)) => format!(" ({width}x{height})"),
        _ => String::new(),
    };
    let rendered = if report.rendered_image.is_some() {
        ", annotated image returned"
    } else {
        ""
    };
    format!(
        "{}{size}: {} objects{rendered}",
        path.display(),
        report.detections.len()
    )
}

fn render_summary(path: &Path, report: &DetectionReport, f: &mut Frame<'_>, area: Rect) {
    let paragraph = Paragraph::new(summary_text(path, report)).block(
        Block::default()
            .title(" Result ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(paragraph, area);
}

fn render_detections(report: &DetectionReport, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(" Detections ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let header = Row::new(vec![
        Cell::from("Class"),
        Cell::from("Confidence"),
        Cell::from("Center"),
        Cell::from("Size"),
    ])
    .style(header_style());

    let rows = report.detections.iter().map(|detection| {
        let color = if detection.confidence >= 0.5 {
            Color::Green
        } else {
            Color::Yellow
        };
        Row::new(vec![
            Cell::from(detection.class.clone()),
            Cell::from(format!("{:.1}%", detection.confidence * 100.0))
                .style(Style::default().fg(color)),
            Cell::from(format!("{:.0}, {:.0}", detection.x, detection.y)),
            Cell::from(format!("{:.0}x{:.0}", detection.width, detection.height)),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Min(12),
            Constraint::Length(11),
            Constraint::Length(12),
            Constraint::Length(12),
        ],
    )
    .header(header)
    .block(block);
    f.render_widget(table, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_mentions_size_when_known() {
        let report = DetectionReport {
            detections: Vec::new(),
            rendered_image: Some("base64".to_string()),
            width: Some(640),
            height: Some(480),
        };
        assert_eq!(
            summary_text(Path::new("road.jpg"), &report),
            "road.jpg (640x480): 0 objects, annotated image returned"
        );
    }
}
