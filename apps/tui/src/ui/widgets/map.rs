use crate::domain::Coordinates;
use crate::map::viewport::meters_to_degrees;
use crate::map::{Marker, Viewport};
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::symbols;
use ratatui::widgets::canvas::{Canvas, Circle, Line as CanvasLine};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

const GRID_LINES: u32 = 4;

/// Everything the map canvas needs for one frame.
pub struct MapView<'a> {
    pub title: &'a str,
    pub markers: &'a [Marker],
    pub center: Coordinates,
    pub selected: Option<usize>,
    pub pulse_radius_m: Option<f64>,
    /// Animation phase in radians, drives pulsing markers.
    pub phase: f64,
}

/// Scale applied to a pulsing marker at `phase`.
pub fn pulse_scale(phase: f64) -> f64 {
    0.3f64.mul_add(phase.sin(), 1.0)
}

pub fn render_marker_map(f: &mut Frame<'_>, area: Rect, view: &MapView<'_>) {
    let viewport = Viewport::fit(view.markers.iter().map(|marker| marker.position), view.center);
    let title = format!("{} ({} markers)", view.title, view.markers.len());

    let canvas = Canvas::default()
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .marker(symbols::Marker::Braille)
        .x_bounds(viewport.x_bounds())
        .y_bounds(viewport.y_bounds())
        .paint(|ctx| {
            for step in 1..GRID_LINES {
                let ratio = f64::from(step) / f64::from(GRID_LINES);
                let x = (viewport.east - viewport.west).mul_add(ratio, viewport.west);
                let y = (viewport.north - viewport.south).mul_add(ratio, viewport.south);
                ctx.draw(&CanvasLine {
                    x1: x,
                    y1: viewport.south,
                    x2: x,
                    y2: viewport.north,
                    color: Color::DarkGray,
                });
                ctx.draw(&CanvasLine {
                    x1: viewport.west,
                    y1: y,
                    x2: viewport.east,
                    y2: y,
                    color: Color::DarkGray,
                });
            }

            if let Some(meters) = view.pulse_radius_m {
                ctx.draw(&Circle {
                    x: view.center.longitude,
                    y: view.center.latitude,
                    radius: meters_to_degrees(meters),
                    color: Color::LightCyan,
                });
            }

            ctx.layer();

            for (index, marker) in view.markers.iter().enumerate() {
                let mut radius = viewport.marker_radius(marker.radius);
                if marker.pulsing {
                    radius *= pulse_scale(view.phase);
                }
                ctx.draw(&Circle {
                    x: marker.position.longitude,
                    y: marker.position.latitude,
                    radius,
                    color: marker.color,
                });
                if view.selected == Some(index) {
                    ctx.draw(&Circle {
                        x: marker.position.longitude,
                        y: marker.position.latitude,
                        radius: radius * 1.4,
                        color: Color::White,
                    });
                    ctx.print(
                        marker.position.longitude,
                        marker.position.latitude,
                        marker.label.clone(),
                    );
                }
            }
        });

    f.render_widget(canvas, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulse_scale_stays_within_bounds() {
        for step in 0..64 {
            let phase = f64::from(step) * std::f64::consts::PI / 16.0;
            let scale = pulse_scale(phase);
            assert!((0.7..=1.3).contains(&scale), "scale {scale} at {phase}");
        }
    }
}
