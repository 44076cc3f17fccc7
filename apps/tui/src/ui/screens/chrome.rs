//! Frame around every page: tabs, status line, shortcut hints and help.

use crate::app::{App, Page};
use crate::map::pulse::AnimationMode;
use crate::ui::widgets::popup::{centered_rect, ClearWidget};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Tabs, Wrap};
use ratatui::Frame;

pub fn build_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Page
            Constraint::Length(3), // Status area
            Constraint::Length(1), // Shortcuts hint
        ])
        .split(area.inner(Margin::new(1, 0)))
        .to_vec()
}

pub fn render_tabs(app: &App, f: &mut Frame<'_>, area: Rect) {
    let titles = Page::ALL
        .iter()
        .map(|page| TextLine::from(format!("{} {}", page.index() + 1, page.title())))
        .collect::<Vec<_>>();

    let tabs = Tabs::new(titles)
        .select(app.page.index())
        .block(
            Block::default()
                .title("== Civic Dashboard ==")
                .title_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    f.render_widget(tabs, area);
}

pub fn render_status_section(app: &App, f: &mut Frame<'_>, area: Rect) {
    let status_block = Block::default()
        .title(" Status ")
        .title_style(Style::default().fg(Color::Yellow))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let status_text = if app.status_message.is_empty() {
        Text::from(Span::styled(
            if app.animation_mode == AnimationMode::Paused {
                "Animation paused"
            } else {
                ""
            },
            Style::default().fg(Color::Gray),
        ))
    } else {
        let style = if app.status_message.starts_with("Error") {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Green)
        };

        Text::from(Span::styled(&app.status_message, style))
    };

    let status_paragraph = Paragraph::new(status_text)
        .block(status_block)
        .wrap(Wrap { trim: true });
    f.render_widget(status_paragraph, area);
}

pub fn render_shortcuts(app: &App, f: &mut Frame<'_>, area: Rect) {
    let shortcuts = shortcuts_line(&page_shortcuts(app));
    let shortcuts_paragraph = Paragraph::new(shortcuts).alignment(Alignment::Center);
    f.render_widget(shortcuts_paragraph, area);
}

/// Key hints for the current page and mode.
pub fn page_shortcuts(app: &App) -> Vec<(&'static str, &'static str)> {
    if app.is_busy() {
        return vec![("Esc", "Cancel"), ("q", "Quit")];
    }
    if app.editing {
        return vec![("Enter", "Submit"), ("Esc", "Stop editing")];
    }
    if app.search_active {
        return vec![("Enter", "Done"), ("Esc", "Clear search")];
    }

    let mut keys = vec![("F1", "Help"), ("Tab", "Next page")];
    match app.page {
        Page::Dashboard => keys.push(("i", "Describe complaint")),
        Page::Heatmap => {
            keys.push(("Up/Down", "Select"));
            keys.push(("Enter", "Recommend"));
            keys.push(("f", "Filter"));
        }
        Page::History => {
            keys.push(("/", "Search"));
            keys.push(("Up/Down", "Select"));
        }
        Page::Detect => {
            keys.push(("i", "Image path"));
            keys.push(("c", "Clear"));
        }
    }
    if app.page != Page::Detect {
        keys.push(("r", "Refresh"));
    }
    keys.push(("q", "Quit"));
    keys
}

fn shortcuts_line(keys: &[(&'static str, &'static str)]) -> TextLine<'static> {
    let mut spans = Vec::with_capacity(keys.len() * 2);
    for (index, (key, action)) in keys.iter().enumerate() {
        spans.push(Span::styled(
            *key,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
        let separator = if index + 1 == keys.len() { "" } else { " | " };
        spans.push(Span::styled(
            format!(": {action}{separator}"),
            Style::default().fg(Color::Gray),
        ));
    }
    TextLine::from(spans)
}

/// Blinking block cursor for text inputs.
pub fn cursor_char(editing: bool, animation_counter: f64) -> &'static str {
    if !editing {
        return "";
    }
    if (animation_counter * 2.0).sin() > 0.0 {
        "█"
    } else {
        " "
    }
}

pub fn input_line(current_input: &str, cursor: &str) -> TextLine<'static> {
    TextLine::from(Span::styled(
        format!("> {current_input}{cursor}"),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    ))
}

pub fn render_help_popup(f: &mut Frame<'_>, area: Rect) {
    let popup_area = centered_rect(70, 70, area);
    f.render_widget(ClearWidget, popup_area);

    let help_block = Block::default()
        .title("== Help & Keyboard Shortcuts ==")
        .title_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let help_paragraph = Paragraph::new(Text::from(build_help_lines()))
        .block(help_block)
        .wrap(Wrap { trim: true });

    f.render_widget(help_paragraph, popup_area);
}

fn help_key(key: &'static str, text: &'static str) -> TextLine<'static> {
    TextLine::from(vec![
        Span::styled(
            format!("  {key}"),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" - {text}")),
    ])
}

fn build_help_lines() -> Vec<TextLine<'static>> {
    vec![
        TextLine::from(vec![Span::styled(
            "Civic Dashboard",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )]),
        TextLine::from(""),
        TextLine::from(
            "Analyze complaints, watch hotspots and browse detection history from the terminal.",
        ),
        TextLine::from(""),
        TextLine::from(Span::styled(
            "Everywhere:",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        help_key("1-4 / Tab", "Switch page"),
        help_key("r", "Refresh the current page"),
        help_key("Space", "Pause/resume animations"),
        help_key("Esc", "Cancel a running request / close"),
        help_key("F1 / ?", "Toggle this help"),
        help_key("q", "Quit"),
        TextLine::from(""),
        TextLine::from(Span::styled(
            "Dashboard:",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        help_key("i / Enter", "Type a complaint, Enter to analyze"),
        TextLine::from(Span::styled(
            "Heatmap:",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        help_key("Up/Down", "Select a hotspot"),
        help_key("Enter", "Ask for a recommendation"),
        help_key("f", "Cycle urgency filter"),
        TextLine::from(Span::styled(
            "History:",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        help_key("/", "Fuzzy search"),
        TextLine::from(Span::styled(
            "Detect:",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        help_key("i / Enter", "Type an image path, Enter to upload"),
        help_key("c", "Clear the last result"),
    ]
}
