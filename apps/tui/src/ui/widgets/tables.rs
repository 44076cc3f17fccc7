use ratatui::style::{Color, Modifier, Style};

pub const fn scroll_offset(
    total_rows: usize,
    max_visible_rows: usize,
    selected_index: usize,
) -> usize {
    if total_rows <= max_visible_rows {
        return 0;
    }

    if selected_index >= max_visible_rows {
        return selected_index.saturating_sub(max_visible_rows) + 1;
    }

    0
}

pub fn selected_row_style() -> Style {
    Style::default()
        .bg(Color::Rgb(0, 0, 238))
        .fg(Color::White)
        .add_modifier(Modifier::BOLD)
}

pub fn header_style() -> Style {
    Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

/// Cuts `text` to `width` characters, marking the cut with an ellipsis.
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{kept}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_keeps_selection_visible() {
        assert_eq!(scroll_offset(5, 10, 4), 0);
        assert_eq!(scroll_offset(30, 10, 3), 0);
        assert_eq!(scroll_offset(30, 10, 10), 1);
        assert_eq!(scroll_offset(30, 10, 29), 20);
    }

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("Station Road", 20), "Station Road");
        assert_eq!(truncate("Station Road", 8), "Station…");
    }
}
