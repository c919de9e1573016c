use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::model::task::Priority;
use crate::ops::forest;

use super::super::app::App;

/// Render the sidebar task tree
pub fn render_sidebar(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let title = Line::from(vec![Span::styled(
        " Tasks",
        Style::default()
            .fg(app.theme.text_bright)
            .add_modifier(Modifier::BOLD),
    )]);
    frame.render_widget(
        Paragraph::new(title).style(Style::default().bg(app.theme.background)),
        chunks[0],
    );

    let rows = app.visible_rows();
    let list_area = chunks[1];

    if rows.is_empty() {
        let empty = Paragraph::new(" no tasks — press a to add one")
            .style(Style::default().fg(app.theme.dim).bg(app.theme.background));
        frame.render_widget(empty, list_area);
        return;
    }

    // Clamp cursor and scroll to the visible window
    let visible_height = list_area.height as usize;
    app.cursor = app.cursor.min(rows.len() - 1);
    if app.cursor < app.scroll_offset {
        app.scroll_offset = app.cursor;
    } else if visible_height > 0 && app.cursor >= app.scroll_offset + visible_height {
        app.scroll_offset = app.cursor + 1 - visible_height;
    }

    let selected_id = app.store.selected_task_id().map(str::to_string);
    let end = rows.len().min(app.scroll_offset + visible_height.max(1));
    let mut lines: Vec<Line> = Vec::with_capacity(visible_height);

    for (row, row_idx) in rows[app.scroll_offset..end].iter().zip(app.scroll_offset..end) {
        let Some(task) = forest::find_task(app.store.tasks(), &row.id) else {
            continue;
        };
        let is_cursor = row_idx == app.cursor;
        let is_selected = selected_id.as_deref() == Some(row.id.as_str());

        let row_bg = if is_cursor {
            app.theme.selection_bg
        } else {
            app.theme.background
        };
        let base = Style::default().bg(row_bg);

        let mut spans: Vec<Span> = Vec::new();
        spans.push(Span::styled(" ", base));

        // Tree continuation lines for each ancestor level
        let mut prefix_width = 1usize;
        for last in &row.ancestor_last {
            let glyph = if *last { "   " } else { "│  " };
            spans.push(Span::styled(glyph, base.fg(app.theme.dim)));
            prefix_width += 3;
        }
        if row.depth > 0 {
            let glyph = if row.is_last_sibling { "└─ " } else { "├─ " };
            spans.push(Span::styled(glyph, base.fg(app.theme.dim)));
            prefix_width += 3;
        }

        // Expansion marker
        let marker = if row.has_children {
            if row.is_expanded { "▾ " } else { "▸ " }
        } else {
            "  "
        };
        spans.push(Span::styled(marker, base.fg(app.theme.dim)));
        prefix_width += 2;

        // Checkbox
        let checkbox = format!("[{}] ", task.completion_status.checkbox_char());
        spans.push(Span::styled(
            checkbox,
            base.fg(app.theme.status_color(task.completion_status)),
        ));
        prefix_width += 4;

        // Priority tag (only when it carries signal)
        let priority_tag = match task.priority {
            Priority::High => " !high",
            Priority::Urgent => " !urgent",
            _ => "",
        };

        // Title, truncated so the priority tag stays visible
        let avail = (list_area.width as usize)
            .saturating_sub(prefix_width + priority_tag.width());
        let title = truncate_to_width(&task.title, avail);
        let mut title_style = if task.completed {
            base.fg(app.theme.dim).add_modifier(Modifier::CROSSED_OUT)
        } else {
            base.fg(app.theme.text)
        };
        if is_selected {
            title_style = title_style
                .fg(app.theme.text_bright)
                .add_modifier(Modifier::BOLD);
        }
        spans.push(Span::styled(title, title_style));

        if !priority_tag.is_empty() {
            spans.push(Span::styled(
                priority_tag,
                base.fg(app.theme.priority_color(task.priority)),
            ));
        }

        // Pad the cursor row so the highlight spans the full width
        if is_cursor {
            let used: usize = spans.iter().map(|s| s.width()).sum();
            let pad = (list_area.width as usize).saturating_sub(used);
            spans.push(Span::styled(" ".repeat(pad), base));
        }

        lines.push(Line::from(spans));
    }

    let list = Paragraph::new(lines).style(Style::default().bg(app.theme.background));
    frame.render_widget(list, list_area);
}

/// Truncate to a display width, appending an ellipsis when cut
fn truncate_to_width(s: &str, width: usize) -> String {
    if s.width() <= width {
        return s.to_string();
    }
    let mut out = String::new();
    let mut used = 0usize;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}
