use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use super::super::app::App;
use super::super::form::{FormFocus, InputField};
use super::super::theme::Theme;
use super::centered_rect;

/// Render the add/edit task modal
pub fn render_task_form(frame: &mut Frame, app: &App, area: Rect) {
    let Some(form) = &app.form else {
        return;
    };

    let popup = centered_rect(56, 12, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.highlight))
        .title(Span::styled(
            format!(" {} ", form.title_label()),
            Style::default()
                .fg(app.theme.text_bright)
                .add_modifier(Modifier::BOLD),
        ))
        .style(Style::default().bg(app.theme.background));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::default());
    lines.push(input_line(
        "Title       ",
        &form.title,
        form.focus == FormFocus::Title,
        &app.theme,
    ));
    lines.push(Line::default());
    lines.push(input_line(
        "Description ",
        &form.description,
        form.focus == FormFocus::Description,
        &app.theme,
    ));
    lines.push(Line::default());
    lines.push(selector_line(
        "Priority    ",
        form.priority().label(),
        form.focus == FormFocus::Priority,
        &app.theme,
    ));
    lines.push(selector_line(
        "Status      ",
        form.status().label(),
        form.focus == FormFocus::Status,
        &app.theme,
    ));
    lines.push(Line::default());

    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            Style::default().fg(app.theme.red),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            " Enter save · Esc cancel · Tab next field",
            Style::default().fg(app.theme.dim),
        )));
    }

    frame.render_widget(
        Paragraph::new(lines).style(Style::default().bg(app.theme.background)),
        inner,
    );
}

fn label_style(focused: bool, theme: &Theme) -> Style {
    if focused {
        Style::default()
            .fg(theme.highlight)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.dim)
    }
}

/// A text input with a visible cursor when focused
fn input_line<'a>(
    label: &'a str,
    input: &'a InputField,
    focused: bool,
    theme: &Theme,
) -> Line<'a> {
    let mut spans = vec![
        Span::styled(" ", Style::default()),
        Span::styled(label, label_style(focused, theme)),
    ];

    if focused {
        let (before, rest) = input.value.split_at(input.cursor);
        let mut chars = rest.chars();
        let at = chars.next().map(|c| c.to_string()).unwrap_or_else(|| " ".to_string());
        let after: String = chars.collect();
        spans.push(Span::styled(before, Style::default().fg(theme.text_bright)));
        spans.push(Span::styled(
            at,
            Style::default()
                .fg(theme.background)
                .bg(theme.text_bright),
        ));
        spans.push(Span::styled(after, Style::default().fg(theme.text_bright)));
    } else {
        spans.push(Span::styled(
            input.value.as_str(),
            Style::default().fg(theme.text),
        ));
    }

    Line::from(spans)
}

/// A wrap-around selector rendered as `◂ value ▸`
fn selector_line<'a>(
    label: &'a str,
    value: &'a str,
    focused: bool,
    theme: &Theme,
) -> Line<'a> {
    let arrows = if focused { theme.highlight } else { theme.dim };
    Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(label, label_style(focused, theme)),
        Span::styled("◂ ", Style::default().fg(arrows)),
        Span::styled(
            value,
            Style::default().fg(if focused {
                theme.text_bright
            } else {
                theme.text
            }),
        ),
        Span::styled(" ▸", Style::default().fg(arrows)),
    ])
}
