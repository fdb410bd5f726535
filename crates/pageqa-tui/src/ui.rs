use pageqa_core::ChatRole;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{follow_up_hint, App, FocusPane, ServiceStatus};

/// Parse a line of text and render **bold** spans; everything else is literal
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("**") {
        let after_open = &rest[start + 2..];
        let Some(len) = after_open.find("**").filter(|len| *len > 0) else {
            break;
        };
        if start > 0 {
            spans.push(Span::raw(rest[..start].to_string()));
        }
        spans.push(Span::styled(
            after_open[..len].to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        rest = &after_open[len + 2..];
    }

    if !rest.is_empty() {
        spans.push(Span::raw(rest.to_string()));
    }

    Line::from(spans)
}

/// Slice of a single-line input that keeps the cursor visible.
/// Returns the visible text and the cursor column inside it.
fn visible_input(text: &str, cursor: usize, width: usize) -> (String, usize) {
    let scroll_offset = if width == 0 || cursor < width {
        0
    } else {
        cursor - width + 1
    };
    let visible = text.chars().skip(scroll_offset).take(width).collect();
    (visible, cursor - scroll_offset)
}

fn role_style(role: ChatRole) -> Style {
    let color = match role {
        ChatRole::User => Color::Cyan,
        ChatRole::Assistant => Color::Yellow,
        ChatRole::Error => Color::Red,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    let [sidebar_area, chat_column] =
        Layout::horizontal([Constraint::Percentage(30), Constraint::Percentage(70)])
            .areas(body_area);

    render_header(app, frame, header_area);
    render_sidebar(app, frame, sidebar_area);
    render_chat(app, frame, chat_column);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let status_color = match app.service_status {
        ServiceStatus::Checking => Color::Gray,
        ServiceStatus::Online => Color::Green,
        ServiceStatus::Offline => Color::Red,
    };

    let title = Line::from(vec![
        Span::styled(" Webpage Q&A ", Style::default().fg(Color::Cyan).bold()),
        Span::raw(" "),
        Span::styled(app.service_url.clone(), Style::default().fg(Color::White)),
        Span::raw(" "),
        Span::styled(
            format!("[{}]", app.service_status.label()),
            Style::default().fg(status_color),
        ),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_sidebar(app: &mut App, frame: &mut Frame, area: Rect) {
    let [url_area, suggestions_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(area);

    // URL input
    let url_focused = app.focus == FocusPane::Url;
    let url_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if url_focused {
            Color::Yellow
        } else {
            Color::DarkGray
        }))
        .title(" Website URL ");

    let inner_width = url_area.width.saturating_sub(2) as usize;
    let url = app.conversation.session().url();
    let url_widget = if url.is_empty() && !url_focused {
        Paragraph::new(Span::styled(
            "https://example.com",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let (visible, cursor_x) = visible_input(url, app.url_cursor, inner_width);
        if url_focused {
            frame.set_cursor_position((url_area.x + 1 + cursor_x as u16, url_area.y + 1));
        }
        Paragraph::new(visible)
    };
    frame.render_widget(url_widget.block(url_block), url_area);

    // General suggestions
    let suggestions_focused = app.focus == FocusPane::Suggestions;
    let suggestions_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if suggestions_focused {
            Color::Cyan
        } else {
            Color::DarkGray
        }))
        .title(" Suggested Questions ");

    let items: Vec<ListItem> = app
        .suggestions
        .general
        .iter()
        .map(|suggestion| ListItem::new(suggestion.label.clone()))
        .collect();

    let highlight = if suggestions_focused {
        Style::default()
            .bg(Color::Cyan)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    let list = List::new(items)
        .block(suggestions_block)
        .highlight_style(highlight)
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, suggestions_area, &mut app.suggestion_state);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(area);

    // Measure the wrapped transcript at the inner size, then follow new entries
    app.chat_area = Some(chat_area);
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);
    let chat = chat_paragraph(app);
    app.set_chat_line_count(chat.line_count(app.chat_width));
    app.follow_transcript();

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Conversation ");

    frame.render_widget(
        chat.block(chat_block).scroll((app.chat_scroll, 0)),
        chat_area,
    );

    render_question_input(app, frame, input_area);
}

/// Transcript, follow-up hints and the thinking indicator, wrapped but
/// without borders so its line count is the inner height.
fn chat_paragraph(app: &App) -> Paragraph<'static> {
    let pending = app.is_pending();
    let messages = app.conversation.transcript().snapshot();
    let chat_text = if messages.is_empty() && !pending {
        Text::from(Span::styled(
            "Enter a website URL, then ask a question about it...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let hint = follow_up_hint(&app.suggestions.follow_up);
        let mut lines: Vec<Line> = Vec::new();

        for message in messages {
            lines.push(Line::from(Span::styled(
                format!("{}:", message.role.label()),
                role_style(message.role),
            )));
            match message.role {
                ChatRole::User => {
                    lines.extend(message.content.lines().map(|l| Line::from(l.to_string())));
                }
                ChatRole::Assistant => {
                    lines.extend(message.content.lines().map(parse_markdown_line));
                    if !hint.is_empty() {
                        lines.push(Line::from(Span::styled(
                            hint.clone(),
                            Style::default().fg(Color::Blue),
                        )));
                    }
                }
                ChatRole::Error => {
                    lines.extend(message.content.lines().map(|l| {
                        Line::from(Span::styled(l.to_string(), Style::default().fg(Color::Red)))
                    }));
                }
            }
            lines.push(Line::default());
        }

        if pending {
            lines.push(Line::from(Span::styled(
                format!("{}:", ChatRole::Assistant.label()),
                role_style(ChatRole::Assistant),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Thinking{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    Paragraph::new(chat_text).wrap(Wrap { trim: true })
}

/// Terminal cursor for the question input; hidden while it is locked.
fn question_cursor_position(app: &App, area: Rect) -> Option<(u16, u16)> {
    if app.focus != FocusPane::Question || app.is_pending() {
        return None;
    }
    let inner_width = area.width.saturating_sub(2) as usize;
    let draft = app.conversation.session().draft_question();
    let (_, cursor_x) = visible_input(draft, app.question_cursor, inner_width);
    Some((area.x + 1 + cursor_x as u16, area.y + 1))
}

fn render_question_input(app: &App, frame: &mut Frame, area: Rect) {
    let pending = app.is_pending();
    let focused = app.focus == FocusPane::Question;

    let (title, border_color) = if pending {
        (" Processing... ", Color::DarkGray)
    } else if focused {
        (" Ask (Enter to send) ", Color::Yellow)
    } else {
        (" Ask ", Color::DarkGray)
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    let draft = app.conversation.session().draft_question();
    let inner_width = area.width.saturating_sub(2) as usize;

    let input = if draft.is_empty() && !pending {
        Paragraph::new(Span::styled(
            "Type your question...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let (visible, _) = visible_input(draft, app.question_cursor, inner_width);
        let style = if pending {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Cyan)
        };
        Paragraph::new(visible).style(style)
    };

    if let Some(position) = question_cursor_position(app, area) {
        frame.set_cursor_position(position);
    }
    frame.render_widget(input.block(input_block), area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_text = match app.focus {
        FocusPane::Url => " URL ",
        FocusPane::Question => " ASK ",
        FocusPane::Suggestions => " SUGGEST ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let focus_hints: &[(&str, &str)] = match app.focus {
        FocusPane::Url => &[("Enter", "to question")],
        FocusPane::Question => &[("Enter", "send")],
        FocusPane::Suggestions => &[("j/k", "select"), ("Enter", "use")],
    };
    let common_hints: &[(&str, &str)] = &[
        ("Tab", "focus"),
        ("PgUp/PgDn", "scroll"),
        ("Alt+n", "follow-up"),
        ("Esc", "quit"),
    ];

    let mut spans = vec![Span::styled(
        mode_text,
        Style::default().bg(Color::Blue).fg(Color::White),
    )];
    for (key, label) in focus_hints.iter().chain(common_hints) {
        spans.push(Span::styled(format!(" {key} "), key_style));
        spans.push(Span::styled(format!(" {label} "), label_style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
