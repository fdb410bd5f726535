use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{App, FocusPane};
use crate::tui::AppEvent;

/// Lines moved per PageUp/PageDown or wheel notch.
const PAGE_LINES: u16 = 5;
const WHEEL_LINES: u16 = 3;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Paste(text) => handle_paste(app, &text),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any pane
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    if key.modifiers.contains(KeyModifiers::ALT) {
        if let KeyCode::Char(c) = key.code {
            if let Some(n) = c.to_digit(10).filter(|n| *n > 0) {
                app.apply_follow_up(n as usize - 1);
            }
            return;
        }
    }

    match key.code {
        KeyCode::Esc => {
            app.quit();
            return;
        }
        KeyCode::Tab => {
            app.focus = app.focus.next();
            return;
        }
        KeyCode::BackTab => {
            app.focus = app.focus.prev();
            return;
        }
        KeyCode::PageUp => {
            app.scroll_chat_up(PAGE_LINES);
            return;
        }
        KeyCode::PageDown => {
            app.scroll_chat_down(PAGE_LINES);
            return;
        }
        _ => {}
    }

    match app.focus {
        FocusPane::Url => handle_url_key(app, key),
        FocusPane::Question => handle_question_key(app, key),
        FocusPane::Suggestions => handle_suggestions_key(app, key),
    }
}

fn handle_url_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Enter {
        app.focus = FocusPane::Question;
        return;
    }
    edit_text(app.conversation.url_mut(), &mut app.url_cursor, key);
}

fn handle_question_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Enter {
        app.submit_question();
        return;
    }
    // The question input is locked while a request is outstanding
    if app.is_pending() {
        return;
    }
    edit_text(
        app.conversation.draft_question_mut(),
        &mut app.question_cursor,
        key,
    );
}

fn handle_suggestions_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.suggestion_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.suggestion_nav_up(),
        KeyCode::Enter | KeyCode::Char(' ') => app.apply_selected_suggestion(),
        _ => {}
    }
}

/// Single-line editing with a character cursor.
fn edit_text(text: &mut String, cursor: &mut usize, key: KeyEvent) {
    let char_count = text.chars().count();
    *cursor = (*cursor).min(char_count);

    match key.code {
        KeyCode::Backspace => {
            if *cursor > 0 {
                *cursor -= 1;
                let byte_pos = char_to_byte_index(text, *cursor);
                text.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            if *cursor < char_count {
                let byte_pos = char_to_byte_index(text, *cursor);
                text.remove(byte_pos);
            }
        }
        KeyCode::Left => *cursor = cursor.saturating_sub(1),
        KeyCode::Right => *cursor = (*cursor + 1).min(char_count),
        KeyCode::Home => *cursor = 0,
        KeyCode::End => *cursor = char_count,
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(text, *cursor);
            text.insert(byte_pos, c);
            *cursor += 1;
        }
        _ => {}
    }
}

fn insert_text(text: &mut String, cursor: &mut usize, pasted: &str) {
    *cursor = (*cursor).min(text.chars().count());
    // Both inputs are single-line
    let cleaned: String = pasted
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    let byte_pos = char_to_byte_index(text, *cursor);
    text.insert_str(byte_pos, &cleaned);
    *cursor += cleaned.chars().count();
}

fn handle_paste(app: &mut App, pasted: &str) {
    match app.focus {
        FocusPane::Url => insert_text(app.conversation.url_mut(), &mut app.url_cursor, pasted),
        FocusPane::Question if !app.is_pending() => insert_text(
            app.conversation.draft_question_mut(),
            &mut app.question_cursor,
            pasted,
        ),
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let in_chat = app
        .chat_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);
    if !in_chat {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_chat_down(WHEEL_LINES),
        MouseEventKind::ScrollUp => app.scroll_chat_up(WHEEL_LINES),
        _ => {}
    }
}
