//! Single-line text field: key mapping and rendering for `tui_input::Input`.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::Rect,
    widgets::{Block, BorderType, Borders, Paragraph},
};
use tui_input::{Input, InputRequest};

use crate::theme::Theme;

/// Editing request for `key`, if it edits text at all.
pub fn input_request(key: KeyEvent) -> Option<InputRequest> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    match key.code {
        KeyCode::Char('w') if ctrl => Some(InputRequest::DeletePrevWord),
        KeyCode::Char('u') if ctrl => Some(InputRequest::DeleteLine),
        KeyCode::Char(c) if !ctrl && !alt => Some(InputRequest::InsertChar(c)),
        KeyCode::Backspace => Some(InputRequest::DeletePrevChar),
        KeyCode::Delete => Some(InputRequest::DeleteNextChar),
        KeyCode::Left if ctrl => Some(InputRequest::GoToPrevWord),
        KeyCode::Right if ctrl => Some(InputRequest::GoToNextWord),
        KeyCode::Left => Some(InputRequest::GoToPrevChar),
        KeyCode::Right => Some(InputRequest::GoToNextChar),
        KeyCode::Home => Some(InputRequest::GoToStart),
        KeyCode::End => Some(InputRequest::GoToEnd),
        _ => None,
    }
}

/// Apply `key` to `input`. Returns the new value when the text changed.
pub fn edit(input: &mut Input, key: KeyEvent) -> Option<String> {
    let request = input_request(key)?;
    let changed = input.handle(request)?;
    changed.value.then(|| input.value().to_owned())
}

/// Insert pasted text at the cursor. Lines are trimmed and joined with
/// `line_sep`; other control characters are dropped. Returns the new value
/// when the text changed.
pub fn paste(input: &mut Input, text: &str, line_sep: &str) -> Option<String> {
    let joined = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(line_sep);

    let mut changed = false;
    for c in joined.chars().filter(|c| !c.is_control()) {
        changed |= input
            .handle(InputRequest::InsertChar(c))
            .is_some_and(|state| state.value);
    }
    changed.then(|| input.value().to_owned())
}

/// Bordered field; places the terminal cursor when focused.
pub fn render_input(
    frame: &mut Frame,
    area: Rect,
    input: &Input,
    title: &str,
    focused: bool,
    theme: &Theme,
) {
    let block = Block::default()
        .title(format!(" {title} "))
        .title_style(theme.title())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme.border(focused));
    let inner = block.inner(area);

    let width = usize::from(inner.width.max(1)).saturating_sub(1);
    let scroll = input.visual_scroll(width);
    let scroll_cols = u16::try_from(scroll).unwrap_or(u16::MAX);

    frame.render_widget(
        Paragraph::new(input.value())
            .style(theme.text())
            .scroll((0, scroll_cols))
            .block(block),
        area,
    );

    if focused {
        let offset = input.visual_cursor().saturating_sub(scroll);
        let x = inner
            .x
            .saturating_add(u16::try_from(offset).unwrap_or(u16::MAX))
            .min(inner.right().saturating_sub(1));
        frame.set_cursor_position((x, inner.y));
    }
}
