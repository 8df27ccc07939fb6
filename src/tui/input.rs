//! TUI input handling - keyboard event handlers
//!
//! The alarm overlay is modal: while it is up every key goes to it.

use crossterm::event::{KeyCode, KeyModifiers};

use crate::app::Screen;
use crate::error::Result;
use crate::scheduler::NotificationService;
use crate::storage::KeyValueStore;
use crate::vibration::Vibrator;

use super::state::*;
use super::types::*;

/// Main key event dispatcher
pub fn handle_key_event<S: KeyValueStore, N: NotificationService, V: Vibrator>(
    app: &mut App<S, N, V>,
    key: KeyCode,
    modifiers: KeyModifiers,
) -> Result<()> {
    if app.controller.overlay_visible() {
        handle_alarm_input(app, key, modifiers);
        return Ok(());
    }
    if app.controller.advisory().is_some() {
        app.controller.dismiss_advisory();
        return Ok(());
    }
    match app.controller.screen() {
        Screen::Menu => handle_menu_input(app, key, modifiers),
        Screen::Tool => handle_tool_input(app, key, modifiers),
    }
    Ok(())
}

fn handle_alarm_input<S: KeyValueStore, N: NotificationService, V: Vibrator>(
    app: &mut App<S, N, V>,
    key: KeyCode,
    modifiers: KeyModifiers,
) {
    match key {
        KeyCode::Enter => app.dismiss_alarm(),
        KeyCode::Char('x') if modifiers.contains(KeyModifiers::CONTROL) => app.cancel_alarm(),
        KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => app.controller.clear_typed(),
        // Other chords, Ctrl+C included, neither type nor quit
        KeyCode::Char(_) if modifiers.contains(KeyModifiers::CONTROL) => {}
        KeyCode::Char(c) => {
            app.alarm_message = None;
            app.controller.type_char(c);
        }
        KeyCode::Backspace => app.controller.backspace(),
        _ => {}
    }
}

fn handle_menu_input<S: KeyValueStore, N: NotificationService, V: Vibrator>(
    app: &mut App<S, N, V>,
    key: KeyCode,
    modifiers: KeyModifiers,
) {
    match key {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => app.should_quit = true,
        KeyCode::Down | KeyCode::Char('j') => {
            app.menu_selected = (app.menu_selected + 1) % MENU_ITEMS.len();
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.menu_selected = (app.menu_selected + MENU_ITEMS.len() - 1) % MENU_ITEMS.len();
        }
        KeyCode::Enter => app.open_menu_item(),
        _ => {}
    }
}

fn handle_tool_input<S: KeyValueStore, N: NotificationService, V: Vibrator>(
    app: &mut App<S, N, V>,
    key: KeyCode,
    modifiers: KeyModifiers,
) {
    if key == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }
    match key {
        KeyCode::Esc => {
            app.status_message = None;
            app.controller.navigate(Screen::Menu);
        }
        KeyCode::Tab => app.focus = app.focus.next(),
        KeyCode::BackTab => app.focus = app.focus.prev(),
        _ => match app.focus {
            FormField::Name | FormField::Time => handle_form_input(app, key),
            FormField::List => handle_list_input(app, key),
        },
    }
}

fn handle_form_input<S: KeyValueStore, N: NotificationService, V: Vibrator>(
    app: &mut App<S, N, V>,
    key: KeyCode,
) {
    let buffer = match app.focus {
        FormField::Time => &mut app.time_input,
        _ => &mut app.name_input,
    };
    match key {
        KeyCode::Char(c) => buffer.push(c),
        KeyCode::Backspace => {
            buffer.pop();
        }
        KeyCode::Enter => {
            if app.focus == FormField::Name {
                app.focus = FormField::Time;
            } else {
                app.submit_meal();
            }
        }
        _ => {}
    }
}

fn handle_list_input<S: KeyValueStore, N: NotificationService, V: Vibrator>(
    app: &mut App<S, N, V>,
    key: KeyCode,
) {
    match key {
        KeyCode::Down | KeyCode::Char('j') => app.next_meal(),
        KeyCode::Up | KeyCode::Char('k') => app.prev_meal(),
        KeyCode::Char('d') | KeyCode::Delete => app.cancel_selected_meal(),
        KeyCode::Char('n') => app.focus = FormField::Name,
        KeyCode::Char('q') => app.should_quit = true,
        _ => {}
    }
}
