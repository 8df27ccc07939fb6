//! TUI rendering - all UI drawing functions

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::alarm::required_sentence;
use crate::app::{Advisory, Screen};

use super::state::*;
use super::types::*;
use super::utils::centered_rect;

/// Main UI entry point - called from the main loop
pub fn ui(f: &mut Frame, app: &LocalApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Title
            Constraint::Min(10),    // Main content
            Constraint::Length(3),  // Status bar
        ])
        .split(f.area());

    let version = env!("CARGO_PKG_VERSION");
    let subtitle = match app.controller.screen() {
        Screen::Menu => "Tools",
        Screen::Tool => "Food Waste Preventer",
    };
    let title = Paragraph::new(format!(" leftovers v{} - {}", version, subtitle))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    match app.controller.screen() {
        Screen::Menu => render_menu(f, app, chunks[1]),
        Screen::Tool => render_tool(f, app, chunks[1]),
    }

    render_status_bar(f, app, chunks[2]);

    // Overlays, alarm last so nothing can cover it
    if let Some(advisory) = app.controller.advisory() {
        render_advisory(f, advisory);
    }
    if app.controller.overlay_visible() {
        render_alarm(f, app);
    }
}

fn render_menu(f: &mut Frame, app: &LocalApp, area: Rect) {
    let items: Vec<ListItem> = MENU_ITEMS
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let style = if i == app.menu_selected {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default()
            };
            ListItem::new(vec![
                Line::from(Span::styled(format!(" {} ", item.label()), style.add_modifier(Modifier::BOLD))),
                Line::from(Span::styled(format!("   {}", item.description()), Style::default().fg(Color::DarkGray))),
                Line::from(""),
            ])
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" Tools "));
    f.render_widget(list, area);
}

fn render_tool(f: &mut Frame, app: &LocalApp, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(4)])
        .split(area);

    render_form(f, app, chunks[0]);
    render_meals(f, app, chunks[1]);
}

fn render_form(f: &mut Frame, app: &LocalApp, area: Rect) {
    let field = |label: &str, value: &str, focused: bool| -> Line<'static> {
        let label_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let cursor = if focused { "_" } else { "" };
        Line::from(vec![
            Span::styled(format!(" {:<6}", label), label_style),
            Span::raw(format!("{}{}", value, cursor)),
        ])
    };

    let placeholder_time = if app.time_input.is_empty() && app.focus != FormField::Time {
        "HH:MM"
    } else {
        app.time_input.as_str()
    };

    let lines = vec![
        Line::from(""),
        field("Meal", &app.name_input, app.focus == FormField::Name),
        field("Time", placeholder_time, app.focus == FormField::Time),
        Line::from(Span::styled(" <Enter> add reminder", Style::default().fg(Color::DarkGray))),
    ];

    let border_style = if app.focus == FormField::List {
        Style::default()
    } else {
        Style::default().fg(Color::Cyan)
    };
    let form = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Add a meal ")
            .border_style(border_style),
    );
    f.render_widget(form, area);
}

fn render_meals(f: &mut Frame, app: &LocalApp, area: Rect) {
    let meals = app.controller.meals();
    let border_style = if app.focus == FormField::List {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Meals ({}) ", meals.len()))
        .border_style(border_style);

    if meals.is_empty() {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled("  No meals yet", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))),
            Line::from(""),
            Line::from("  Type a meal name and a time above, then press Enter."),
        ];
        f.render_widget(Paragraph::new(text).block(block), area);
        return;
    }

    let items: Vec<ListItem> = meals
        .iter()
        .map(|meal| {
            ListItem::new(Line::from(vec![
                Span::styled(format!(" {} ", meal.time_label()), Style::default().fg(Color::Green)),
                Span::raw(meal.name.clone()),
            ]))
        })
        .collect();

    let highlight = if app.focus == FormField::List {
        Style::default().fg(Color::Black).bg(Color::Cyan)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    let list = List::new(items).block(block).highlight_style(highlight);
    let mut state = ListState::default();
    state.select(Some(app.selected_meal.min(meals.len() - 1)));
    f.render_stateful_widget(list, area, &mut state);
}

fn render_status_bar(f: &mut Frame, app: &LocalApp, area: Rect) {
    let status = if let Some(ref msg) = app.status_message {
        msg.clone()
    } else {
        match app.controller.screen() {
            Screen::Menu => "Pick a tool".to_string(),
            Screen::Tool => format!("{} meals", app.controller.meals().len()),
        }
    };
    let help_hint = if app.controller.overlay_visible() {
        "<Enter> dismiss  <C-x> cancel alarm  <C-u> clear"
    } else {
        match (app.controller.screen(), app.focus) {
            (Screen::Menu, _) => "<j/k> navigate  <Enter> open  <q> quit",
            (Screen::Tool, FormField::List) => "<j/k> navigate  <d> cancel meal  <Tab> form  <Esc> menu",
            (Screen::Tool, _) => "<Tab> next field  <Enter> add  <Esc> menu",
        }
    };

    let status_line = Line::from(vec![
        Span::styled(format!(" {} ", status), Style::default().fg(Color::Cyan)),
        Span::raw(" ".repeat(area.width.saturating_sub(status.len() as u16 + help_hint.len() as u16 + 4) as usize)),
        Span::styled(help_hint, Style::default().fg(Color::DarkGray)),
        Span::raw(" "),
    ]);

    let status_bar = Paragraph::new(status_line).block(Block::default().borders(Borders::ALL));
    f.render_widget(status_bar, area);
}

fn render_advisory(f: &mut Frame, advisory: &Advisory) {
    let area = centered_rect(50, 25, f.area());
    f.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::raw(format!(" {} ", advisory.message()))),
        Line::from(""),
        Line::from(Span::styled(" Press any key to close ", Style::default().fg(Color::DarkGray))),
    ];

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(format!(" {} ", advisory.title())))
        .style(Style::default().bg(Color::Black));
    f.render_widget(widget, area);
}

fn render_alarm(f: &mut Frame, app: &LocalApp) {
    let session = match app.controller.alarm().session() {
        Some(session) => session,
        None => return,
    };
    let area = f.area();
    f.render_widget(Clear, area);

    let typed = app.controller.alarm().typed();
    let typed_style = if app.controller.alarm().can_unlock() {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(" TIME TO EAT ", Style::default().fg(Color::Black).bg(Color::Red).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(vec![
            Span::raw(" Your "),
            Span::styled(session.meal_name.clone(), Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw(" is waiting. Type this to continue:"),
        ]),
        Line::from(""),
        Line::from(Span::styled(format!(" {}", required_sentence(&session.meal_name)), Style::default().fg(Color::Cyan))),
        Line::from(""),
        Line::from(vec![Span::raw(" > "), Span::styled(format!("{}_", typed), typed_style)]),
        Line::from(""),
    ];
    if let Some(ref message) = app.alarm_message {
        lines.push(Line::from(Span::styled(format!(" {}", message), Style::default().fg(Color::Red))));
        lines.push(Line::from(""));
    }
    let queued = app.controller.alarm().queued();
    if queued > 0 {
        lines.push(Line::from(Span::styled(
            format!(" {} more reminder(s) waiting", queued),
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines.push(Line::from(Span::styled(
        " <Enter> I'll eat it   <Ctrl+X> stop reminding me about this meal",
        Style::default().fg(Color::DarkGray),
    )));

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Red)).title(" Alarm "))
        .style(Style::default().bg(Color::Black));
    f.render_widget(widget, area);
}
