//! Night City Hustler rendering: stats header with the hustle button, tabbed
//! upgrade / skill / achievement panels, toasts and the event log.

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::input::{is_narrow_layout, ClickState};
use crate::widgets::{ClickableList, TabBar};

use super::achievements::{Catalog, Family};
use super::actions::*;
use super::logic::{format_balance, format_number, skill_cost, upgrade_cost};
use super::state::{GameState, NotificationKind, SkillKind, Tab};

/// Rows scrolled by one tap on the scroll buttons.
pub const ACHIEVEMENT_PAGE: i32 = 10;

const NEON_PINK: Color = Color::Magenta;
const NEON_CYAN: Color = Color::Cyan;

/// Scrollable rows of the achievement panel: one header per family plus one
/// row per achievement.
pub fn achievement_line_count(catalog: &Catalog) -> usize {
    Family::all().len() + catalog.len()
}

pub fn render(
    state: &GameState,
    catalog: &Catalog,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    // Log panel on the right when wide enough
    let (main_area, log_area) = if area.width >= 80 {
        let h_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(area);
        (h_chunks[0], Some(h_chunks[1]))
    } else {
        (area, None)
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // stats + hustle
            Constraint::Length(3), // tab bar
            Constraint::Min(5),    // content
        ])
        .split(main_area);

    render_header(state, f, chunks[0], click_state);
    render_tab_bar(state, f, chunks[1], click_state);
    match state.tab {
        Tab::Upgrades => render_upgrades(state, f, chunks[2], click_state),
        Tab::Skills => render_skills(state, f, chunks[2], click_state),
        Tab::Achievements => render_achievements(state, catalog, f, chunks[2], click_state),
    }

    if let Some(log_area) = log_area {
        render_log(state, f, log_area);
    }

    render_notifications(state, f, area);
}

fn render_header(
    state: &GameState,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let eco = &state.economy;
    let mut cl = ClickableList::new();

    cl.push(Line::from(vec![
        Span::styled(" €$ ", Style::default().fg(Color::Yellow)),
        Span::styled(
            format_balance(eco.currency),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
    ]));
    cl.push(Line::from(vec![
        Span::styled(" Click ", Style::default().fg(Color::DarkGray)),
        Span::styled(format_number(eco.click_power), Style::default().fg(NEON_CYAN)),
        Span::styled("  Passive ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{}/s", format_number(eco.passive_income)),
            Style::default().fg(Color::Green),
        ),
    ]));

    // Floating "+N €$" texts rise above the button
    let inner_width = area.width.saturating_sub(2) as i32;
    let mut float_line = String::new();
    for t in &state.floating_texts {
        let col = (inner_width / 2 + t.col_offset as i32).max(0) as usize;
        if float_line.chars().count() < col {
            let pad = col - float_line.chars().count();
            float_line.push_str(&" ".repeat(pad));
        }
        float_line.push_str(&t.text);
        float_line.push(' ');
    }
    cl.push(Line::from(Span::styled(
        float_line,
        Style::default().fg(Color::Yellow),
    )));

    let button_style = if state.click_flash_ms > 0.0 {
        Style::default()
            .fg(Color::Black)
            .bg(NEON_PINK)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(NEON_PINK)
            .add_modifier(Modifier::BOLD)
    };
    let label = "[H] HUSTLE";
    let pad = (inner_width as usize).saturating_sub(label.len()) / 2;
    cl.push_clickable(Line::from(vec![Span::raw(" ".repeat(pad)), Span::styled(label, button_style)]), HUSTLE);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(NEON_PINK))
        .title(" Night City Hustler ");

    let mut cs = click_state.borrow_mut();
    cl.register_targets(area, &mut cs, 1, 1, 0);
    let widget = Paragraph::new(cl.into_lines()).block(block);
    f.render_widget(widget, area);
}

fn render_tab_bar(
    state: &GameState,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let tab_style = |tab: Tab| -> Style {
        if state.tab == tab {
            Style::default()
                .fg(Color::Black)
                .bg(NEON_CYAN)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        }
    };

    // Narrow screens get single-letter labels
    let (up, sk, ach) = if is_narrow_layout(area.width) {
        ("[U] Upg", "[S] Skl", "[A] Ach")
    } else {
        ("[U] Upgrades", "[S] Skills", "[A] Achievements")
    };

    let mut cs = click_state.borrow_mut();
    TabBar::new("│")
        .tab(up, tab_style(Tab::Upgrades), TAB_UPGRADES)
        .tab(sk, tab_style(Tab::Skills), TAB_SKILLS)
        .tab(ach, tab_style(Tab::Achievements), TAB_ACHIEVEMENTS)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .render(f, area, &mut cs);
}

fn render_upgrades(
    state: &GameState,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let flashing = state.affordability_flash_ms > 0.0;
    let mut cl = ClickableList::new();

    for (i, upgrade) in state.upgrades.iter().enumerate() {
        let cost = upgrade_cost(upgrade);
        let can_afford = state.economy.currency >= cost;
        let name_style = match (can_afford, flashing) {
            (true, true) => Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            (true, false) => Style::default().fg(Color::White),
            (false, _) => Style::default().fg(Color::DarkGray),
        };
        let cost_style = if can_afford {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Red)
        };

        let key = format!(" [{}] ", i + 1);
        let row = Line::from(vec![
            Span::styled(key, Style::default().fg(NEON_CYAN)),
            Span::styled(upgrade.def.name, name_style),
            Span::styled(
                format!(" x{}", upgrade.purchase_count),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(format!("  €$ {}", format_number(cost)), cost_style),
        ]);
        cl.push_clickable(row, BUY_UPGRADE_BASE + i as u16);
        cl.push(Line::from(Span::styled(
            format!("     {}", upgrade.def.description),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let border = if flashing { Color::Yellow } else { NEON_CYAN };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(" Upgrades ");

    let mut cs = click_state.borrow_mut();
    cl.register_targets(area, &mut cs, 1, 1, 0);
    f.render_widget(Paragraph::new(cl.into_lines()).block(block), area);
}

fn render_skills(
    state: &GameState,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let mut cl = ClickableList::new();

    for kind in SkillKind::all() {
        let level = state.skill_level(*kind);
        let cost = skill_cost(level);
        let can_afford = state.economy.currency >= cost;
        let cost_style = if can_afford {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Red)
        };

        let key = format!(" [{}] ", kind.index() + 1);
        let row = Line::from(vec![
            Span::styled(key, Style::default().fg(NEON_CYAN)),
            Span::styled(
                format!("{:<13}", kind.name()),
                Style::default().fg(Color::White),
            ),
            Span::styled(format!("Lv.{:<4}", level), Style::default().fg(NEON_PINK)),
            Span::styled(format!("€$ {}", format_number(cost)), cost_style),
        ]);
        cl.push_clickable(row, BUY_SKILL_BASE + kind.index() as u16);
        cl.push(Line::from(Span::styled(
            format!("     {}", kind.description()),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(NEON_CYAN))
        .title(" Skills ");

    let mut cs = click_state.borrow_mut();
    cl.register_targets(area, &mut cs, 1, 1, 0);
    f.render_widget(Paragraph::new(cl.into_lines()).block(block), area);
}

fn render_achievements(
    state: &GameState,
    catalog: &Catalog,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Achievements ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(1)])
        .split(inner);

    // Fixed header: progress and scroll buttons
    let unlocked = catalog.unlocked_count(state);
    let total = catalog.len();
    let pct = if total > 0 {
        unlocked as f64 / total as f64 * 100.0
    } else {
        0.0
    };
    let mut head = ClickableList::new();
    head.push(Line::from(Span::styled(
        format!("Achievements Unlocked: {}/{} ({:.1}%)", unlocked, total, pct),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )));
    let hint_style = Style::default().fg(NEON_CYAN);
    head.push_clickable(Line::from(Span::styled("[K] Scroll up", hint_style)), SCROLL_UP);

    // The down button sits on the last visible row of the list area
    let list_area = Rect {
        height: parts[1].height.saturating_sub(1),
        ..parts[1]
    };
    let down_area = Rect {
        y: list_area.y + list_area.height,
        height: parts[1].height.min(1),
        ..parts[1]
    };

    let mut cs = click_state.borrow_mut();
    head.register_targets(parts[0], &mut cs, 0, 0, 0);
    f.render_widget(Paragraph::new(head.into_lines()), parts[0]);

    let mut down = ClickableList::new();
    down.push_clickable(Line::from(Span::styled("[J] Scroll down", hint_style)), SCROLL_DOWN);
    down.register_targets(down_area, &mut cs, 0, 0, 0);
    f.render_widget(Paragraph::new(down.into_lines()), down_area);

    let mut lines: Vec<Line> = Vec::with_capacity(achievement_line_count(catalog));
    for family in Family::all() {
        lines.push(Line::from(Span::styled(
            format!("── {} ──", family.name()),
            Style::default()
                .fg(NEON_PINK)
                .add_modifier(Modifier::BOLD),
        )));
        for a in catalog.by_family(*family) {
            let line = if state.unlocked.contains(&a.id) {
                Line::from(vec![
                    Span::styled("✓ ", Style::default().fg(Color::Green)),
                    Span::styled(a.title.clone(), Style::default().fg(Color::White)),
                    Span::styled(
                        format!("  {}", a.description),
                        Style::default().fg(Color::DarkGray),
                    ),
                ])
            } else {
                Line::from(vec![
                    Span::styled("· ", Style::default().fg(Color::DarkGray)),
                    Span::styled("???", Style::default().fg(Color::DarkGray)),
                    Span::styled(
                        "  Achievement locked",
                        Style::default().fg(Color::DarkGray),
                    ),
                ])
            };
            lines.push(line);
        }
    }

    let widget = Paragraph::new(lines).scroll((state.achievement_scroll, 0));
    f.render_widget(widget, list_area);
}

fn notification_line(kind: &NotificationKind) -> Line<'static> {
    match kind {
        NotificationKind::AchievementUnlocked { title } => Line::from(vec![
            Span::styled(
                "🏆 Achievement Unlocked! ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(title.clone(), Style::default().fg(Color::White)),
        ]),
        NotificationKind::AchievementBurst { count } => Line::from(Span::styled(
            format!("🏆 {} achievements unlocked", count),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        NotificationKind::Saved => Line::from(Span::styled(
            "Game saved!",
            Style::default().fg(Color::Green),
        )),
    }
}

/// Toast stack in the top-right corner, drawn over everything else.
fn render_notifications(state: &GameState, f: &mut Frame, area: Rect) {
    if state.notifications.is_empty() {
        return;
    }
    let width = area.width.min(44);
    let height = (state.notifications.len() as u16 + 2).min(area.height);
    let toast_area = Rect::new(area.x + area.width - width, area.y, width, height);

    let lines: Vec<Line> = state
        .notifications
        .iter()
        .map(|n| notification_line(&n.kind))
        .collect();

    f.render_widget(Clear, toast_area);
    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow)),
    );
    f.render_widget(widget, toast_area);
}

fn render_log(state: &GameState, f: &mut Frame, area: Rect) {
    let visible_height = area.height.saturating_sub(2) as usize;

    // Newest first
    let log_lines: Vec<Line> = state
        .log
        .iter()
        .rev()
        .take(visible_height)
        .enumerate()
        .map(|(i, entry)| {
            let style = if entry.is_important {
                Style::default().fg(Color::Yellow)
            } else if i < 3 {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Line::from(Span::styled(entry.text.as_str(), style))
        })
        .collect();

    let widget = Paragraph::new(log_lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue))
                .title(" Log "),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}
