//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).
//!
//! ## For contributors
//!
//! * The layout is a list of entries on the left, the selected entry's
//!   details on the right and a one-line status bar at the bottom.
//! * Colours and styles are defined inline.
//! * [`ratatui`] is the TUI framework; see its docs for widget details.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, CoverState};

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let [main_area, status_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(frame.area());
    let [list_area, detail_area] =
        Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)])
            .areas(main_area);

    draw_entry_list(app, frame, list_area);
    draw_detail(app, frame, detail_area);
    draw_status_bar(app, frame, status_area);
}

/// Short marker shown next to each title in the list.
fn cover_marker(cover: &CoverState) -> Span<'static> {
    match cover {
        CoverState::Pending => Span::styled("[…]", Style::default().fg(Color::DarkGray)),
        CoverState::Loaded { .. } => Span::styled("[▣]", Style::default().fg(Color::Green)),
        CoverState::Absent | CoverState::Unknown => {
            Span::styled("[?]", Style::default().fg(Color::Yellow))
        }
        CoverState::Failed(_) => Span::styled("[!]", Style::default().fg(Color::Red)),
    }
}

/// Render the scrollable entry list: title line plus abbreviated blurb.
fn draw_entry_list(app: &mut App, frame: &mut Frame, area: Rect) {
    let list_items: Vec<ListItem> = app
        .entries
        .iter()
        .map(|entry| {
            let mut lines = vec![Line::from(vec![
                cover_marker(&entry.cover),
                Span::raw(" "),
                Span::styled(entry.title.clone(), Style::default().fg(Color::White)),
            ])];
            if !entry.blurb.is_empty() {
                lines.push(Line::styled(
                    format!("    {}", entry.blurb.replace('\n', " ")),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            ListItem::new(Text::from(lines))
        })
        .collect();

    let title = if app.leaf {
        format!(" {} (single item) ", app.feed_title)
    } else {
        format!(" {} ", app.feed_title)
    };

    let list = List::new(list_items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

/// Render the selected entry with its full description.
fn draw_detail(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default().title(" Details ").borders(Borders::ALL);

    let Some(entry) = app.selected_entry() else {
        frame.render_widget(Paragraph::new("No entry selected").block(block), area);
        return;
    };

    let updated = entry
        .updated
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "no date".into());

    let mut lines = vec![
        Line::styled(
            entry.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::styled(updated, Style::default().fg(Color::DarkGray)),
        Line::styled(entry.cover.label(), Style::default().fg(Color::Cyan)),
        Line::raw(""),
    ];
    lines.extend(entry.description.lines().map(|l| Line::raw(l.to_string())));

    let detail = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(detail, area);
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let status = Paragraph::new(Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(app.status.as_str(), Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(
            format!("{} entries", app.entries.len()),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  "),
        Span::styled(
            format!("{}/{} covers", app.settled_covers(), app.entries.len()),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  q: quit  ↑/↓: scroll  PgUp/PgDn: page  Home/End: jump"),
    ]));
    frame.render_widget(status, area);
}
