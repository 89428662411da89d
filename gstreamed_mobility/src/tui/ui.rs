use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::tui::app::{EditorApp, Field, Mode};

pub fn draw(f: &mut Frame, app: &EditorApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Main content
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    draw_main_content(f, app, chunks[1]);
    draw_footer(f, app, chunks[2]);
}

fn draw_header(f: &mut Frame, app: &EditorApp, area: Rect) {
    let title = format!(
        " Arena Zone Editor - {:?}{} ",
        app.config_path,
        if app.dirty { " *" } else { "" }
    );

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            title,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::styled("[A]", Style::default().fg(Color::Green)),
        Span::raw("dd "),
        Span::styled("[D]", Style::default().fg(Color::Red)),
        Span::raw("elete "),
        Span::styled("[R]", Style::default().fg(Color::Yellow)),
        Span::raw("ename "),
        Span::styled("[S]", Style::default().fg(Color::Green)),
        Span::raw("ave "),
        Span::styled("[Q]", Style::default().fg(Color::Red)),
        Span::raw("uit"),
    ]))
    .block(Block::default().borders(Borders::ALL));

    f.render_widget(header, area);
}

fn draw_main_content(f: &mut Frame, app: &EditorApp, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    draw_zone_list(f, app, chunks[0]);
    draw_zone_editor(f, app, chunks[1]);
}

fn draw_zone_list(f: &mut Frame, app: &EditorApp, area: Rect) {
    let items: Vec<ListItem> = app
        .config
        .frames
        .iter()
        .enumerate()
        .map(|(idx, zone)| {
            let style = if idx == app.selected {
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let swatch_color = zone
                .color
                .map(|[r, g, b]| Color::Rgb(r, g, b))
                .unwrap_or(Color::White);
            ListItem::new(Line::from(vec![
                Span::styled("■ ", Style::default().fg(swatch_color)),
                Span::styled(zone.name.clone(), style),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Zones ({}) ", app.config.frames.len())),
    );

    f.render_widget(list, area);
}

fn draw_zone_editor(f: &mut Frame, app: &EditorApp, area: Rect) {
    let content = if let Some(zone) = app.selected_zone() {
        let mut lines = match &app.mode {
            Mode::Rename { buffer } => vec![
                Line::from(format!("  Renaming: {buffer}_")),
                Line::from("  Enter commits, Esc cancels"),
                Line::from(""),
            ],
            Mode::Browse => vec![Line::from(format!("  Zone: {}", zone.name)), Line::from("")],
        };

        let values = [
            (Field::Left, zone.top_left[0] as f32),
            (Field::Top, zone.top_left[1] as f32),
            (Field::Right, zone.bottom_right[0] as f32),
            (Field::Bottom, zone.bottom_right[1] as f32),
            (Field::Rotation, zone.rotation),
        ];
        for (field, value) in values {
            let marker = if field == app.field { ">" } else { " " };
            let style = if field == app.field {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let suffix = if field == Field::Rotation { "°" } else { " px" };
            lines.push(Line::from(Span::styled(
                format!("  {marker} {:<9} {:>7.1}{suffix}", field.label(), value),
                style,
            )));
        }

        let (cx, cy) = zone.center();
        lines.push(Line::from(""));
        lines.push(Line::from(format!(
            "  Centre: ({cx:.1}, {cy:.1}) | Diagonal: {:.1} px",
            zone.diagonal()
        )));
        if let Some((w, h)) = app.frame_dims {
            lines.push(Line::from(format!("  Frame: {w}x{h}")));
        }
        lines
    } else {
        vec![
            Line::from("  No zones configured."),
            Line::from("  Press A to add one."),
        ]
    };

    let editor = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Edit (Tab cycles field, arrows nudge, shift = x10) "),
    );

    f.render_widget(editor, area);
}

fn draw_footer(f: &mut Frame, app: &EditorApp, area: Rect) {
    let footer = Paragraph::new(app.status.clone())
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(footer, area);
}
