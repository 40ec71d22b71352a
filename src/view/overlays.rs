//! Overlay rendering (status notification, connection error)

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    }
}

pub fn render_status_notification(frame: &mut Frame, message: &str) {
    let area = frame.area();

    let popup_width = 52.min(area.width.saturating_sub(4));
    let inner_width = popup_width.saturating_sub(4).max(1) as usize;
    let line_count = message.chars().count().div_ceil(inner_width).max(1) as u16;

    // Anchored above the progress bar
    let popup_height = 2 + line_count;
    let popup_area = Rect {
        x: area.width.saturating_sub(popup_width) / 2,
        y: area.height.saturating_sub(popup_height + 3),
        width: popup_width,
        height: popup_height.min(area.height),
    };

    frame.render_widget(Clear, popup_area);

    let color = Color::Yellow;
    let widget = Paragraph::new(message.to_string())
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(" Esc to dismiss ")
                .style(Style::default().bg(Color::Black)),
        );
    frame.render_widget(widget, popup_area);
}

pub fn render_connection_error(frame: &mut Frame, reason: Option<&str>) {
    let area = frame.area();
    let popup_area = centered(area, 60, 9);

    let mut lines = vec![
        Line::from("Could not connect to the catalog.")
            .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        Line::from(""),
    ];
    if let Some(reason) = reason {
        lines.push(Line::from(reason.to_string()).style(Style::default().fg(Color::DarkGray)));
        lines.push(Line::from(""));
    }
    lines.push(Line::from("Check SPOTIFY_CLIENT_KEY / SPOTIFY_SECRET_KEY and restart."));
    lines.push(Line::from("Ctrl-Q to quit"));

    frame.render_widget(Clear, popup_area);
    let widget = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(" Connection Error "),
        );
    frame.render_widget(widget, popup_area);
}
