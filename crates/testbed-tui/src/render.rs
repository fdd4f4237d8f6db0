//! Main render function for the TUI.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Sparkline};
use ratatui::Frame;

use crate::state::{ComponentStatus, UiState};

/// Render the entire UI.
pub fn render(frame: &mut Frame, state: &UiState) {
    let area = frame.area();

    // Create main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(frame, header_area, state);

    // Body: component panel on the left, live telemetry on the right
    let [components_area, telemetry_area] =
        Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)])
            .areas(body_area);

    render_components(frame, components_area, state);
    render_telemetry(frame, telemetry_area, state);

    render_footer(frame, footer_area, state);
}

/// Render the header with the active morphology.
fn render_header(frame: &mut Frame, area: Rect, state: &UiState) {
    let header = Paragraph::new(Line::from(vec![
        Span::raw("Active Morphology: "),
        Span::styled(
            &state.morphology_name,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Co-Design Testbed Controller ")
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
    );

    frame.render_widget(header, area);
}

/// Render the component validation panel.
fn render_components(frame: &mut Frame, area: Rect, state: &UiState) {
    let lines: Vec<Line> = state
        .components
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let marker = if index == state.selected { "> " } else { "  " };
            let (status_text, status_style) = match &row.status {
                ComponentStatus::Idle => ("idle".to_string(), Style::default().fg(Color::DarkGray)),
                ComponentStatus::Validating => (
                    "validating...".to_string(),
                    Style::default().fg(Color::Yellow),
                ),
                ComponentStatus::Passed(value) => {
                    (value.clone(), Style::default().fg(Color::Green))
                }
                ComponentStatus::Failed(value) => (value.clone(), Style::default().fg(Color::Red)),
            };

            let name_style = if index == state.selected {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            Line::from(vec![
                Span::raw(marker),
                Span::styled(format!("{:<24}", row.name), name_style),
                Span::styled(status_text, status_style),
            ])
        })
        .collect();

    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Component Validation ")
            .border_style(Style::default().fg(Color::Cyan)),
    );

    frame.render_widget(panel, area);
}

/// Render the live sensor graph.
fn render_telemetry(frame: &mut Frame, area: Rect, state: &UiState) {
    let samples: Vec<u64> = state.telemetry.iter().map(|v| *v as u64).collect();

    let title = match state.latest_sample() {
        Some(value) => format!(" Real-Time Telemetry ({value:.2}) "),
        None => " Real-Time Telemetry ".to_string(),
    };

    let sparkline = Sparkline::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .data(&samples)
        .style(Style::default().fg(Color::Red));

    frame.render_widget(sparkline, area);
}

/// Render the footer with status message and key help.
fn render_footer(frame: &mut Frame, area: Rect, state: &UiState) {
    let help = " q: quit | Up/Down: select | Enter: validate | a: validate all ";

    let footer = Line::from(vec![
        Span::styled(
            state.status_message.as_str(),
            Style::default().fg(Color::Green),
        ),
        Span::raw(" | "),
        Span::styled(help, Style::default().fg(Color::DarkGray)),
    ]);

    frame.render_widget(Paragraph::new(footer), area);
}
