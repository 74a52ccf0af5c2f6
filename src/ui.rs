/*
 * This file is part of Allyfan.
 *
 * Copyright (C) 2025 Allyfan contributors
 *
 * Allyfan is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Allyfan is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Allyfan. If not, see <https://www.gnu.org/licenses/>.
 */

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Sparkline, Wrap};

use crate::app::App;
use crate::history::History;
use crate::profile::Profile;

pub fn fmt_temp(v: Option<f64>) -> String {
    v.map(|t| format!("{:.1}", t)).unwrap_or_else(|| "n/a".to_string())
}

pub fn fmt_rpm(v: Option<i64>) -> String {
    v.map(|r| r.to_string()).unwrap_or_else(|| "n/a".to_string())
}

fn profile_label(p: Profile) -> &'static str {
    match p {
        Profile::Balanced => "Balanced (stock)",
        Profile::Aggressive => "Aggressive",
    }
}

fn reading_row(f: &mut Frame, area: Rect, title: &str, value: String, history: &History) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(format!(" {} ", title));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(10), Constraint::Min(10)])
        .split(inner);
    f.render_widget(Paragraph::new(value).alignment(Alignment::Right), cols[0]);
    let data = history.scaled();
    let spark = Sparkline::default()
        .data(&data)
        .max(100)
        .style(Style::default().fg(Color::Cyan));
    f.render_widget(spark, cols[1]);
}

pub fn ui(f: &mut Frame, app: &App) {
    let size = f.area();
    let outer = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(" ROG Ally Fan Control ");
    let inner = outer.inner(size);
    f.render_widget(outer, size);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(inner);

    // Profile selector
    let mut spans: Vec<Span> = vec![Span::raw("Profile: ")];
    for p in Profile::ALL {
        let style = if p == app.selected {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} ", profile_label(p)), style));
        spans.push(Span::raw(" "));
    }
    if let Some(snap) = &app.snapshot {
        spans.push(Span::styled(format!("  active: {}", snap.profile), Style::default().fg(Color::DarkGray)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), rows[0]);

    if let Some((is_error, msg)) = &app.feedback {
        let color = if *is_error { Color::Red } else { Color::Green };
        f.render_widget(Paragraph::new(msg.as_str()).style(Style::default().fg(color)), rows[1]);
    }

    match (&app.snapshot, &app.status_error) {
        (Some(snap), _) => {
            let body = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Length(3),
                    Constraint::Length(3),
                    Constraint::Length(3),
                    Constraint::Length(1),
                    Constraint::Min(0),
                ])
                .split(rows[2]);
            reading_row(f, body[0], "CPU Temp (°C)", fmt_temp(snap.cpu_temp_c), &app.cpu_temps);
            reading_row(f, body[1], "GPU Temp (°C)", fmt_temp(snap.gpu_temp_c), &app.gpu_temps);
            reading_row(f, body[2], "CPU Fan (RPM)", fmt_rpm(snap.cpu_rpm), &app.cpu_rpms);
            reading_row(f, body[3], "GPU Fan (RPM)", fmt_rpm(snap.gpu_rpm), &app.gpu_rpms);
            let mode = format!("Curve Mode: pwm1_enable={} / pwm2_enable={}", snap.pwm1_enable, snap.pwm2_enable);
            f.render_widget(Paragraph::new(mode), body[4]);
        }
        (None, err) => {
            let msg = err.clone().unwrap_or_else(|| "Not ready".to_string());
            let p = Paragraph::new(format!("Status: {}", msg))
                .style(Style::default().fg(Color::Yellow))
                .wrap(Wrap { trim: true });
            f.render_widget(p, rows[2]);
        }
    }

    let help = Paragraph::new("b balanced  |  a aggressive  |  Enter apply  |  r refresh  |  q quit")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    f.render_widget(help, rows[3]);
}
