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

use std::io::{self, stdout};
use std::path::PathBuf;

use anyhow::Context;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::Terminal;

use allyfan::app::App;
use allyfan::config::load_config;
use allyfan::events::handle_key_event;
use allyfan::logger;
use allyfan::plugin::Plugin;
use allyfan::ui::ui;

fn usage() -> ! {
    eprintln!("usage: allyfan [--config <path>] [--logging] <status | set <balanced|aggressive> | watch>");
    std::process::exit(2);
}

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let mut config_path: Option<PathBuf> = None;
    let mut logging_enabled = false;
    let mut rest: Vec<String> = Vec::new();
    while let Some(a) = args.next() {
        match a.as_str() {
            "--config" => match args.next() {
                Some(p) => config_path = Some(PathBuf::from(p)),
                None => usage(),
            },
            "--logging" => logging_enabled = true,
            "-h" | "--help" => usage(),
            _ => rest.push(a),
        }
    }

    let config = load_config(config_path.as_deref()).context("loading config")?;
    if logging_enabled {
        logger::init_logging(&config.log_path, config.log_level);
        logger::info("startup", serde_json::json!({ "args": rest }));
    }

    let plugin = Plugin::new(config);
    plugin.on_load();
    let res = match rest.first().map(|s| s.as_str()) {
        Some("status") => run_status(&plugin),
        Some("set") => run_set(&plugin, rest.get(1).map(|s| s.as_str())),
        Some("watch") => run_watch(plugin),
        _ => usage(),
    };

    match res {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {:#}", err);
            logger::log_event(logger::Level::Error, "fatal_error", serde_json::json!({ "error": format!("{:#}", err) }));
            std::process::exit(1);
        }
    }
}

fn run_status(plugin: &Plugin) -> anyhow::Result<i32> {
    let value = plugin.status_json().context("reading fan curve state")?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    plugin.on_unload();
    Ok(0)
}

fn run_set(plugin: &Plugin, name: Option<&str>) -> anyhow::Result<i32> {
    if unsafe { libc::geteuid() } != 0 {
        eprintln!("warning: not running as root; writing {} may fail", plugin.config().profile_path.display());
    }
    let res = plugin.set_profile(name);
    println!("{}", serde_json::to_string_pretty(&res)?);
    plugin.on_unload();
    Ok(if res.ok { 0 } else { 1 })
}

type Tui = Terminal<ratatui::backend::CrosstermBackend<io::Stdout>>;

/// Run `undo` when `res` is an error, then hand `res` back unchanged.
fn undo_on_err<T, E>(res: Result<T, E>, undo: impl FnOnce()) -> Result<T, E> {
    if res.is_err() {
        undo();
    }
    res
}

fn setup_terminal() -> io::Result<Tui> {
    enable_raw_mode()?;
    let res = (|| -> io::Result<Tui> {
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;
        Terminal::new(ratatui::backend::CrosstermBackend::new(stdout))
    })();
    // Leave the user's shell usable if setup fails halfway
    undo_on_err(res, || {
        let _ = execute!(stdout(), LeaveAlternateScreen);
        let _ = disable_raw_mode();
    })
}

fn run_watch(plugin: Plugin) -> anyhow::Result<i32> {
    let mut terminal = setup_terminal()?;

    let mut app = App::new(plugin);
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    app.plugin.on_unload();
    res.map(|_| 0)
}

fn run_app(terminal: &mut Tui, app: &mut App) -> anyhow::Result<()> {
    app.refresh();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = app
            .refresh_interval
            .saturating_sub(app.last_refresh.elapsed());
        if event::poll(timeout).unwrap_or(false) {
            if let Event::Key(key_event) = event::read()? {
                if key_event.kind == KeyEventKind::Press && handle_key_event(app, key_event)? {
                    return Ok(());
                }
            }
        }

        if app.refresh_due() {
            app.refresh();
        }
    }
}
