//! CoreTasks Terminal Entry Point

mod app;
mod commands;
mod components;
mod context;
mod models;
mod terminal;

use std::io::{self, BufRead, Write};

use app::{App, Flow};
use core_tasks_lib::config::default_data_dir;
use core_tasks_lib::AppConfig;
use rolling_logger::{LevelFilter, LoggerConfig};

fn main() {
    let data_dir = match default_data_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("CoreTasks cannot start: {}", e);
            std::process::exit(1);
        }
    };
    let (config, config_err) = match AppConfig::load(&data_dir) {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::with_data_dir(&data_dir), Some(e)),
    };

    init_logging(&config);
    if let Some(e) = config_err {
        let _ = rolling_logger::warn(&format!("Ignoring settings: {}", e));
    }
    let _ = rolling_logger::info(&format!(
        "CoreTasks starting, data dir {}",
        config.data_dir.display()
    ));

    let mut app = match App::launch(&config) {
        Ok(app) => app,
        Err(e) => {
            let _ = rolling_logger::error(&format!("Cannot open store: {}", e));
            eprintln!("CoreTasks cannot start: {}", e);
            if let Some(path) = rolling_logger::log_file() {
                eprintln!("Details in {}", path.display());
            }
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&mut app) {
        let _ = rolling_logger::error(&format!("Terminal error: {}", e));
        std::process::exit(1);
    }
    let _ = rolling_logger::info("CoreTasks exiting");
}

fn init_logging(config: &AppConfig) {
    let mut logger = LoggerConfig::new(config.log_dir(), "CoreTasks");
    logger.max_bytes = config.log_max_bytes;
    logger.max_files = config.log_max_files;
    logger.level = config.log_level.parse().unwrap_or(LevelFilter::INFO);
    logger.echo_stderr = false;

    if let Err(e) = rolling_logger::init_with(logger) {
        eprintln!("Logging disabled: {}", e);
    }
}

fn run(app: &mut App) -> io::Result<()> {
    let stdin = io::stdin();
    let mut out = io::stdout().lock();

    app.render(&mut out)?;
    loop {
        write!(out, "> ")?;
        out.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(());
        }
        if app.handle(&line, &mut out)? == Flow::Quit {
            return Ok(());
        }
    }
}
