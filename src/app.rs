//! CoreTasks Terminal App
//!
//! Wires the controller into the screens and turns input lines into screen
//! actions. Rows are numbered from 1 on screen.

use std::io::{self, Write};

use core_tasks_lib::{AppConfig, DataController, DomainResult, IndexPath, SaveOutcome};

use crate::commands;
use crate::components::{EditingStyle, ListScreen};
use crate::context::AppContext;
use crate::terminal::TerminalTable;

const DEFAULT_LOG_LINES: usize = 20;

const HELP: &str = "\
Commands:
  list                 show all items
  add <text>           create an item
  show <row>           show one item
  edit <row> <text>    change an item's text
  delete <row>         delete an item
  save                 retry saving pending changes
  json                 print the list as JSON
  log [n]              show the last n log lines
  help                 this text
  quit                 exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Add(String),
    Show(usize),
    Edit(usize, String),
    Delete(usize),
    Save,
    Json,
    Log(usize),
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Command, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word {
            "" | "list" | "ls" => Ok(Command::List),
            "add" => Ok(Command::Add(rest.to_string())),
            "show" => parse_row(rest).map(Command::Show),
            "edit" => {
                let (row, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                Ok(Command::Edit(parse_row(row)?, text.trim().to_string()))
            }
            "delete" | "rm" => parse_row(rest).map(Command::Delete),
            "save" => Ok(Command::Save),
            "json" => Ok(Command::Json),
            "log" if rest.is_empty() => Ok(Command::Log(DEFAULT_LOG_LINES)),
            "log" => rest
                .parse()
                .map(Command::Log)
                .map_err(|_| format!("Expected a line count, got '{}'", rest)),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(format!("Unknown command '{}', try 'help'", other)),
        }
    }
}

/// Terminal rows are 1-based
fn parse_row(arg: &str) -> Result<usize, String> {
    match arg.parse::<usize>() {
        Ok(row) if row >= 1 => Ok(row - 1),
        _ => Err(format!("Expected a row number, got '{}'", arg)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    list: ListScreen<TerminalTable>,
}

impl App {
    /// Open the store and show the list.
    ///
    /// `DomainError::StoreUnavailable` means nothing can work; the caller
    /// decides how to exit.
    pub fn launch(config: &AppConfig) -> DomainResult<Self> {
        let controller = DataController::open(config)?;
        Ok(Self::with_context(controller.into()))
    }

    pub fn with_context(ctx: AppContext) -> Self {
        Self {
            list: ListScreen::new(ctx, TerminalTable::new()),
        }
    }

    /// Run one input line
    pub fn handle(&mut self, line: &str, out: &mut impl Write) -> io::Result<Flow> {
        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(msg) => {
                writeln!(out, "{}", msg)?;
                return Ok(Flow::Continue);
            }
        };

        match command {
            Command::List => self.render(out)?,
            Command::Add(text) => {
                let mut form = self.list.new_item_form();
                form.set_text(text);
                match form.save() {
                    Ok(Some(_)) => self.after_change(out)?,
                    Ok(None) => {
                        form.cancel();
                        writeln!(out, "Nothing to add")?;
                    }
                    Err(e) => self.report(out, e)?,
                }
            }
            Command::Show(row) => match self.list.detail_for(IndexPath::new(0, row)) {
                Some(detail) => {
                    let item = detail.item();
                    writeln!(out, "{}. {}", row + 1, detail.text())?;
                    writeln!(out, "   id {}, completed: {}", item.id, item.completed)?;
                }
                None => writeln!(out, "No row {}", row + 1)?,
            },
            Command::Edit(row, text) => match self.list.detail_for(IndexPath::new(0, row)) {
                Some(mut detail) if text.is_empty() => {
                    detail.back();
                    writeln!(out, "Nothing changed")?;
                }
                Some(mut detail) => {
                    detail.set_text(text);
                    match detail.confirm() {
                        Ok(_) => self.after_change(out)?,
                        Err(e) => self.report(out, e)?,
                    }
                }
                None => writeln!(out, "No row {}", row + 1)?,
            },
            Command::Delete(row) => {
                let path = IndexPath::new(0, row);
                if row >= self.list.number_of_rows(0) {
                    writeln!(out, "No row {}", row + 1)?;
                } else {
                    match self.list.editing_style(path) {
                        EditingStyle::Delete => match self.list.commit_delete(path) {
                            Ok(()) => self.after_change(out)?,
                            Err(e) => self.report(out, e)?,
                        },
                    }
                }
            }
            Command::Save => match commands::save(self.list.context()) {
                Ok(SaveOutcome::NoChanges) => writeln!(out, "Nothing to save")?,
                Ok(SaveOutcome::Saved(report)) => writeln!(
                    out,
                    "Saved {} new, {} changed, {} deleted",
                    report.inserted, report.updated, report.deleted
                )?,
                Err(e) => writeln!(out, "Error: {}", e)?,
            },
            Command::Json => {
                let json = serde_json::to_string_pretty(&self.list.rows())
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
                writeln!(out, "{}", json)?;
            }
            Command::Log(n) => {
                let lines = rolling_logger::recent_lines(n);
                if lines.is_empty() {
                    writeln!(out, "(no log lines)")?;
                }
                for line in lines {
                    writeln!(out, "{}", line)?;
                }
            }
            Command::Help => writeln!(out, "{}", HELP)?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Print every row
    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        let count = self.list.number_of_rows(0);
        if count == 0 {
            return writeln!(out, "(no items)");
        }
        for row in 0..count {
            let text = self.list.cell_text(IndexPath::new(0, row)).unwrap_or_default();
            writeln!(out, "{}. {}", row + 1, text)?;
        }
        Ok(())
    }

    fn after_change(&mut self, out: &mut impl Write) -> io::Result<()> {
        self.list.sync();
        for update in self.list.table().last_updates() {
            writeln!(out, "  {}", update)?;
        }
        self.render(out)
    }

    fn report(&mut self, out: &mut impl Write, err: impl std::fmt::Display) -> io::Result<()> {
        // The change may still be pending and visible
        self.list.sync();
        writeln!(out, "Error: {}", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::with_context(DataController::open_in_memory().unwrap().into())
    }

    fn run(app: &mut App, line: &str) -> String {
        let mut out = Vec::new();
        app.handle(line, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("add Buy milk"), Ok(Command::Add("Buy milk".into())));
        assert_eq!(Command::parse("  edit 2  Call mom "), Ok(Command::Edit(1, "Call mom".into())));
        assert_eq!(Command::parse("delete 1"), Ok(Command::Delete(0)));
        assert_eq!(Command::parse(""), Ok(Command::List));
        assert_eq!(Command::parse("q"), Ok(Command::Quit));
        assert!(Command::parse("delete 0").is_err());
        assert!(Command::parse("show x").is_err());
        assert!(Command::parse("frobnicate").is_err());
    }

    #[test]
    fn test_add_edit_delete_session() {
        let mut app = app();
        assert_eq!(run(&mut app, "list"), "(no items)\n");

        let out = run(&mut app, "add Call mom");
        assert!(out.contains("inserted row 1"));
        let out = run(&mut app, "add Buy milk");
        assert!(out.ends_with("1. Buy milk\n2. Call mom\n"));

        let out = run(&mut app, "edit 1 Walk dog");
        assert!(out.contains("moved row 1 to 2"));
        assert!(out.ends_with("1. Call mom\n2. Walk dog\n"));

        let out = run(&mut app, "delete 1");
        assert!(out.contains("deleted row 1"));
        assert!(out.ends_with("1. Walk dog\n"));
    }

    #[test]
    fn test_missing_rows_are_reported() {
        let mut app = app();
        assert_eq!(run(&mut app, "show 3"), "No row 3\n");
        assert_eq!(run(&mut app, "edit 1 x"), "No row 1\n");
        assert_eq!(run(&mut app, "delete 2"), "No row 2\n");
    }

    #[test]
    fn test_add_without_text() {
        let mut app = app();
        assert_eq!(run(&mut app, "add"), "Nothing to add\n");
    }

    #[test]
    fn test_show_and_json() {
        let mut app = app();
        run(&mut app, "add Buy milk");

        let out = run(&mut app, "show 1");
        assert!(out.starts_with("1. Buy milk\n"));
        assert!(out.contains("completed: false"));

        let json: serde_json::Value = serde_json::from_str(&run(&mut app, "json")).unwrap();
        assert_eq!(json[0]["text"], "Buy milk");
        assert_eq!(json[0]["row"], 0);
    }

    #[test]
    fn test_save_with_nothing_pending() {
        let mut app = app();
        run(&mut app, "add Buy milk");
        assert_eq!(run(&mut app, "save"), "Nothing to save\n");
    }

    #[test]
    fn test_edit_without_text_changes_nothing() {
        let mut app = app();
        run(&mut app, "add Buy milk");

        assert_eq!(run(&mut app, "edit 1"), "Nothing changed\n");
        assert_eq!(run(&mut app, "list"), "1. Buy milk\n");
    }

    #[test]
    fn test_parse_log_and_save() {
        assert_eq!(Command::parse("log"), Ok(Command::Log(DEFAULT_LOG_LINES)));
        assert_eq!(Command::parse("log 5"), Ok(Command::Log(5)));
        assert!(Command::parse("log many").is_err());
        assert_eq!(Command::parse("save"), Ok(Command::Save));
    }

    #[test]
    fn test_quit() {
        let mut app = app();
        let mut out = Vec::new();
        assert_eq!(app.handle("quit", &mut out).unwrap(), Flow::Quit);
    }

    #[test]
    fn test_launch_reopens_saved_items() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::with_data_dir(dir.path());
        {
            let mut app = App::launch(&config).unwrap();
            run(&mut app, "add Buy milk");
        }

        let app = App::launch(&config).unwrap();
        let mut out = Vec::new();
        app.render(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1. Buy milk\n");
    }
}
