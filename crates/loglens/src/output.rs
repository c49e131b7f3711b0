//! Terminal output formatting

use colored::Colorize;
use loglens_core::{HandlerDescriptor, Level};
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Tabled)]
pub struct HandlerRow {
    #[tabled(rename = "name")]
    pub name: String,
    #[tabled(rename = "kind")]
    pub kind: String,
    #[tabled(rename = "level")]
    pub level: String,
    #[tabled(rename = "path")]
    pub path: String,
    #[tabled(rename = "exists")]
    pub exists: String,
}

/// JSON-friendly handler representation
#[derive(Serialize)]
pub struct HandlerJson {
    pub name: String,
    pub kind: String,
    pub level: Level,
    pub path: String,
    pub exists: bool,
}

impl From<&HandlerDescriptor> for HandlerJson {
    fn from(descriptor: &HandlerDescriptor) -> Self {
        let path = descriptor.path.as_deref();
        HandlerJson {
            name: descriptor.name.clone(),
            kind: descriptor.kind.to_string(),
            level: descriptor.min_level,
            path: path.map(|p| p.display().to_string()).unwrap_or_default(),
            exists: path.map(|p| p.exists()).unwrap_or(false),
        }
    }
}

impl From<&HandlerDescriptor> for HandlerRow {
    fn from(descriptor: &HandlerDescriptor) -> Self {
        let json = HandlerJson::from(descriptor);
        HandlerRow {
            name: json.name,
            kind: json.kind,
            level: format_level(json.level, json.level.as_str()),
            path: json.path,
            exists: if json.exists {
                "yes".green().to_string()
            } else {
                "no".red().to_string()
            },
        }
    }
}

pub fn print_handler_table(handlers: &[HandlerDescriptor], json: bool) {
    if json {
        let rows: Vec<HandlerJson> = handlers.iter().map(HandlerJson::from).collect();
        match serde_json::to_string_pretty(&rows) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error serializing to JSON: {}", e),
        }
        return;
    }

    if handlers.is_empty() {
        println!("No file-backed handlers configured");
        return;
    }

    let rows: Vec<HandlerRow> = handlers.iter().map(HandlerRow::from).collect();
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::single(2)).with(Alignment::center()))
        .to_string();

    println!("{}", table);
}

/// Color `text` the way the viewer colors records of `level`
pub fn format_level(level: Level, text: &str) -> String {
    match level {
        Level::Debug => text.dimmed().to_string(),
        Level::Info => text.cyan().to_string(),
        Level::Warning => text.yellow().to_string(),
        Level::Error => text.red().to_string(),
        Level::Critical => text.white().on_red().bold().to_string(),
    }
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message);
}
