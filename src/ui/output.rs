//! Human-facing status lines.
//!
//! Everything here writes to stderr; stdout carries exported documents
//! and table listings only.

use crate::ui::{theme, Icons};
use indicatif::HumanDuration;
use owo_colors::OwoColorize;
use std::path::Path;
use std::time::Duration;

pub fn header(text: &str) {
    eprintln!("{} {}", Icons::TABLE, text.style(theme().header.clone()));
}

pub fn success(label: &str) {
    eprintln!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(theme().error.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

pub fn info(label: &str, value: &str) {
    eprintln!(
        "{} {}: {}",
        Icons::INFO.style(theme().info.clone()),
        label.style(theme().dim.clone()),
        value
    );
}

pub fn specs_dir(path: &Path) {
    eprintln!("{} {}", Icons::FOLDER, path.display().style(theme().accent.clone()));
}

pub fn written(path: &Path, format: &str) {
    eprintln!(
        "{} {} {}",
        Icons::FILE,
        path.display(),
        format!("({})", format).style(theme().dim.clone())
    );
}

pub fn ingest_summary(namespaces: usize, tables: usize, elapsed: Duration) {
    eprintln!(
        "{} {} tables in {} namespaces {}",
        Icons::TABLE.style(theme().info.clone()),
        tables,
        namespaces,
        format!("({})", HumanDuration(elapsed)).style(theme().dim.clone())
    );
}

pub fn serving(tables: usize, database: &str, addr: &str) {
    eprintln!(
        "{} Serving {} tables from {} at {}",
        Icons::GLOBE,
        tables,
        database.style(theme().accent.clone()),
        format!("http://{}", addr).style(theme().header.clone())
    );
}

pub fn dim(text: &str) -> String {
    text.style(theme().dim.clone()).to_string()
}

pub fn accent(text: &str) -> String {
    text.style(theme().accent.clone()).to_string()
}
