// tiledash-panels/src/logger.rs
use crate::common::level_color;
use chrono::{DateTime, Local};
use ratatui::{
    style::{Color, Style},
    text::{Line, Span, Text},
};
use serde::Deserialize;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tiledash_core::{AppContext, Panel, PanelBase, PanelConfig, PanelConfigSource, PanelError};

const CHUNK: u64 = 4096;

#[derive(Debug, Deserialize)]
struct LoggerConfig {
    #[serde(flatten)]
    base: PanelConfig,
    #[serde(default = "default_num_lines")]
    num_lines: usize,
    /// strftime format for the time column
    #[serde(default = "default_date_format")]
    date_format: String,
}

fn default_num_lines() -> usize {
    10
}

fn default_date_format() -> String {
    "%H:%M:%S".to_string()
}

/// One line of the application log split into its columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub timestamp: Option<String>,
    pub level: Option<String>,
    pub message: String,
}

impl LogLine {
    /// Split a line written by the log subscriber:
    /// `2024-03-01T12:00:00.000000Z  INFO target: message`.
    /// Anything else is kept whole as the message.
    pub fn parse(line: &str) -> Self {
        let mut parts = line.splitn(2, char::is_whitespace);
        let first = parts.next().unwrap_or_default();
        let rest = parts.next().unwrap_or_default().trim_start();

        if DateTime::parse_from_rfc3339(first).is_err() {
            return Self {
                timestamp: None,
                level: None,
                message: line.to_string(),
            };
        }

        let mut parts = rest.splitn(2, char::is_whitespace);
        let level = parts.next().unwrap_or_default();
        let message = parts.next().unwrap_or_default().trim_start();

        Self {
            timestamp: Some(first.to_string()),
            level: Some(level.to_string()).filter(|l| !l.is_empty()),
            message: message.to_string(),
        }
    }
}

/// Read the last `count` lines of a file without loading all of it
pub fn tail_lines(path: &Path, count: usize) -> io::Result<Vec<String>> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();

    let mut start = len;
    let mut buf: Vec<u8> = Vec::new();
    // One more newline than lines wanted, unless the file ends first
    while start > 0 && buf.iter().filter(|b| **b == b'\n').count() <= count {
        let step = CHUNK.min(start);
        start -= step;
        file.seek(SeekFrom::Start(start))?;

        let mut chunk = vec![0; step as usize];
        file.read_exact(&mut chunk)?;
        chunk.extend_from_slice(&buf);
        buf = chunk;
    }

    let text = String::from_utf8_lossy(&buf);
    let lines: Vec<&str> = text.lines().collect();
    let skip = lines.len().saturating_sub(count);
    Ok(lines[skip..].iter().map(|l| l.to_string()).collect())
}

/// Shows the tail of the application's own log file
pub struct LoggerPanel {
    base: PanelBase,
    path: PathBuf,
    num_lines: usize,
    date_format: String,
}

impl LoggerPanel {
    pub fn new(source: &PanelConfigSource<'_>, ctx: &AppContext) -> Result<Self, PanelError> {
        let config: LoggerConfig = source.decode()?;

        Ok(Self {
            base: PanelBase::new("Logs", &config.base, false, ctx),
            path: ctx.log_file.clone(),
            num_lines: config.num_lines,
            date_format: config.date_format,
        })
    }

    fn format_time(&self, timestamp: &str) -> String {
        match DateTime::parse_from_rfc3339(timestamp) {
            Ok(time) => time
                .with_timezone(&Local)
                .format(&self.date_format)
                .to_string(),
            Err(_) => timestamp.to_string(),
        }
    }

    pub fn display(&self, lines: &[String]) -> Text<'static> {
        let lines: Vec<Line> = lines
            .iter()
            .map(|raw| {
                let line = LogLine::parse(raw);
                let mut spans = Vec::new();

                if let Some(timestamp) = &line.timestamp {
                    spans.push(Span::styled(
                        format!("{} ", self.format_time(timestamp)),
                        Style::default().fg(Color::Cyan),
                    ));
                }
                if let Some(level) = &line.level {
                    spans.push(Span::styled(
                        format!("{:<5} ", level),
                        Style::default().fg(level_color(level)),
                    ));
                }
                spans.push(Span::from(line.message));

                Line::from(spans)
            })
            .collect();

        Text::from(lines)
    }
}

impl Panel for LoggerPanel {
    fn base(&self) -> &PanelBase {
        &self.base
    }

    fn refresh(&self) {
        match tail_lines(&self.path, self.num_lines) {
            Ok(lines) => self.base.surface().set_text(self.display(&lines)),
            Err(e) => self.base.surface().set_text(Line::styled(
                format!("Cannot read {}: {}", self.path.display(), e),
                Style::default().fg(Color::Red),
            )),
        }
    }
}
