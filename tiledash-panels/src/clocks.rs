// tiledash-panels/src/clocks.rs
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use chrono_tz::Tz;
use ratatui::{
    style::Style,
    text::{Line, Span, Text},
};
use serde::Deserialize;
use std::collections::BTreeMap;
use tiledash_core::{
    AppContext, Formatter, Panel, PanelBase, PanelConfig, PanelConfigSource, PanelError,
};

/// Order of the clock rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockSort {
    /// By label
    #[default]
    Alphabetical,
    /// By local wall time, earliest first
    Chronological,
}

#[derive(Debug, Deserialize)]
struct ClocksConfig {
    #[serde(flatten)]
    base: PanelConfig,
    #[serde(default)]
    sort: ClockSort,
    /// Label -> zone, e.g. `Dubai = "Asia/Dubai"` or `Dubai = "+04:00"`
    #[serde(default)]
    locations: BTreeMap<String, String>,
}

/// Time zone of a clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// tz database location, follows daylight saving time
    Named(Tz),
    Fixed(FixedOffset),
}

impl Zone {
    /// A tz database name such as `America/New_York`, else a UTC offset
    pub fn parse(text: &str) -> Option<Self> {
        text.trim()
            .parse::<Tz>()
            .ok()
            .map(Zone::Named)
            .or_else(|| parse_offset(text).map(Zone::Fixed))
    }
}

/// A labelled time zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clock {
    pub label: String,
    pub zone: Zone,
}

impl Clock {
    pub fn local_time(&self, now: DateTime<Utc>) -> DateTime<FixedOffset> {
        match self.zone {
            Zone::Named(tz) => now.with_timezone(&tz).fixed_offset(),
            Zone::Fixed(offset) => now.with_timezone(&offset),
        }
    }

    fn wall_time(&self, now: DateTime<Utc>) -> NaiveDateTime {
        self.local_time(now).naive_local()
    }
}

/// Parse `UTC`, `Z`, `+HH`, `+HH:MM` or `+HHMM` (and the `-` forms)
pub fn parse_offset(text: &str) -> Option<FixedOffset> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("utc") || text.eq_ignore_ascii_case("z") {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match text.as_bytes().first()? {
        b'+' => (1, &text[1..]),
        b'-' => (-1, &text[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let (hours, minutes) = match digits.len() {
        1 | 2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };
    if minutes >= 60 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// World clocks, one row per configured location
pub struct ClocksPanel {
    base: PanelBase,
    clocks: Vec<Clock>,
    sort: ClockSort,
    formatter: Formatter,
}

impl ClocksPanel {
    pub fn new(source: &PanelConfigSource<'_>, ctx: &AppContext) -> Result<Self, PanelError> {
        let config: ClocksConfig = source.decode()?;

        let clocks = config
            .locations
            .iter()
            .filter_map(|(label, location)| match Zone::parse(location) {
                Some(zone) => Some(Clock {
                    label: label.clone(),
                    zone,
                }),
                None => {
                    tracing::warn!(%label, %location, "skipping clock with unknown time zone");
                    None
                }
            })
            .collect();

        Ok(Self {
            base: PanelBase::new("World Clocks", &config.base, false, ctx),
            clocks,
            sort: config.sort,
            formatter: Formatter::for_panel(&config.base),
        })
    }

    pub fn clocks(&self) -> &[Clock] {
        &self.clocks
    }

    /// Clocks in display order at `now`
    pub fn sorted(&self, now: DateTime<Utc>) -> Vec<&Clock> {
        let mut clocks: Vec<&Clock> = self.clocks.iter().collect();
        match self.sort {
            ClockSort::Alphabetical => clocks.sort_by(|a, b| a.label.cmp(&b.label)),
            ClockSort::Chronological => clocks.sort_by(|a, b| {
                a.wall_time(now)
                    .cmp(&b.wall_time(now))
                    .then_with(|| a.label.cmp(&b.label))
            }),
        }
        clocks
    }

    pub fn display(&self, now: DateTime<Utc>) -> Text<'static> {
        if self.clocks.is_empty() {
            return Text::from(vec![Line::from(""), Line::from(" no timezone data available")]);
        }

        let lines: Vec<Line> = self
            .sorted(now)
            .into_iter()
            .enumerate()
            .map(|(idx, clock)| {
                let local = clock.local_time(now);
                Line::from(Span::styled(
                    format!(
                        " {:<12} {:<10} {:>7}",
                        clock.label,
                        local.format("%H:%M").to_string(),
                        local.format("%b %-d").to_string()
                    ),
                    Style::default().fg(self.formatter.row_color(idx)),
                ))
            })
            .collect();

        Text::from(lines)
    }
}

impl Panel for ClocksPanel {
    fn base(&self) -> &PanelBase {
        &self.base
    }

    fn refresh(&self) {
        self.base.surface().set_text(self.display(Utc::now()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;
    use chrono::TimeZone;
    use ratatui::style::Color;

    const DOC: &str = r#"
        [[widgets]]
        type = "clocks"
        enabled = true
        [widgets.locations]
        Vancouver = "-08:00"
        Dubai = "+04:00"
        Avignon = "+01:00"
        Kathmandu = "+05:45"
    "#;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset("+01:00"), FixedOffset::east_opt(3600));
        assert_eq!(parse_offset("-0830"), FixedOffset::west_opt(8 * 3600 + 1800));
        assert_eq!(parse_offset("+5"), FixedOffset::east_opt(5 * 3600));
        assert_eq!(parse_offset("UTC"), FixedOffset::east_opt(0));
        assert_eq!(parse_offset("Europe/Paris"), None);
        assert_eq!(parse_offset("+01:75"), None);
        assert_eq!(parse_offset(""), None);
    }

    #[test]
    fn test_alphabetical_sort() {
        let panel = Fixture::new(DOC).build(ClocksPanel::new).unwrap();
        let labels: Vec<_> = panel.sorted(noon()).iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["Avignon", "Dubai", "Kathmandu", "Vancouver"]);
    }

    #[test]
    fn test_chronological_sort() {
        let doc = DOC.replace("enabled = true", "enabled = true\nsort = \"chronological\"");
        let panel = Fixture::new(&doc).build(ClocksPanel::new).unwrap();
        let labels: Vec<_> = panel.sorted(noon()).iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["Vancouver", "Avignon", "Dubai", "Kathmandu"]);
    }

    #[test]
    fn test_zone_names_and_offsets() {
        assert_eq!(
            Zone::parse("America/New_York"),
            Some(Zone::Named(chrono_tz::America::New_York))
        );
        assert_eq!(Zone::parse(" +04:00 "), FixedOffset::east_opt(4 * 3600).map(Zone::Fixed));
        assert_eq!(Zone::parse("Mars/Olympus_Mons"), None);
    }

    #[test]
    fn test_named_zone_follows_daylight_saving() {
        let clock = Clock {
            label: "New York".to_string(),
            zone: Zone::parse("America/New_York").unwrap(),
        };
        let winter = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let summer = Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap();

        assert_eq!(clock.local_time(winter).format("%H:%M").to_string(), "07:00");
        assert_eq!(clock.local_time(summer).format("%H:%M").to_string(), "08:00");
    }

    #[test]
    fn test_unknown_zones_are_skipped() {
        let doc = DOC.replace("Dubai = \"+04:00\"", "Dubai = \"Asia/Dubia\"");
        let panel = Fixture::new(&doc).build(ClocksPanel::new).unwrap();
        assert_eq!(panel.clocks().len(), 3);

        let doc = DOC.replace("Dubai = \"+04:00\"", "Dubai = \"Asia/Dubai\"");
        let panel = Fixture::new(&doc).build(ClocksPanel::new).unwrap();
        assert_eq!(panel.clocks().len(), 4);
    }

    #[test]
    fn test_rows_show_local_time_and_alternate_colors() {
        let panel = Fixture::new(DOC).build(ClocksPanel::new).unwrap();
        let text = panel.display(noon());

        assert_eq!(text.lines.len(), 4);
        assert_eq!(text.lines[0].to_string(), " Avignon      13:00        Mar 1");
        assert!(text.lines[3].to_string().contains("04:00"));
        assert_eq!(text.lines[0].spans[0].style.fg, Some(Color::LightBlue));
        assert_eq!(text.lines[1].spans[0].style.fg, Some(Color::White));
    }

    #[test]
    fn test_no_locations() {
        let panel = Fixture::new("[[widgets]]\ntype = \"clocks\"\nenabled = true\n")
            .build(ClocksPanel::new)
            .unwrap();
        panel.refresh();
        assert_eq!(panel.surface().content(), "\n no timezone data available");
        assert_eq!(panel.title(), "World Clocks");
        assert!(!panel.focusable());
    }
}
