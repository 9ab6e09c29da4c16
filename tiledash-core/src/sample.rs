// tiledash-core/src/sample.rs

/// Written into an empty config file on first start
pub const SAMPLE_CONFIG: &str = r#"# tiledash configuration
[app]
# disable auto-refresh, unless a panel enables it explicitly
refresh_interval = -1

[app.colors]
background = "black"

[app.colors.border]
focusable = "darkslateblue"
focused = "orange"
normal = "gray"

[app.log]
level = "debug"

[app.grid]
# configure rows and columns manually by listing their sizes
#rows = [13, 10, 4, 13, 13]
#columns = [35, 20]

# or give the number of columns and rows to split the terminal evenly
num_cols = 8
num_rows = 8

# Panels. Several instances of the same type may be configured; each one
# must be enabled explicitly, otherwise it is never created.
[[widgets]]
type = "clocks"
enabled = true
refresh_interval = 15
sort = "alphabetical"
position = { top = 0, left = 0, width = 2, height = 2 }

[widgets.colors.rows]
even = "lightblue"
odd = "white"

# tz database names, or fixed offsets such as "+05:45"
[widgets.locations]
Avignon = "Europe/Paris"
Barcelona = "Europe/Madrid"
Dubai = "Asia/Dubai"
Vancouver = "America/Vancouver"
Toronto = "America/Toronto"

[[widgets]]
type = "system"
enabled = true
refresh_interval = 3600
position = { top = 0, left = 2, width = 1, height = 2 }

[[widgets]]
type = "security"
enabled = false
refresh_interval = 3600
position = { top = 0, left = 2, width = 1, height = 2 }

[[widgets]]
type = "git"
enabled = true
refresh_interval = 30
repositories = ["."]
position = { top = 0, left = 3, width = 2, height = 2 }

[[widgets]]
type = "textfile"
enabled = true
file_path = "~/.config/tiledash/config.toml"
position = { top = 0, left = 5, width = 3, height = 7 }

[[widgets]]
type = "logger"
enabled = true
refresh_interval = 5
num_lines = 25
position = { top = 2, left = 0, width = 5, height = 6 }

[[widgets]]
type = "status"
enabled = true
refresh_interval = 1
position = { top = 7, left = 5, width = 3, height = 1 }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse;

    #[test]
    fn test_sample_parses() {
        let config = parse(SAMPLE_CONFIG).unwrap();
        assert_eq!(config.app.refresh_interval, -1);
        assert_eq!(config.app.grid.num_cols, 8);
        assert_eq!(config.widgets.len(), 7);
        assert_eq!(config.widgets.iter().filter(|w| w.enabled()).count(), 6);
    }
}
