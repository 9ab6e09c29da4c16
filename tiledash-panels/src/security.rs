// tiledash-panels/src/security.rs
use ratatui::{
    style::{Color, Style},
    text::{Line, Span, Text},
};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::process::Command;
use tiledash_core::{
    AppContext, FileSystem, Panel, PanelBase, PanelConfig, PanelConfigSource, PanelError,
};

/// Shown when a probe has nothing to report
pub const UNAVAILABLE: &str = "unavailable";

const MACOS_FIREWALL: &str = "/usr/libexec/ApplicationFirewall/socketfilterfw";

#[derive(Debug, Deserialize)]
struct SecurityConfig {
    #[serde(flatten)]
    base: PanelConfig,
    #[serde(default = "default_resolv_conf")]
    resolv_conf: String,
}

fn default_resolv_conf() -> String {
    "/etc/resolv.conf".to_string()
}

/// On/off state reported by a probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    On,
    Off,
    Unknown,
}

impl Toggle {
    pub fn label(self) -> &'static str {
        match self {
            Toggle::On => "on",
            Toggle::Off => "off",
            Toggle::Unknown => "n/a",
        }
    }

    fn color(self) -> Color {
        match self {
            Toggle::On => Color::Green,
            Toggle::Off => Color::Red,
            Toggle::Unknown => Color::White,
        }
    }
}

/// WiFi, firewall, DNS and session state of this host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityData {
    pub wifi_name: String,
    pub wifi_encryption: String,
    pub firewall_enabled: Toggle,
    pub firewall_stealth: Toggle,
    pub dns: Vec<String>,
    pub users: Vec<String>,
}

impl SecurityData {
    /// Probe the host. `resolv_conf` is the resolver file's content, if it
    /// could be read.
    pub fn fetch(resolv_conf: Option<&str>) -> Self {
        let (wifi_name, wifi_encryption) = probe_wifi()
            .unwrap_or_else(|| (UNAVAILABLE.to_string(), UNAVAILABLE.to_string()));
        let (firewall_enabled, firewall_stealth) = probe_firewall();

        Self {
            wifi_name,
            wifi_encryption,
            firewall_enabled,
            firewall_stealth,
            dns: resolv_conf.map(parse_resolv_conf).unwrap_or_default(),
            users: command_output("who", &[])
                .map(|out| parse_who(&out))
                .unwrap_or_default(),
        }
    }

    pub fn dns_at(&self, idx: usize) -> &str {
        self.dns.get(idx).map(String::as_str).unwrap_or("")
    }
}

/// Stdout of a successful command; `None` if it is missing or fails
fn command_output(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        tracing::trace!(program, status = %output.status, "probe command failed");
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn probe_wifi() -> Option<(String, String)> {
    if cfg!(target_os = "macos") {
        let out = command_output("networksetup", &["-getairportnetwork", "en0"])?;
        let name = out.split_once(": ")?.1.trim().to_string();
        return Some((name, UNAVAILABLE.to_string()));
    }

    command_output("nmcli", &["-t", "-f", "ACTIVE,SSID,SECURITY", "dev", "wifi"])
        .and_then(|out| parse_nmcli_wifi(&out))
        .or_else(|| {
            let name = command_output("iwgetid", &["-r"])?.trim().to_string();
            (!name.is_empty()).then(|| (name, UNAVAILABLE.to_string()))
        })
}

fn probe_firewall() -> (Toggle, Toggle) {
    if cfg!(target_os = "macos") {
        let state = |flag: &str| {
            command_output(MACOS_FIREWALL, &[flag])
                .map(|out| parse_enabled_word(&out))
                .unwrap_or(Toggle::Unknown)
        };
        return (state("--getglobalstate"), state("--getstealthmode"));
    }

    let enabled = command_output("ufw", &["status"])
        .map(|out| parse_ufw(&out))
        .filter(|state| *state != Toggle::Unknown)
        .or_else(|| {
            command_output("firewall-cmd", &["--state"]).map(|out| match out.trim() {
                "running" => Toggle::On,
                _ => Toggle::Off,
            })
        })
        .unwrap_or(Toggle::Unknown);
    (enabled, Toggle::Unknown)
}

/// `nameserver` entries of a resolv.conf file, in order
pub fn parse_resolv_conf(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#') && !line.starts_with(';'))
        .filter_map(|line| {
            let mut words = line.split_whitespace();
            match (words.next(), words.next()) {
                (Some("nameserver"), Some(addr)) => Some(addr.to_string()),
                _ => None,
            }
        })
        .collect()
}

/// The active network from `nmcli -t -f ACTIVE,SSID,SECURITY dev wifi`
pub fn parse_nmcli_wifi(text: &str) -> Option<(String, String)> {
    let line = text.lines().find_map(|line| line.strip_prefix("yes:"))?;
    let (ssid, security) = line.rsplit_once(':')?;

    let ssid = ssid.replace("\\:", ":");
    let security = match security.trim() {
        "" | "--" => "none".to_string(),
        other => other.to_string(),
    };
    Some((ssid, security))
}

/// `Status: active` / `Status: inactive` from `ufw status`
pub fn parse_ufw(text: &str) -> Toggle {
    let status = text
        .lines()
        .find_map(|line| line.trim().strip_prefix("Status:"))
        .map(str::trim);
    match status {
        Some("active") => Toggle::On,
        Some("inactive") => Toggle::Off,
        _ => Toggle::Unknown,
    }
}

fn parse_enabled_word(text: &str) -> Toggle {
    let text = text.to_lowercase();
    if text.contains("disabled") {
        Toggle::Off
    } else if text.contains("enabled") {
        Toggle::On
    } else {
        Toggle::Unknown
    }
}

/// Distinct user names from `who`, sorted
pub fn parse_who(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// WiFi network, firewall state, DNS servers and logged-in users
pub struct SecurityPanel {
    base: PanelBase,
    resolv_conf: String,
    fs: FileSystem,
}

impl SecurityPanel {
    pub fn new(source: &PanelConfigSource<'_>, ctx: &AppContext) -> Result<Self, PanelError> {
        let config: SecurityConfig = source.decode()?;

        Ok(Self {
            base: PanelBase::new("Security", &config.base, false, ctx),
            resolv_conf: config.resolv_conf,
            fs: ctx.fs.clone(),
        })
    }

    pub fn poll(&self) -> SecurityData {
        let resolv_conf = match self.fs.read_to_string(&self.resolv_conf) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::debug!(path = %self.resolv_conf, "no resolver config: {e}");
                None
            }
        };
        SecurityData::fetch(resolv_conf.as_deref())
    }

    pub fn display(&self, data: &SecurityData) -> Text<'static> {
        let heading = |text: &str| Span::styled(text.to_string(), Style::default().fg(Color::Red));
        let field = |name: &str, value: &str| {
            Line::from(vec![
                Span::from(format!(" {:>8}: ", name)),
                Span::from(value.to_string()),
            ])
        };
        let toggle = |name: &str, state: Toggle, dns: &str| {
            Line::from(vec![
                Span::from(format!(" {:>8}: ", name)),
                Span::styled(
                    format!("{:<3}", state.label()),
                    Style::default().fg(state.color()),
                ),
                Span::from(format!("   {:<16}", dns)),
            ])
        };

        let users = if data.users.is_empty() {
            UNAVAILABLE.to_string()
        } else {
            data.users.join(", ")
        };

        Text::from(vec![
            Line::from(vec![Span::from(" "), heading("WiFi")]),
            field("Network", &data.wifi_name),
            field("Crypto", &data.wifi_encryption),
            Line::from(""),
            Line::from(vec![
                Span::from(" "),
                heading("Firewall"),
                Span::from("        "),
                heading("DNS"),
            ]),
            toggle("Enabled", data.firewall_enabled, data.dns_at(0)),
            toggle("Stealth", data.firewall_stealth, data.dns_at(1)),
            Line::from(""),
            Line::from(vec![Span::from(" "), heading("Users")]),
            Line::from(format!(" {}", users)),
        ])
    }
}

impl Panel for SecurityPanel {
    fn base(&self) -> &PanelBase {
        &self.base
    }

    fn refresh(&self) {
        let data = self.poll();
        self.base.surface().set_text(self.display(&data));
    }
}
