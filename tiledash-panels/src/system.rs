// tiledash-panels/src/system.rs
use crate::common::{format_bytes, format_percentage, format_uptime, percent_of, usage_color};
use ratatui::{
    style::{Color, Style},
    text::{Line, Span, Text},
};
use std::sync::{Mutex, PoisonError};
use sysinfo::System;
use tiledash_core::{AppContext, Panel, PanelBase, PanelConfig, PanelConfigSource, PanelError};

/// Host details and memory usage
#[derive(Debug, Clone, PartialEq)]
pub struct SystemInfo {
    pub os: String,
    pub kernel: String,
    pub host: String,
    pub uptime: u64,
    pub used_memory: u64,
    pub total_memory: u64,
}

impl SystemInfo {
    fn poll(system: &mut System) -> Self {
        system.refresh_memory();

        Self {
            os: System::long_os_version().unwrap_or_else(|| "unknown".to_string()),
            kernel: System::kernel_version().unwrap_or_else(|| "unknown".to_string()),
            host: System::host_name().unwrap_or_else(|| "unknown".to_string()),
            uptime: System::uptime(),
            used_memory: system.used_memory(),
            total_memory: system.total_memory(),
        }
    }

    pub fn memory_percent(&self) -> f64 {
        percent_of(self.used_memory, self.total_memory)
    }
}

/// Application version plus host information from `sysinfo`
pub struct SystemPanel {
    base: PanelBase,
    system: Mutex<System>,
}

impl SystemPanel {
    pub fn new(source: &PanelConfigSource<'_>, ctx: &AppContext) -> Result<Self, PanelError> {
        let config: PanelConfig = source.decode()?;

        Ok(Self {
            base: PanelBase::new("System", &config, false, ctx),
            system: Mutex::new(System::new()),
        })
    }

    pub fn poll(&self) -> SystemInfo {
        let mut system = self.system.lock().unwrap_or_else(PoisonError::into_inner);
        SystemInfo::poll(&mut system)
    }

    pub fn display(&self, info: &SystemInfo) -> Text<'static> {
        let field = |name: &str, value: String| {
            Line::from(vec![
                Span::styled(format!("{:>8}: ", name), Style::default().fg(Color::Yellow)),
                Span::from(value),
            ])
        };

        let percent = info.memory_percent();
        let memory = Line::from(vec![
            Span::styled(format!("{:>8}: ", "Memory"), Style::default().fg(Color::Yellow)),
            Span::styled(
                format!(
                    "{} / {} ({})",
                    format_bytes(info.used_memory),
                    format_bytes(info.total_memory),
                    format_percentage(percent)
                ),
                Style::default().fg(usage_color(percent)),
            ),
        ]);

        Text::from(vec![
            field("Vers", env!("CARGO_PKG_VERSION").to_string()),
            Line::from(""),
            field("OS", info.os.clone()),
            field("Kernel", info.kernel.clone()),
            field("Host", info.host.clone()),
            field("Uptime", format_uptime(info.uptime)),
            memory,
        ])
    }
}

impl Panel for SystemPanel {
    fn base(&self) -> &PanelBase {
        &self.base
    }

    fn refresh(&self) {
        let info = self.poll();
        self.base.surface().set_text(self.display(&info));
    }
}
