// tiledash-core/src/display.rs
use crate::config::AppConfig;
use crate::grid::{Grid, split_size};
use crate::overlay::Overlays;
use crate::panel::Panel;
use crate::panel_set::ActivePanelSet;
use crate::surface::SurfaceId;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    prelude::Widget as RatatuiWidget,
    style::{Color, Style},
    widgets::Block,
};
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// What currently receives keyboard input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFocus {
    #[default]
    Nothing,
    Surface(SurfaceId),
    /// A modal overlay sits above the grid
    Overlay,
}

#[derive(Debug, Default)]
struct HostState {
    current: InputFocus,
    before_overlay: InputFocus,
}

/// Owner of the input-focus primitive. Panels never hold focus
/// themselves; the focus tracker and overlays move it through here.
#[derive(Debug, Clone, Default)]
pub struct FocusHost {
    state: Arc<Mutex<HostState>>,
}

impl FocusHost {
    fn lock(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn current(&self) -> InputFocus {
        self.lock().current
    }

    pub fn set_focus(&self, id: SurfaceId) {
        self.lock().current = InputFocus::Surface(id);
    }

    /// Drop focus from `id`. Leaves focus alone if something else holds it.
    pub fn blur(&self, id: SurfaceId) {
        let mut state = self.lock();
        if state.current == InputFocus::Surface(id) {
            state.current = InputFocus::Nothing;
        }
    }

    pub fn reset(&self) {
        *self.lock() = HostState::default();
    }

    pub(crate) fn enter_overlay(&self) {
        let mut state = self.lock();
        if state.current != InputFocus::Overlay {
            state.before_overlay = state.current;
            state.current = InputFocus::Overlay;
        }
    }

    pub(crate) fn leave_overlay(&self) {
        let mut state = self.lock();
        if state.current == InputFocus::Overlay {
            state.current = std::mem::take(&mut state.before_overlay);
        }
    }
}

/// Lays the enabled panels of one generation out on the screen grid
pub struct Display {
    grid: Grid,
    panels: Vec<Arc<dyn Panel>>,
    background: Color,
    overlays: Overlays,
}

impl Display {
    /// `terminal_size` reports `(columns, rows)`; it is only consulted when
    /// the config asks for an even split of the terminal.
    pub fn new(
        panels: &ActivePanelSet,
        config: &AppConfig,
        overlays: Overlays,
        terminal_size: &dyn Fn() -> io::Result<(u16, u16)>,
    ) -> Self {
        // Disabled panels take no space at all
        let panels = panels.enabled();
        let positions: Vec<_> = panels.iter().map(|p| p.position()).collect();

        let grid_config = &config.grid;
        let size = if grid_config.num_cols > 0 || grid_config.num_rows > 0 {
            match terminal_size() {
                Ok(size) => Some(size),
                Err(e) => {
                    tracing::error!(error = %e, "could not determine terminal size");
                    None
                }
            }
        } else {
            None
        };

        let columns = match size {
            Some((width, _)) if grid_config.num_cols > 0 => {
                split_size(width as i32, grid_config.num_cols as i32)
            }
            _ => grid_config.columns.clone(),
        };
        let rows = match size {
            Some((_, height)) if grid_config.num_rows > 0 => {
                split_size(height as i32, grid_config.num_rows as i32)
            }
            _ => grid_config.rows.clone(),
        };

        Self {
            grid: Grid::from_sizes(&columns, &rows, &positions),
            panels,
            background: config.colors.background.to_color(),
            overlays,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    /// Screen area of every placed panel, in drawing order
    pub fn panel_areas(&self, area: Rect) -> Vec<(SurfaceId, Rect)> {
        self.panels
            .iter()
            .filter_map(|panel| {
                self.grid
                    .area_for(area, &panel.position())
                    .map(|rect| (panel.surface().id(), rect))
            })
            .collect()
    }

    /// Draw the grid. Overlapping panels are drawn in construction order,
    /// so the last one constructed ends up on top.
    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        RatatuiWidget::render(
            Block::default().style(Style::default().bg(self.background)),
            area,
            buf,
        );

        for panel in &self.panels {
            if let Some(rect) = self.grid.area_for(area, &panel.position()) {
                panel.surface().render(rect, buf);
            }
        }

        self.overlays.render(area, buf);
    }
}
