// tiledash-core/src/registry.rs
use crate::config::{PanelConfigSource, RawPanelConfig};
use crate::context::AppContext;
use crate::panel::{Panel, PanelError};
use crate::panel_set::ActivePanelSet;
use std::collections::HashMap;
use std::sync::Arc;

/// Builds one panel from its config block
pub type PanelFactory = Box<
    dyn Fn(&PanelConfigSource<'_>, &AppContext) -> Result<Arc<dyn Panel>, PanelError> + Send + Sync,
>;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("could not initialize panel configured as type '{0}': no panel of that type is registered")]
    UnknownType(String),
    #[error("panel of type '{kind}' failed to initialize: {source}")]
    Construction {
        kind: String,
        #[source]
        source: PanelError,
    },
}

/// Maps the `type` of a config block to the factory that builds it.
/// Filled once at startup, read-only afterwards.
#[derive(Default)]
pub struct PanelRegistry {
    factories: HashMap<String, PanelFactory>,
}

impl PanelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registering a type twice keeps the last factory
    pub fn register(&mut self, name: &str, factory: PanelFactory) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Registered type names, sorted
    pub fn types(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Instantiate every enabled config block in file order.
    ///
    /// Disabled blocks are skipped without being constructed. An unknown
    /// type or a failing constructor aborts the whole build.
    pub fn build(
        &self,
        configs: &[RawPanelConfig],
        ctx: &AppContext,
    ) -> Result<ActivePanelSet, RegistryError> {
        let mut panels = ActivePanelSet::new();

        for raw in configs {
            if !raw.enabled() {
                tracing::debug!(kind = raw.kind(), "skipping disabled panel");
                continue;
            }

            let factory = self
                .factories
                .get(raw.kind())
                .ok_or_else(|| RegistryError::UnknownType(raw.kind().to_string()))?;

            let source = PanelConfigSource::new(raw, &ctx.config);
            let panel = factory(&source, ctx).map_err(|source| RegistryError::Construction {
                kind: raw.kind().to_string(),
                source,
            })?;

            tracing::debug!(kind = raw.kind(), title = panel.title(), "panel created");
            panels.add(panel);
        }

        Ok(panels)
    }
}

/// Register a panel type whose constructor is
/// `fn new(&PanelConfigSource, &AppContext) -> Result<Self, PanelError>`
#[macro_export]
macro_rules! register_panel {
    ($registry:expr, $name:expr, $panel_type:ty) => {
        $registry.register(
            $name,
            Box::new(|source, ctx| {
                let panel = <$panel_type>::new(source, ctx)?;
                Ok(::std::sync::Arc::new(panel) as ::std::sync::Arc<dyn $crate::Panel>)
            }),
        );
    };
}
