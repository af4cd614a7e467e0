use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use super::builtin;
use super::ResourceAdapter;
use crate::constants::ALL_ACTIONS;
use crate::constants::EVENT_NAME_SEPARATOR;
use crate::ResourceConfig;
use crate::Result;

/// Resource name to adapter lookup shared by the normalizer and engine
#[derive(Debug, Clone, Default)]
pub struct ResourceCatalog {
    adapters: BTreeMap<String, Arc<dyn ResourceAdapter>>,
}

impl ResourceCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Catalog holding the comments, contact requests, notifications and
    /// chat groups adapters.
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        for spec in builtin::all() {
            catalog.register(Arc::new(spec));
        }
        catalog
    }

    /// Built-in adapters plus every configured resource. A configured
    /// resource with a built-in name replaces the built-in adapter.
    pub fn from_config(resources: &[ResourceConfig]) -> Result<Self> {
        let mut catalog = Self::builtin();
        for resource in resources {
            resource.validate()?;
            catalog.register(Arc::new(resource.to_spec()));
        }
        Ok(catalog)
    }

    pub fn with_adapter(
        mut self,
        adapter: Arc<dyn ResourceAdapter>,
    ) -> Self {
        self.register(adapter);
        self
    }

    pub fn register(
        &mut self,
        adapter: Arc<dyn ResourceAdapter>,
    ) {
        let name = adapter.name().to_string();
        if self.adapters.insert(name.clone(), adapter).is_some() {
            debug!(resource = %name, "Replaced resource adapter");
        }
    }

    pub fn get(
        &self,
        resource: &str,
    ) -> Option<&Arc<dyn ResourceAdapter>> {
        self.adapters.get(resource)
    }

    pub fn contains(
        &self,
        resource: &str,
    ) -> bool {
        self.adapters.contains_key(resource)
    }

    pub fn resources(&self) -> impl Iterator<Item = &str> {
        self.adapters.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Every `<resource>:<action>` push event name the catalog understands
    pub fn event_names(&self) -> Vec<String> {
        self.adapters
            .keys()
            .flat_map(|resource| {
                ALL_ACTIONS
                    .iter()
                    .map(move |action| format!("{resource}{EVENT_NAME_SEPARATOR}{action}"))
            })
            .collect()
    }
}
