//! Template Override Resolution
//!
//! A presentation template can substitute its own renderer for any block
//! type. For every instance the renderer is chosen in this order:
//!
//! 1. override declared by the active template for the block type
//! 2. renderer registered for the block type
//! 3. fallback (unsupported-type placeholder)
//!
//! The editor preview and the published page both go through
//! [`OverrideResolver::resolve`], so they always pick the same renderer.

use crate::registry::{BlockRegistry, BlockRenderer};
use std::collections::HashMap;
use std::sync::Arc;

/// Per-template substitute renderers, keyed by template then block type
#[derive(Default, Clone)]
pub struct TemplateOverrides {
    templates: HashMap<String, HashMap<String, Arc<dyn BlockRenderer>>>,
}

impl TemplateOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        template: impl Into<String>,
        block_type: impl Into<String>,
        renderer: Arc<dyn BlockRenderer>,
    ) {
        self.templates
            .entry(template.into())
            .or_default()
            .insert(block_type.into(), renderer);
    }

    pub fn with_override(
        mut self,
        template: impl Into<String>,
        block_type: impl Into<String>,
        renderer: Arc<dyn BlockRenderer>,
    ) -> Self {
        self.insert(template, block_type, renderer);
        self
    }

    pub fn get(&self, template: &str, block_type: &str) -> Option<&Arc<dyn BlockRenderer>> {
        self.templates.get(template)?.get(block_type)
    }

    pub fn has_template(&self, template: &str) -> bool {
        self.templates.contains_key(template)
    }

    /// Template keys, sorted
    pub fn templates(&self) -> Vec<&str> {
        let mut keys: Vec<_> = self.templates.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Block types a template overrides, sorted
    pub fn overridden_types(&self, template: &str) -> Vec<&str> {
        let mut types: Vec<_> = self
            .templates
            .get(template)
            .map(|m| m.keys().map(String::as_str).collect())
            .unwrap_or_default();
        types.sort_unstable();
        types
    }
}

impl std::fmt::Debug for TemplateOverrides {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for template in self.templates() {
            map.entry(&template, &self.overridden_types(template));
        }
        map.finish()
    }
}

/// Which tier supplied the renderer
pub enum RendererChoice<'r> {
    Override(&'r Arc<dyn BlockRenderer>),
    Registry(&'r Arc<dyn BlockRenderer>),
    Fallback,
}

impl<'r> RendererChoice<'r> {
    pub fn renderer(&self) -> Option<&'r Arc<dyn BlockRenderer>> {
        match self {
            RendererChoice::Override(r) | RendererChoice::Registry(r) => Some(r),
            RendererChoice::Fallback => None,
        }
    }

    pub fn source(&self) -> &'static str {
        match self {
            RendererChoice::Override(_) => "override",
            RendererChoice::Registry(_) => "registry",
            RendererChoice::Fallback => "fallback",
        }
    }
}

/// Override resolver
pub struct OverrideResolver<'r> {
    overrides: &'r TemplateOverrides,
    registry: &'r BlockRegistry,
}

impl<'r> OverrideResolver<'r> {
    pub fn new(overrides: &'r TemplateOverrides, registry: &'r BlockRegistry) -> Self {
        Self {
            overrides,
            registry,
        }
    }

    pub fn resolve(&self, template: Option<&str>, block_type: &str) -> RendererChoice<'r> {
        if let Some(renderer) = template.and_then(|t| self.overrides.get(t, block_type)) {
            return RendererChoice::Override(renderer);
        }

        match self.registry.lookup(block_type) {
            Some(descriptor) => RendererChoice::Registry(&descriptor.renderer),
            None => RendererChoice::Fallback,
        }
    }
}
