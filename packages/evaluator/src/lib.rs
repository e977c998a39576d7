//! Composition engine: turns stored block trees into renderable node trees.
//!
//! ```text
//! ContentDocument ──► resolve_page ──► VNode ──► to_html
//!                        │
//!          ResolveContext (registry, overrides, template, mode)
//! ```

pub mod adapters;
pub mod evaluator;
pub mod html;
pub mod override_resolution;
pub mod registry;
pub mod standard;
pub mod vdom;

#[cfg(test)]
mod tests_error_recovery;

#[cfg(test)]
mod tests_overrides;

#[cfg(test)]
mod tests_scenarios;

pub use adapters::{FlattenImage, InheritTheme};
pub use evaluator::{resolve, resolve_container, resolve_page, EvalError, EvalResult, ResolveContext};
pub use html::{escape_html, render_page_html, to_html, HtmlOptions};
pub use override_resolution::{OverrideResolver, RendererChoice, TemplateOverrides};
pub use registry::{
    renderer_fn, BlockDescriptor, BlockModule, BlockRegistry, BlockRenderer, BlockSummary,
    DataAdapter, EditorSchema, FieldKind, FieldSpec, ParentScope, RegistryError, RenderError,
    RenderInput, RenderMode, RenderedSlot, DEFAULT_CATEGORY,
};
pub use standard::{
    standard_registry, standard_templates, StandardBlocks, BOLD_TEMPLATE, CLASSIC_TEMPLATE,
};
pub use vdom::{NodeIdentity, PlaceholderReason, VNode};
