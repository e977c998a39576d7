//! One rendering pipeline for published pages, previews and the editor canvas.

use std::sync::Arc;
use tessera_blocks::ContentDocument;
use tessera_evaluator::{
    render_page_html, resolve_page, BlockRegistry, EvalResult, HtmlOptions, RenderMode,
    ResolveContext, TemplateOverrides, VNode,
};

/// Page key served at `/`
pub const HOME_PAGE: &str = "home";

#[derive(Clone, Debug)]
pub struct SiteRenderer {
    registry: Arc<BlockRegistry>,
    overrides: Arc<TemplateOverrides>,
    default_template: Option<String>,
}

impl SiteRenderer {
    pub fn new(registry: Arc<BlockRegistry>, overrides: Arc<TemplateOverrides>) -> Self {
        Self {
            registry,
            overrides,
            default_template: None,
        }
    }

    pub fn with_default_template(mut self, template: Option<String>) -> Self {
        self.default_template = template;
        self
    }

    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    pub fn overrides(&self) -> &TemplateOverrides {
        &self.overrides
    }

    /// Template in effect for `doc`: its own, else the configured default
    pub fn template_for(&self, doc: &ContentDocument) -> Option<String> {
        doc.meta
            .template
            .clone()
            .or_else(|| self.default_template.clone())
    }

    pub fn context(&self, doc: &ContentDocument, mode: RenderMode) -> ResolveContext<'_> {
        let ctx = ResolveContext::new(&self.registry, &self.overrides).with_mode(mode);
        match self.template_for(doc) {
            Some(template) => ctx.with_template(template),
            None => ctx,
        }
    }

    pub fn render_page(
        &self,
        doc: &ContentDocument,
        page: &str,
        mode: RenderMode,
    ) -> EvalResult<VNode> {
        resolve_page(doc, page, &self.context(doc, mode))
    }

    /// Full public HTML document for `page`
    pub fn render_page_html(&self, doc: &ContentDocument, page: &str) -> EvalResult<String> {
        let node = self.render_page(doc, page, RenderMode::Public)?;
        let title = doc
            .page(page)
            .and_then(|root| root.data_str("title"))
            .unwrap_or(page);
        Ok(render_page_html(title, &node, &HtmlOptions::default()))
    }
}
