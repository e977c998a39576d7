use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tessera_blocks::ContentDocument;
use tessera_evaluator::{
    render_page_html, resolve_page, standard_registry, standard_templates, to_html, HtmlOptions,
    RenderMode,
};
use tessera_workspace::{Config, SiteRenderer, HOME_PAGE};

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Content document (JSON)
    pub content: String,

    /// Page key to render
    #[arg(short, long, default_value = HOME_PAGE)]
    pub page: String,

    /// Presentation template (overrides the document's own)
    #[arg(short, long)]
    pub template: Option<String>,

    /// Render the editing view: hidden blocks kept and marked
    #[arg(long)]
    pub editing: bool,

    /// Only the page body, without the surrounding HTML document
    #[arg(long)]
    pub fragment: bool,

    /// No indentation or newlines
    #[arg(long)]
    pub compact: bool,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,
}

pub fn render(args: RenderArgs, cwd: &str) -> Result<()> {
    tessera_workspace::init_tracing("warn");

    let html = render_to_string(&args, cwd)?;

    match &args.output {
        Some(output) => {
            let path = Path::new(cwd).join(output);
            fs::write(&path, html)?;
            eprintln!("  {} {} → {}", "✓".green(), args.page, output);
        }
        None => println!("{}", html),
    }
    Ok(())
}

pub fn render_to_string(args: &RenderArgs, cwd: &str) -> Result<String> {
    let path = Path::new(cwd).join(&args.content);
    let json = fs::read_to_string(&path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    let doc = ContentDocument::from_json(&json)
        .with_context(|| format!("Invalid content document {}", path.display()))?;

    let config = Config::load(cwd)?;
    let site = SiteRenderer::new(
        Arc::new(standard_registry()),
        Arc::new(standard_templates()),
    )
    .with_default_template(config.default_template);

    let mode = if args.editing {
        RenderMode::Editing
    } else {
        RenderMode::Public
    };
    let mut ctx = site.context(&doc, mode);
    if let Some(template) = &args.template {
        ctx = ctx.with_template(template.clone());
    }

    let node = resolve_page(&doc, &args.page, &ctx)?;
    let placeholders = node.placeholders().len();
    if placeholders > 0 {
        eprintln!(
            "  {} {} block(s) rendered as placeholders",
            "⚠️".yellow(),
            placeholders
        );
    }

    let options = if args.compact {
        HtmlOptions::compact()
    } else {
        HtmlOptions::default()
    };

    if args.fragment {
        return Ok(to_html(&node, &options));
    }
    let title = doc
        .page(&args.page)
        .and_then(|root| root.data_str("title"))
        .unwrap_or(args.page.as_str());
    Ok(render_page_html(title, &node, &options))
}
