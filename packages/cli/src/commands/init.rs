use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::Path;
use tessera_blocks::ContentDocument;
use tessera_workspace::{Config, DEFAULT_CONFIG_NAME};

const SAMPLE_CONTENT: &str = r#"{
  "pages": {
    "home": {
      "id": "home",
      "type": "page",
      "data": { "title": "Welcome" },
      "columns": [
        {
          "slot": "body",
          "blocks": [
            { "id": "hero", "type": "h1", "data": { "text": "Hello from tessera" } },
            {
              "id": "intro",
              "type": "two-column",
              "data": { "theme": "light" },
              "columns": [
                {
                  "slot": "left",
                  "blocks": [
                    { "id": "intro-title", "type": "h2", "data": { "text": "Blocks" } },
                    { "id": "intro-text", "type": "content", "data": { "text": "Pages are built from blocks.\n\nLayouts hold blocks in columns." } }
                  ]
                },
                {
                  "slot": "right",
                  "blocks": [
                    { "id": "intro-button", "type": "button", "data": { "label": "Read more", "href": "/about" } }
                  ]
                }
              ]
            },
            { "id": "draft-note", "type": "content", "hidden": true, "data": { "text": "Only visible while editing." } }
          ]
        }
      ]
    },
    "about": {
      "id": "about",
      "type": "page",
      "data": { "title": "About" },
      "columns": [
        {
          "slot": "body",
          "blocks": [
            { "id": "about-title", "type": "h1", "data": { "text": "About" } },
            { "id": "about-spacer", "type": "spacer", "data": { "height": 24 } }
          ]
        }
      ]
    }
  },
  "meta": {
    "navigation": [
      { "label": "Home", "page": "home" },
      { "label": "About", "page": "about" }
    ]
  }
}
"#;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Sample content file to create
    #[arg(short, long, default_value = "content.json")]
    pub content: String,

    /// Port written to the config
    #[arg(short, long, default_value = "3030")]
    pub port: u16,

    /// Force overwrite existing files
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let root = Path::new(cwd);
    let config_path = root.join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing tessera site...".bright_blue().bold());

    let content_path = root.join(&args.content);
    if !content_path.exists() || args.force {
        // catch a broken sample before writing it
        ContentDocument::from_json(SAMPLE_CONTENT)?;
        fs::write(&content_path, SAMPLE_CONTENT)?;
        println!("  {} Created {}", "✓".green(), args.content);
    }

    let config = Config {
        port: args.port,
        content_path: Some(args.content.clone()),
        ..Config::default()
    };
    fs::write(&config_path, config.to_json())?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    println!();
    println!("{}", "✅ Site initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Edit {}", args.content);
    println!("  2. Run: tessera render {} --page home", args.content);
    println!("  3. Run: tessera serve");

    Ok(())
}
