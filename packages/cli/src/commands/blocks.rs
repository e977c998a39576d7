use anyhow::Result;
use clap::Args;
use colored::Colorize;
use tessera_evaluator::{standard_registry, BlockRegistry};

#[derive(Debug, Args)]
pub struct BlocksArgs {
    /// Print the block picker listing as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn blocks(args: BlocksArgs, _cwd: &str) -> Result<()> {
    let registry = standard_registry();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&registry.summaries())?);
        return Ok(());
    }

    print!("{}", listing(&registry));
    Ok(())
}

/// Registry grouped by category, one line per type
fn listing(registry: &BlockRegistry) -> String {
    let mut out = String::new();

    for (category, descriptors) in registry.list_by_category() {
        out.push_str(&format!("{}\n", category.bright_blue().bold()));
        for descriptor in descriptors {
            let slots = descriptor
                .layout
                .as_ref()
                .map(|slots| format!(" [{}]", slots.join(", ")))
                .unwrap_or_default();
            out.push_str(&format!(
                "  {} {}{}\n",
                descriptor.block_type.green(),
                descriptor.label,
                slots.dimmed()
            ));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_groups_by_category() {
        colored::control::set_override(false);
        let text = listing(&standard_registry());

        let layout = text.find("layout\n").unwrap();
        let two_column = text.find("two-column").unwrap();
        assert!(two_column > layout);
        assert!(text.contains("[left, right]"));
        assert!(text.contains("[column1, column2, column3, column4]"));
    }
}
