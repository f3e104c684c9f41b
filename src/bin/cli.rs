//! uix-inspector command line
//!
//! Offline queries against a uiautomator dump: render the tree, hit test a
//! screenshot point, show one element, find elements, or export everything
//! as JSON.

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use uix_inspector::hierarchy::{LocatorAttribute, Point};
use uix_inspector::inspector::{InspectorOptions, InspectorSession, LoadedHierarchy};

#[derive(Parser)]
#[command(name = "uix-inspector")]
#[command(version)]
#[command(about = "Inspect Android uiautomator hierarchy dumps", long_about = None)]
struct Cli {
    /// Tag name of element markers in the dump
    #[arg(long, global = true, default_value = "node")]
    element_tag: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct DumpArgs {
    /// Path to the .uix/.xml dump
    dump: PathBuf,

    /// Screenshot defining the coordinate space
    #[arg(long, short = 's', value_name = "PATH")]
    screenshot: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the element tree
    Tree {
        #[command(flatten)]
        dump: DumpArgs,

        /// Omit elements deeper than this
        #[arg(long)]
        max_depth: Option<usize>,
    },
    /// Show the most specific element under a point
    At {
        #[command(flatten)]
        dump: DumpArgs,

        x: i32,
        y: i32,
    },
    /// Show properties and locators of one element
    Inspect {
        #[command(flatten)]
        dump: DumpArgs,

        index: usize,
    },
    /// Find elements by indicator, attribute value or absolute path
    Find {
        #[command(flatten)]
        dump: DumpArgs,

        /// Exact indicator, e.g. 'text="OK"'
        #[arg(long, conflicts_with_all = ["attribute", "path"])]
        indicator: Option<String>,

        /// Attribute to compare, used with --value
        #[arg(long, value_parser = parse_attribute, requires = "value")]
        attribute: Option<LocatorAttribute>,

        #[arg(long)]
        value: Option<String>,

        /// Exact absolute path, e.g. /FrameLayout[1]/Button[2]
        #[arg(long)]
        path: Option<String>,
    },
    /// Export every element with its locators as JSON
    Export {
        #[command(flatten)]
        dump: DumpArgs,
    },
}

fn parse_attribute(raw: &str) -> std::result::Result<LocatorAttribute, String> {
    serde_json::from_value(serde_json::Value::String(raw.replace('-', "_")))
        .map_err(|_| format!("unknown attribute '{}' (resource_id, class, text, content_desc)", raw))
}

fn load(session: &InspectorSession, args: &DumpArgs) -> Result<Arc<LoadedHierarchy>> {
    session
        .load_files(&args.dump, args.screenshot.as_deref())
        .with_context(|| format!("Failed to load {}", args.dump.display()))
}

fn print_element(session: &InspectorSession, index: usize) -> Result<()> {
    let view = session.describe(index)?;
    println!("{}", view.record.tree_label());
    for (key, value) in view.record.properties() {
        println!("  {:<20} {}", key, value);
    }
    println!("  {:<20} {}", "highlight", view.highlight);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let session = InspectorSession::new(InspectorOptions::new().element_tag(cli.element_tag));

    match cli.command {
        Commands::Tree { dump, max_depth } => {
            let loaded = load(&session, &dump)?;
            for line in loaded.tree().tree_lines(max_depth) {
                println!("{}{}", "  ".repeat(line.depth.saturating_sub(1)), line.label);
            }
        }
        Commands::At { dump, x, y } => {
            load(&session, &dump)?;
            match session.element_at(Point::new(x, y))? {
                Some(focus) => print_element(&session, focus.index)?,
                None => bail!("No element contains ({}, {})", x, y),
            }
        }
        Commands::Inspect { dump, index } => {
            load(&session, &dump)?;
            print_element(&session, index)?;
        }
        Commands::Find {
            dump,
            indicator,
            attribute,
            value,
            path,
        } => {
            let loaded = load(&session, &dump)?;
            let tree = loaded.tree();
            let matches: Vec<usize> = match (indicator, attribute.zip(value), path) {
                (Some(indicator), _, _) => tree.find_by_indicator(&indicator).into_iter().collect(),
                (None, Some((attribute, value)), _) => tree.find_by_attribute(attribute, &value),
                (None, None, Some(path)) => tree.find_by_absolute_path(&path).into_iter().collect(),
                (None, None, None) => bail!("Pass --indicator, --attribute with --value, or --path"),
            };

            for index in &matches {
                if let Some(node) = tree.get(*index) {
                    println!("[{}] {}  {}", index, node.record.tree_label(), node.record.locator.best_locator());
                }
            }
            log::info!("{} match(es)", matches.len());
        }
        Commands::Export { dump } => {
            let loaded = load(&session, &dump)?;
            println!("{}", loaded.tree().to_json()?);
        }
    }

    Ok(())
}
