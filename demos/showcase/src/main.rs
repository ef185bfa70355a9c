//! Widgetry Showcase
//!
//! A command-line tour of the Widgetry widget engine. The three widgets in
//! [`widgets`] are linked into the binary with `#[register_widget]`; their
//! packages are discovered under `widget/` in the package root.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package widgetry-showcase -- catalog
//! cargo run --package widgetry-showcase -- render tags -o limit=3
//! cargo run --package widgetry-showcase -- form newest -o heading=Fresh
//! cargo run --package widgetry-showcase -- scenario
//! ```

mod widgets;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{Level, info};
use widgetry::prelude::*;
use widgetry::runtime::{LoggingBuilder, SpanEvents};

#[derive(Parser, Debug)]
#[command(name = "widgetry-showcase")]
#[command(about = "Discover, configure and render widgets")]
struct Cli {
    /// Package root containing the `widget/` directory
    #[arg(short, long, default_value = env!("CARGO_MANIFEST_DIR"))]
    root: PathBuf,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List discovered widget packages
    Catalog,
    /// List spawnable widgets that are not installed
    Uninstalled,
    /// Render a widget's display view
    Render {
        slug: String,
        /// Option as `key=value`; values that parse as JSON are used as such
        #[arg(short = 'o', long = "option", value_parser = parse_option)]
        options: Vec<(String, Value)>,
    },
    /// Render a widget's edit form
    Form {
        slug: String,
        /// Saved option as `key=value`
        #[arg(short = 'o', long = "option", value_parser = parse_option)]
        options: Vec<(String, Value)>,
    },
    /// Install widgets, place them in an area and render it
    Scenario,
}

fn parse_option(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))?;
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

// ============================================================================
// Commands
// ============================================================================

fn catalog(manager: &WidgetManager) -> Result<()> {
    for entry in manager.catalog().iter() {
        let implemented = if manager.registry().contains(&entry.slug) {
            "linked"
        } else {
            "no implementation"
        };
        println!("{:<10} {:<20} {}", entry.slug, implemented, entry.location.display());
    }
    Ok(())
}

fn uninstalled(manager: &WidgetManager) -> Result<()> {
    for widget in manager.list_uninstalled_widgets()? {
        let hooks: Vec<&str> = widget.capabilities.names().collect();
        println!(
            "{:<10} {:<16} v{:<6} [{}]",
            widget.slug,
            widget.manifest.title,
            widget.manifest.version,
            hooks.join(", ")
        );
    }
    Ok(())
}

fn render(manager: &WidgetManager, slug: &str, options: Options) -> Result<()> {
    let errors = manager.validation_errors(slug, &options)?;
    if !errors.is_empty() {
        for error in &errors {
            eprintln!("invalid: {error}");
        }
        bail!("options for `{slug}` did not validate");
    }

    let options = manager.prepare_options(slug, options)?;
    match manager.render_display(slug, &options)? {
        Some(html) => println!("{html}"),
        None => info!(slug, "Nothing to display"),
    }
    Ok(())
}

fn form(manager: &WidgetManager, slug: &str, saved: Options) -> Result<()> {
    let html = manager.render_form(slug, &saved)?;
    if html.is_empty() {
        info!(slug, "Widget has no editable fields");
    } else {
        println!("{html}");
    }
    Ok(())
}

fn report(step: &str, outcome: Outcome) {
    println!("{step:<32} {}", serde_json::to_string(&outcome).unwrap_or_default());
}

fn scenario(manager: &WidgetManager) -> Result<()> {
    for slug in ["tags", "newest", "html"] {
        report(&format!("install {slug}"), manager.install_widget(slug)?);
    }

    report(
        "add area sidebar",
        manager.add_area(NewArea {
            title: "Sidebar".into(),
            slug: "sidebar".into(),
        })?,
    );
    report(
        "add area (bad slug)",
        manager.add_area(NewArea {
            title: "Footer".into(),
            slug: "foot er".into(),
        })?,
    );

    let sidebar = manager
        .get_area("sidebar")?
        .context("sidebar area was not created")?;
    let installed = |slug: &str| -> Result<u64> {
        Ok(manager
            .get_widget(slug)?
            .with_context(|| format!("widget `{slug}` is not installed"))?
            .id)
    };

    report(
        "place newest (invalid limit)",
        manager.add_instance(
            "Newest",
            installed("newest")?,
            sidebar.id,
            options([("limit", "4")]),
        )?,
    );
    report(
        "place newest",
        manager.add_instance(
            "Newest",
            installed("newest")?,
            sidebar.id,
            options([("limit", "3"), ("heading", "  From the blog  ")]),
        )?,
    );
    report(
        "place tags",
        manager.add_instance("Tags", installed("tags")?, sidebar.id, options([("limit", "4")]))?,
    );
    report(
        "place html",
        manager.add_instance(
            "Welcome",
            installed("html")?,
            sidebar.id,
            options([("html", "<p><strong>Welcome!</strong></p>")]),
        )?,
    );

    // Move the welcome message to the top.
    if let Some(welcome) = manager
        .list_instances_in_area("sidebar")?
        .into_iter()
        .find(|i| i.slug == "html")
    {
        manager.update_instance_order(welcome.id, 0)?;
        for other in manager.list_instances_in_area("sidebar")? {
            if other.id != welcome.id {
                manager.update_instance_order(other.id, other.order + 1)?;
            }
        }
    }

    println!();
    for rendered in manager.render_area("sidebar")? {
        println!("<!-- #{} {} ({}) -->", rendered.id, rendered.title, rendered.slug);
        println!("{}", rendered.html.trim_end());
    }

    if let Some(newest) = manager
        .list_instances_in_area("sidebar")?
        .into_iter()
        .find(|i| i.slug == "newest")
    {
        println!();
        println!("<!-- edit form of #{} -->", newest.id);
        println!("{}", manager.render_form("newest", &newest.options)?.trim_end());
    }

    Ok(())
}

fn options<const N: usize>(pairs: [(&str, &str); N]) -> Options {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
        .collect()
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Custom logging must be installed before the runtime is built.
    if cli.verbose {
        LoggingBuilder::new()
            .with_level(Level::DEBUG)
            .directive("minijinja=info")
            .span_events(SpanEvents::NONE)
            .with_target(true)
            .init();
    }

    let runtime = WidgetRuntime::builder()
        .search_path(&cli.root)
        .init_logging(!cli.verbose)
        .package_path(&cli.root)
        .build()?;
    let manager = runtime.manager();

    match cli.command {
        Command::Catalog => catalog(manager),
        Command::Uninstalled => uninstalled(manager),
        Command::Render { slug, options } => render(manager, &slug, options.into_iter().collect()),
        Command::Form { slug, options } => form(manager, &slug, options.into_iter().collect()),
        Command::Scenario => scenario(manager),
    }
}
