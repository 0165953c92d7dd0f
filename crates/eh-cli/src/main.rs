//! Element Hiding CLI
//!
//! CLI tool for loading filter lists and inspecting the style sheets the
//! engine generates for a domain.

mod lists;

use std::time::Instant;

use clap::{Parser, Subcommand};
use serde::Serialize;

use eh_core::{rules_from_style_sheet, ElemHideStyleSheet, StyleSheetOptions};

use crate::lists::load_engine;

#[derive(Parser)]
#[command(name = "eh-cli")]
#[command(about = "Element hiding style sheet generator and tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the element hiding style sheet for a domain
    Stylesheet {
        /// Input filter list files
        #[arg(short, long, required = true)]
        input: Vec<String>,

        /// Document domain
        #[arg(short, long)]
        domain: String,

        /// Leave out selectors from generic filters
        #[arg(long)]
        specific_only: bool,

        /// Include the list of selectors
        #[arg(long)]
        selectors: bool,

        /// Include the exceptions that suppressed selectors
        #[arg(long)]
        exceptions: bool,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print one CSS rule per line for a domain
    Rules {
        /// Input filter list files
        #[arg(short, long, required = true)]
        input: Vec<String>,

        /// Document domain
        #[arg(short, long)]
        domain: String,
    },

    /// Print index statistics for filter lists
    Stats {
        /// Input filter list files
        #[arg(short, long, required = true)]
        input: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Stylesheet {
            input,
            domain,
            specific_only,
            selectors,
            exceptions,
            json,
            verbose,
        } => {
            let mut options = StyleSheetOptions::empty();
            options.set(StyleSheetOptions::SPECIFIC_ONLY, specific_only);
            options.set(StyleSheetOptions::INCLUDE_SELECTORS, selectors);
            options.set(StyleSheetOptions::INCLUDE_EXCEPTIONS, exceptions);
            cmd_stylesheet(&input, &domain, options, json, verbose)
        }
        Commands::Rules { input, domain } => cmd_rules(&input, &domain),
        Commands::Stats { input } => cmd_stats(&input),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StyleSheetOutput<'a> {
    domain: &'a str,
    code: &'a str,
    selectors: Option<&'a [String]>,
    exceptions: Option<Vec<&'a str>>,
}

impl<'a> StyleSheetOutput<'a> {
    fn new(domain: &'a str, result: &'a ElemHideStyleSheet) -> Self {
        Self {
            domain,
            code: &result.code,
            selectors: result.selectors.as_deref(),
            exceptions: result
                .exceptions
                .as_ref()
                .map(|exceptions| exceptions.iter().map(|e| e.text.as_str()).collect()),
        }
    }
}

fn cmd_stylesheet(
    inputs: &[String],
    domain: &str,
    options: StyleSheetOptions,
    json: bool,
    verbose: bool,
) -> Result<(), String> {
    let (mut engine, _) = load_engine(inputs, verbose)?;

    let start = Instant::now();
    let result = engine.generate_style_sheet_for_domain(domain, options);
    let elapsed = start.elapsed();

    if json {
        let output = serde_json::to_string_pretty(&StyleSheetOutput::new(domain, &result))
            .map_err(|e| format!("Failed to serialize result: {}", e))?;
        println!("{}", output);
        return Ok(());
    }

    print!("{}", result.code);

    if let Some(selectors) = &result.selectors {
        eprintln!("Selectors ({}):", selectors.len());
        for selector in selectors {
            eprintln!("  {}", selector);
        }
    }

    if let Some(exceptions) = &result.exceptions {
        eprintln!("Exceptions ({}):", exceptions.len());
        for exception in exceptions {
            eprintln!("  {}", exception.text);
        }
    }

    if verbose {
        eprintln!("Generated in {:.3}ms", elapsed.as_secs_f64() * 1000.0);
    }

    Ok(())
}

fn cmd_rules(inputs: &[String], domain: &str) -> Result<(), String> {
    let (mut engine, _) = load_engine(inputs, false)?;

    let result = engine.generate_style_sheet_for_domain(domain, StyleSheetOptions::empty());
    for (index, rule) in rules_from_style_sheet(&result.code).enumerate() {
        println!("{:>4}: {} bytes", index + 1, rule.len());
    }

    Ok(())
}

fn cmd_stats(inputs: &[String]) -> Result<(), String> {
    let start = Instant::now();
    let (engine, stats) = load_engine(inputs, true)?;
    let load_time = start.elapsed();

    println!("Loaded {} filter lists", inputs.len());
    println!("  Lines:              {}", stats.lines);
    println!("  Filters:            {} ({} unique)", stats.filters, engine.filter_count());
    println!("  Generic filters:    {}", stats.generic_filters);
    println!("  Exceptions:         {} ({} unique)", stats.exceptions, engine.exceptions().len());
    println!("  Skipped / invalid:  {} / {}", stats.skipped, stats.invalid);
    println!();
    println!("Index:");
    println!("  Unconditional:      {}", engine.unconditional_selector_count());
    println!("  Conditional:        {}", engine.conditional_filter_count());
    println!("  Domain keys:        {}", engine.known_domain_count());
    println!("  Exception domains:  {}", engine.exception_domain_count());
    println!("  Time:               {:.1}ms", load_time.as_secs_f64() * 1000.0);

    Ok(())
}
