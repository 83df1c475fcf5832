//! propcascade CLI - inspect what a location list loads to
//!
//! Usage:
//!   propcascade load classpath:app.properties,file:/etc/app.properties
//!   propcascade get classpath:app.properties database.url
//!   propcascade check classpath:app.properties,file:local.properties
//!   propcascade publish -D propertyLocations=classpath:app.properties -D user=max

use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use propcascade_core::{
    format, parse_locations, resolve_placeholders, Loader, LoaderOptions, PropertySet,
    PropertyStore, PROPERTY_LOCATIONS,
};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::logger;

/// propcascade - Cascading properties loader
#[derive(Parser)]
#[command(name = "propcascade")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory searched for classpath: resources (repeatable, defaults to the current directory)
    #[arg(long = "resource-root", value_name = "DIR", global = true)]
    resource_roots: Vec<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a location list and print the merged properties
    Load {
        /// Comma-separated locations (classpath:... or file:...)
        locations: String,

        /// Keep ${...} placeholders instead of resolving them
        #[arg(long)]
        raw: bool,

        /// Fail on the first location that can't be loaded
        #[arg(long)]
        strict: bool,

        /// Output format: properties, json, yaml
        #[arg(short, long, default_value = "properties")]
        format: String,

        /// Write to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a single property
    Get {
        /// Comma-separated locations (classpath:... or file:...)
        locations: String,

        /// Property key
        key: String,

        /// Keep ${...} placeholders instead of resolving them
        #[arg(long)]
        raw: bool,

        /// Fail on the first location that can't be loaded
        #[arg(long)]
        strict: bool,

        /// Value to print if the key is not set
        #[arg(short, long)]
        default: Option<String>,
    },

    /// Try every location of a list and report which ones load
    Check {
        /// Comma-separated locations (classpath:... or file:...)
        locations: String,
    },

    /// Seed a store, run the one-time load into it and print the result
    Publish {
        /// Property already present in the store before loading
        #[arg(short = 'D', value_name = "KEY=VALUE", value_parser = parse_define)]
        defines: Vec<(String, String)>,

        /// Shorthand for -D propertyLocations=LOCATIONS
        #[arg(short, long)]
        locations: Option<String>,

        /// Output format: properties, json, yaml
        #[arg(short, long, default_value = "properties")]
        format: String,
    },
}

/// Run the CLI with the process arguments
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    let loader = build_loader(cli.resource_roots);

    match cli.command {
        Commands::Load {
            locations,
            raw,
            strict,
            format,
            output,
        } => cmd_load(&loader, &locations, raw, strict, &format, output),

        Commands::Get {
            locations,
            key,
            raw,
            strict,
            default,
        } => cmd_get(&loader, &locations, &key, raw, strict, default),

        Commands::Check { locations } => cmd_check(&loader, &locations),

        Commands::Publish {
            defines,
            locations,
            format,
        } => cmd_publish(&loader, defines, locations, &format),
    }
}

fn parse_define(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;
    if key.trim().is_empty() {
        return Err(format!("empty key in '{}'", raw));
    }
    Ok((key.trim().to_string(), value.to_string()))
}

fn build_loader(mut resource_roots: Vec<PathBuf>) -> Loader {
    if resource_roots.is_empty() {
        resource_roots.push(PathBuf::from("."));
    }
    Loader::with_options(LoaderOptions {
        resource_roots,
        ..LoaderOptions::default()
    })
}

fn load_properties(loader: &Loader, locations: &str, strict: bool) -> Result<PropertySet, String> {
    if strict {
        loader
            .try_load_locations(locations)
            .map_err(|e| e.to_string())
    } else {
        Ok(loader.load_locations(locations))
    }
}

fn render(props: &PropertySet, format: &str) -> Result<String, String> {
    match format {
        "properties" => Ok(format::write(props)),
        "json" => serde_json::to_string_pretty(props)
            .map(|json| json + "\n")
            .map_err(|e| e.to_string()),
        "yaml" | "yml" => serde_yaml::to_string(props).map_err(|e| e.to_string()),
        _ => Err(format!(
            "Unsupported format: {}. Use properties, json, or yaml.",
            format
        )),
    }
}

fn cmd_load(
    loader: &Loader,
    locations: &str,
    raw: bool,
    strict: bool,
    format: &str,
    output: Option<PathBuf>,
) -> ExitCode {
    let mut props = match load_properties(loader, locations, strict) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}", e.red());
            return ExitCode::from(2);
        }
    };

    if !raw {
        resolve_placeholders(&mut props);
    }

    let content = match render(&props, format) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            return ExitCode::from(1);
        }
    };

    if let Some(output_path) = output {
        if let Err(e) = std::fs::write(&output_path, &content) {
            eprintln!("{}: {}", "Error writing file".red(), e);
            return ExitCode::from(2);
        }
        eprintln!("{} Wrote to {}", "✓".green(), output_path.display());
    } else {
        print!("{}", content);
    }
    ExitCode::SUCCESS
}

fn cmd_get(
    loader: &Loader,
    locations: &str,
    key: &str,
    raw: bool,
    strict: bool,
    default: Option<String>,
) -> ExitCode {
    let mut props = match load_properties(loader, locations, strict) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}", e.red());
            return ExitCode::from(2);
        }
    };

    if !raw {
        resolve_placeholders(&mut props);
    }

    match (props.get(key), default) {
        (Some(value), _) => {
            println!("{}", value);
            ExitCode::SUCCESS
        }
        (None, Some(default_val)) => {
            println!("{}", default_val);
            ExitCode::SUCCESS
        }
        (None, None) => {
            eprintln!("{}: Property '{}' not found", "Error".red(), key);
            ExitCode::from(1)
        }
    }
}

fn cmd_check(loader: &Loader, locations: &str) -> ExitCode {
    let mut all_valid = true;

    for parsed in parse_locations(locations) {
        let location = match parsed {
            Ok(l) => l,
            Err(e) => {
                eprintln!("{} {}", "✗".red(), e);
                all_valid = false;
                continue;
            }
        };

        match loader.load_location(&location) {
            Ok(props) => println!(
                "{} {}: {} properties",
                "✓".green(),
                location,
                props.len()
            ),
            Err(e) => {
                eprintln!("{} {}: {}", "✗".red(), location, e);
                all_valid = false;
            }
        }
    }

    if all_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

fn cmd_publish(
    loader: &Loader,
    defines: Vec<(String, String)>,
    locations: Option<String>,
    format: &str,
) -> ExitCode {
    let mut seed: PropertySet = defines.into_iter().collect();
    if let Some(locations) = locations {
        seed.insert(PROPERTY_LOCATIONS, locations);
    }

    let store = PropertyStore::with_properties(seed);
    store.load_and_publish(loader);

    match render(&store.snapshot(), format) {
        Ok(content) => {
            print!("{}", content);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            ExitCode::from(1)
        }
    }
}
