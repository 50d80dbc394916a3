//! CLI wrapper for the modlink module loader.
//!
//! Usage:
//!   modlink <entry>                     # Import a module from the current directory
//!   modlink --root dist <entry>         # Canonical paths are rooted at dist/
//!   modlink --config modlink.toml       # Root, entry, interop and globals from a file
//!   modlink --tokens <file>             # Print the parse tree of one module file

use clap::Parser as ClapParser;
use log::error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use modlink::parser::parse_to_token_tree;
use modlink::runner::ds::value::Value;
use modlink::runner::eval::ScriptEvaluator;
use modlink::runner::loader::{DirectoryFetcher, LoaderConfig, System};

const DEFAULT_ROOT: &str = ".";

#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Canonical path of the module to import
    #[arg(required = false, help = "Entry module, e.g. /index.module.js")]
    entry: Option<String>,

    /// Loader config file
    #[arg(long, short, help = "Path to a modlink.toml config file")]
    config: Option<PathBuf>,

    /// Directory canonical paths are rooted in
    #[arg(long, help = "Asset root directory (overrides the config file)")]
    root: Option<PathBuf>,

    /// Print the parse tree instead of importing
    #[arg(long, help = "Dump the token tree of the entry file")]
    tokens: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match LoaderConfig::load(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("{}", err);
                process::exit(1);
            }
        },
        None => LoaderConfig::new(),
    };

    let root = cli
        .root
        .clone()
        .or_else(|| config.asset_root.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT));

    let entry = match cli.entry.clone().or_else(|| config.entry.clone()) {
        Some(entry) => entry,
        None => {
            eprintln!("No entry module given and none configured");
            process::exit(2);
        }
    };

    if cli.tokens {
        dump_tokens(&DirectoryFetcher::new(root).location(&entry));
        return;
    }

    let system = System::builder(DirectoryFetcher::new(root), ScriptEvaluator::new())
        .config(&config)
        .build();

    match system.import(&entry) {
        Ok(exports) => {
            println!("{}", Value::Object(exports));
        }
        Err(err) => {
            error!("{}", err);
            eprintln!("Error: {}", err);
            process::exit(1);
        }
    }
}

fn dump_tokens(path: &Path) {
    let source = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            eprintln!("Error reading file '{}': {}", path.display(), err);
            process::exit(1);
        }
    };
    match parse_to_token_tree(&source) {
        Ok(tree) => println!("{}", tree),
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    }
}
