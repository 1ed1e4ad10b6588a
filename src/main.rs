use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use strk_decode::config::{self, Config};
use strk_decode::domain::abi::{parse_type, AbiCatalog, AbiDecoder, FeltStringPolicy, Record};
use strk_decode::domain::parse_felts;
use strk_decode::infrastructure::CatalogDecoder;
use strk_decode::modules::export::{self, OutputFormat};

#[derive(Debug, Parser)]
#[command(
    name = "strk-decode",
    version,
    about = "Decode Starknet call results and events with a Cairo ABI"
)]
struct Args {
    /// Output format (defaults to the config file, then json)
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// Never read bare felts as packed byte arrays
    #[arg(long, global = true)]
    strict_felts: bool,

    /// Write the result to a file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Log decoding decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Decode a function call result
    Function {
        /// ABI file, or `@name` from the config `[abis]` table
        #[arg(long)]
        abi: String,

        /// Function name
        #[arg(long)]
        name: String,

        /// Result felts (decimal or 0x hex); read from stdin when omitted
        felts: Vec<String>,
    },
    /// Decode an event from its keys and data
    Event {
        #[arg(long)]
        abi: String,

        /// Event name, fully qualified or the last path segment
        #[arg(long)]
        name: String,

        #[arg(long, value_delimiter = ',')]
        keys: Vec<String>,

        #[arg(long, value_delimiter = ',')]
        data: Vec<String>,
    },
    /// List the functions, events and types declared in an ABI
    Catalog {
        #[arg(long)]
        abi: String,
    },
    /// Parse a type descriptor and print its schema
    Type { descriptor: String },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = config::load();
    let format = args.format.unwrap_or(config.output.format);

    match &args.command {
        Command::Function { abi, name, felts } => {
            let decoder = load_decoder(&config, abi, args.strict_felts)?;
            let raw = if felts.is_empty() {
                read_stdin_felts()?
            } else {
                felts.clone()
            };
            let record = decoder
                .decode_function_result(&raw, name)
                .with_context(|| format!("decode result of `{name}`"))?;
            emit_record(&record, format, args.output.as_deref())
        }
        Command::Event {
            abi,
            name,
            keys,
            data,
        } => {
            let decoder = load_decoder(&config, abi, args.strict_felts)?;
            let keys = parse_felts(keys)?;
            let data = parse_felts(data)?;
            let record = decoder
                .decode_event(name, &keys, &data)
                .with_context(|| format!("decode event `{name}`"))?;
            emit_record(&record, format, args.output.as_deref())
        }
        Command::Catalog { abi } => {
            let catalog = load_catalog(&config, abi)?;
            let rendered = export::render_catalog(&catalog, format)?;
            emit(&rendered, args.output.as_deref())
        }
        Command::Type { descriptor } => {
            let schema = parse_type(descriptor.as_str());
            let rendered = match format {
                OutputFormat::Json => serde_json::to_string_pretty(&schema)? + "\n",
                OutputFormat::Text | OutputFormat::Csv => format!("{schema}\n"),
            };
            emit(&rendered, args.output.as_deref())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_catalog(config: &Config, abi: &str) -> Result<AbiCatalog> {
    let path = config.resolve_abi(abi)?;
    let content =
        fs::read_to_string(&path).with_context(|| format!("read ABI {}", path.display()))?;
    let catalog = AbiCatalog::from_json_str(&content)
        .with_context(|| format!("parse ABI {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        functions = catalog.functions().len(),
        events = catalog.events().len(),
        "loaded ABI"
    );
    Ok(catalog)
}

fn load_decoder(config: &Config, abi: &str, strict_felts: bool) -> Result<CatalogDecoder> {
    let catalog = load_catalog(config, abi)?;
    let mut options = config.decode.to_options();
    if strict_felts {
        options.felt_strings = FeltStringPolicy::Strict;
    }
    Ok(CatalogDecoder::with_options(catalog, options))
}

/// Felts from stdin: a JSON array or whitespace-separated values
fn read_stdin_felts() -> Result<Vec<String>> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        bail!("no felts given; pass them as arguments or pipe them on stdin");
    }
    let mut input = String::new();
    stdin
        .lock()
        .read_to_string(&mut input)
        .context("read felts from stdin")?;
    split_felts(&input)
}

fn split_felts(input: &str) -> Result<Vec<String>> {
    let trimmed = input.trim();
    if !trimmed.starts_with('[') {
        return Ok(trimmed.split_whitespace().map(str::to_string).collect());
    }

    let values: Vec<serde_json::Value> =
        serde_json::from_str(trimmed).context("parse felt array")?;
    let mut felts = Vec::with_capacity(values.len());
    for value in values {
        match value {
            serde_json::Value::String(text) => felts.push(text),
            serde_json::Value::Number(number) => felts.push(number.to_string()),
            other => bail!("felt must be a string or number, got {other}"),
        }
    }
    Ok(felts)
}

fn emit_record(record: &Record, format: OutputFormat, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let fields = export::write_record(path, record, format)?;
            tracing::debug!(path = %path.display(), fields, "wrote record");
            Ok(())
        }
        None => emit(&export::render(record, format)?, None),
    }
}

fn emit(rendered: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, rendered).with_context(|| format!("write {}", path.display()))
        }
        None => {
            print!("{rendered}");
            if !rendered.ends_with('\n') {
                println!();
            }
            Ok(())
        }
    }
}
