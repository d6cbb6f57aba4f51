//! Command-line interface for estab
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and merging CLI overrides
//! - Subcommands (version, shell completion, config inspection)

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::{Config, DocumentSource, EmptyRows, LogLevel, OutputMode};
use crate::error::Result;

pub mod completion;

/// Export Elasticsearch documents as delimited text
#[derive(Parser, Debug)]
#[command(
    name = "estab",
    version,
    about = "Export Elasticsearch documents as tab separated values",
    long_about = "Streams every hit of a query through the scroll API and writes one
delimited row per document, flattening nested and multi-valued fields."
)]
pub struct CliArgs {
    /// Search service host
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Search service port
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Indices to query, comma separated
    #[arg(long, value_name = "NAMES")]
    pub indices: Option<String>,

    /// Mapping types to query, comma separated
    #[arg(long, value_name = "NAMES")]
    pub types: Option<String>,

    /// Fields to export, space separated (e.g. "name user.id tags")
    #[arg(short = 'f', long, value_name = "FIELDS")]
    pub fields: Option<String>,

    /// Documents per scroll page
    #[arg(long, value_name = "N")]
    pub size: Option<u32>,

    /// Placeholder for missing and null values
    #[arg(long = "null", value_name = "TEXT")]
    pub null_value: Option<String>,

    /// Separator for multiple values of one field
    #[arg(long, value_name = "SEP")]
    pub separator: Option<String>,

    /// Separator for the outer level of lists of lists
    #[arg(long, value_name = "SEP")]
    pub secondary_separator: Option<String>,

    /// Column delimiter
    #[arg(long, value_name = "DELIM")]
    pub delimiter: Option<String>,

    /// Query clause as JSON
    #[arg(long, value_name = "JSON")]
    pub query: Option<String>,

    /// Write each document as one JSON line
    #[arg(long)]
    pub raw: bool,

    /// Write a header line with the field names
    #[arg(long)]
    pub header: bool,

    /// One value per line (single field only)
    #[arg(short = '1', long = "single-value", conflicts_with = "raw")]
    pub single_value: bool,

    /// Treat zero length strings as null
    #[arg(long)]
    pub zero_as_null: bool,

    /// Treat empty lists as null
    #[arg(long)]
    pub empty_list_as_null: bool,

    /// Drop documents without a value for any field
    #[arg(long)]
    pub skip_empty: bool,

    /// Significant digits for non-integral numbers
    #[arg(long, value_name = "N")]
    pub precision: Option<usize>,

    /// Output file (stdout if omitted)
    #[arg(short = 'o', long = "out", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Scroll keep-alive (e.g. 10m)
    #[arg(long, value_name = "DURATION")]
    pub scroll: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Documents fetched ahead of the writer
    #[arg(long, value_name = "N")]
    pub capacity: Option<usize>,

    /// Include _id, _index, _type and _score as fields
    #[arg(long)]
    pub meta: bool,

    /// Read values from the hit's `fields` section instead of `_source`
    #[arg(long)]
    pub use_fields: bool,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Quiet mode (errors only, no progress bar)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose mode (detailed logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv")]
    pub very_verbose: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands for estab
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show version information
    Version,

    /// Generate shell completion script
    Completion {
        /// Shell type
        #[arg(value_enum, value_name = "SHELL")]
        shell: Shell,
    },

    /// Show configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Validate effective configuration
        #[arg(long)]
        validate: bool,
    },
}

/// CLI interface handler
pub struct CliInterface {
    args: CliArgs,
    config: Config,
}

impl CliInterface {
    /// Parse process arguments and load configuration
    pub fn new() -> Result<Self> {
        Self::from_args(CliArgs::parse())
    }

    /// Build from already parsed arguments
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let config = Self::load_config(&args)?;
        Ok(Self { args, config })
    }

    /// Load configuration from file and merge with arguments
    ///
    /// Validation is left to the export run, since required values such as
    /// the field list usually come from the command line.
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = Config::load_from_file(args.config_file.as_deref())?;
        Self::apply_args_to_config(&mut config, args);
        Ok(config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Apply CLI arguments to configuration
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) {
        Self::apply_connection_args(config, args);
        Self::apply_search_args(config, args);
        Self::apply_export_args(config, args);
        Self::apply_logging_args(config, args);
    }

    fn apply_connection_args(config: &mut Config, args: &CliArgs) {
        if let Some(host) = &args.host {
            config.connection.host = host.clone();
        }
        if let Some(port) = args.port {
            config.connection.port = port;
        }
        if let Some(timeout) = args.timeout {
            config.connection.timeout = timeout;
        }
    }

    fn apply_search_args(config: &mut Config, args: &CliArgs) {
        let search = &mut config.search;

        if let Some(indices) = &args.indices {
            search.indices = split_list(indices, ',');
        }
        if let Some(types) = &args.types {
            search.types = split_list(types, ',');
        }
        if let Some(query) = &args.query {
            search.query = Some(query.clone());
        }
        if let Some(size) = args.size {
            search.size = size;
        }
        if let Some(scroll) = &args.scroll {
            search.scroll = scroll.clone();
        }
        if args.use_fields {
            search.source = DocumentSource::Fields;
        }
        if args.meta {
            search.include_meta = true;
        }
    }

    fn apply_export_args(config: &mut Config, args: &CliArgs) {
        let export = &mut config.export;

        if let Some(fields) = &args.fields {
            export.fields = fields.split_whitespace().map(str::to_string).collect();
        }
        if let Some(null_value) = &args.null_value {
            export.null_value = null_value.clone();
        }
        if let Some(separator) = &args.separator {
            export.separator = separator.clone();
        }
        if let Some(secondary) = &args.secondary_separator {
            export.secondary_separator = secondary.clone();
        }
        if let Some(delimiter) = &args.delimiter {
            export.delimiter = delimiter.clone();
        }
        if let Some(precision) = args.precision {
            export.precision = precision;
        }
        if let Some(capacity) = args.capacity {
            export.channel_capacity = capacity;
        }
        if let Some(output) = &args.output {
            export.output = Some(output.clone());
        }

        export.zero_as_null |= args.zero_as_null;
        export.empty_list_as_null |= args.empty_list_as_null;
        export.header |= args.header;

        if args.skip_empty {
            export.empty_rows = EmptyRows::Skip;
        }
        if args.raw {
            export.mode = OutputMode::Raw;
        } else if args.single_value {
            export.mode = OutputMode::SingleValue;
        }
        if args.no_progress || args.quiet {
            export.progress = false;
        }
    }

    fn apply_logging_args(config: &mut Config, args: &CliArgs) {
        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else if args.quiet {
            LogLevel::Error
        } else {
            config.logging.level
        };
    }

    /// Handle subcommands
    ///
    /// # Returns
    /// * `Result<bool>` - True if a subcommand was handled, false to run an export
    pub fn handle_subcommand(&self) -> Result<bool> {
        match &self.args.command {
            Some(Commands::Version) => {
                println!("estab version {}", crate::VERSION);
                Ok(true)
            }
            Some(Commands::Completion { shell }) => {
                completion::generate_completion(*shell, &mut std::io::stdout());
                Ok(true)
            }
            Some(Commands::Config { show, validate }) => {
                self.handle_config_command(*show, *validate)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn handle_config_command(&self, show: bool, validate: bool) -> Result<()> {
        if validate {
            println!("Validating configuration: {}", self.config_path().display());
            match self.config.validate() {
                Ok(()) => println!("Configuration is valid"),
                Err(e) => println!("Configuration is invalid: {}", e),
            }
        }

        if show {
            println!("# Configuration file: {}", self.config_path().display());
            println!("{}", self.config.to_toml_with_comments()?);
        }

        Ok(())
    }

    /// Configuration file path (from args or default)
    fn config_path(&self) -> PathBuf {
        self.args
            .config_file
            .clone()
            .unwrap_or_else(Config::default_config_path)
    }
}

fn split_list(value: &str, separator: char) -> Vec<String> {
    value
        .split(separator)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
