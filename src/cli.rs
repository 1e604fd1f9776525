use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tokio::io::AsyncReadExt;

use jzip_protocol::{Compression, ConvertOptions, FileNaming, JobState};

use crate::client::HttpClient;
use crate::config::{ConfigService, ToolConfig};
use crate::convert::{ConvertService, OutputTarget};
use crate::error::{JzipError, Result};
use crate::file::{read_file_as_text, CandidateFile};
use crate::intake::{has_files, scan_paths, IntakeLimits, Selection};
use crate::ui::{format_size_colored, UI};
use crate::validation::{
    validate_file_size, validate_file_type, validate_json_data, JsonPayload, DEFAULT_ALLOWED_TYPES,
};
use crate::version::CURRENT_VERSION;

#[derive(Parser)]
#[command(
    name = "jzip",
    about = "JSON to ZIP conversion client",
    long_about = "jzip - Convert JSON text and files into ZIP archives

OVERVIEW:
  This tool validates JSON payloads locally and delegates archive
  construction to a remote conversion service.

QUICK START:
  jzip convert '{\"a\":1}' -n report       # Convert inline JSON
  jzip upload data.json                   # Upload a file for conversion
  jzip batch exports/ --recursive         # Bundle a directory of JSON files
  jzip status <JOB_ID>                    # Poll a conversion job
  jzip validate '{\"a\":1}'                # Check a payload without converting
  jzip formats                            # List service capabilities",
    version = CURRENT_VERSION,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to an alternate configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert inline JSON text to a ZIP archive
    #[command(aliases = &["c"])]
    Convert(ConvertArgs),

    /// Upload a JSON file for conversion
    #[command(aliases = &["up"])]
    Upload(UploadArgs),

    /// Convert multiple JSON files into one archive
    #[command(aliases = &["b"])]
    Batch(BatchArgs),

    /// Poll the status of a conversion job
    #[command(aliases = &["st"])]
    Status(StatusArgs),

    /// Validate a JSON payload without converting it
    Validate(ValidateArgs),

    /// List output formats supported by the service
    #[command(aliases = &["fmt"])]
    Formats,

    /// Configure settings
    #[command(aliases = &["cfg"])]
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct ConvertOptionsArgs {
    /// Compression algorithm: deflate or store
    #[arg(long)]
    pub compression: Option<String>,

    /// Compression level (0-9)
    #[arg(long = "level", value_parser = clap::value_parser!(u8).range(0..=9))]
    pub compression_level: Option<u8>,

    /// Create folder entries inside the archive
    #[arg(long)]
    pub create_folders: bool,

    /// Emit one archive member per input value
    #[arg(long)]
    pub separate_files: bool,

    /// Member naming strategy: auto, original, or timestamp
    #[arg(long)]
    pub naming: Option<String>,
}

#[derive(Args)]
pub struct ConvertArgs {
    /// JSON text to convert
    pub input: Option<String>,

    /// Read the JSON payload from standard input
    #[arg(long)]
    pub stdin: bool,

    /// Base name for the archive
    #[arg(short = 'n', long = "name")]
    pub name: Option<String>,

    /// Output file path (default: download dir with a derived name)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Overwrite an existing output file
    #[arg(long)]
    pub force: bool,

    #[command(flatten)]
    pub options: ConvertOptionsArgs,
}

#[derive(Args)]
pub struct UploadArgs {
    pub file: PathBuf,

    /// Base name for the archive
    #[arg(short = 'n', long = "name")]
    pub name: Option<String>,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Overwrite an existing output file
    #[arg(long)]
    pub force: bool,

    #[command(flatten)]
    pub options: ConvertOptionsArgs,
}

#[derive(Args)]
pub struct BatchArgs {
    /// Files or directories to convert
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Recurse into directories
    #[arg(short, long)]
    pub recursive: bool,

    /// Base name for the archive
    #[arg(short = 'n', long = "name")]
    pub name: Option<String>,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Overwrite an existing output file
    #[arg(long)]
    pub force: bool,

    #[command(flatten)]
    pub options: ConvertOptionsArgs,
}

#[derive(Args)]
pub struct StatusArgs {
    pub job_id: String,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// JSON text to validate
    pub input: Option<String>,

    /// Read the JSON payload from standard input
    #[arg(long)]
    pub stdin: bool,

    /// Validate the contents of a file instead
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Ask the service for a verdict instead of checking locally
    #[arg(long)]
    pub remote: bool,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    Show,
    SetEndpoint { url: String },
    SetTimeout { seconds: u64 },
    SetVerbose { enabled: String },
    SetDownloadDir { path: String },
    Reset,
}

/// CLI handler for processing commands
pub struct CliHandler {
    config_path: Option<PathBuf>,
    ui: UI,
}

impl CliHandler {
    /// Create a new CLI handler with an optional custom config path
    pub fn with_config_path(config_path: Option<PathBuf>) -> Self {
        Self {
            config_path,
            ui: UI::new(),
        }
    }

    /// Load configuration using the handler's config path
    async fn load_config(&self) -> Result<ToolConfig> {
        ToolConfig::load(self.config_path.as_deref()).await
    }

    fn build_client(&self, config: &ToolConfig) -> Result<HttpClient> {
        HttpClient::new(config.to_client_config()?)
    }

    /// Execute a CLI command
    pub async fn execute(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::Convert(args) => self.handle_convert(args).await,
            Commands::Upload(args) => self.handle_upload(args).await,
            Commands::Batch(args) => self.handle_batch(args).await,
            Commands::Status(args) => self.handle_status(args).await,
            Commands::Validate(args) => self.handle_validate(args).await,
            Commands::Formats => self.handle_formats().await,
            Commands::Config(args) => self.handle_config(args).await,
        }
    }

    /// Handle convert command - inline JSON text to archive
    async fn handle_convert(&mut self, args: ConvertArgs) -> Result<()> {
        let config = self.load_config().await?;
        let text = self.read_payload(&args.input, args.stdin).await?;
        let options = options_from_args(&args.options)?;

        let client = self.build_client(&config)?;
        let service = ConvertService::new(&client);
        let target = OutputTarget {
            dir: config.download_dir.clone(),
            path: args.output,
            force: args.force,
        };

        service
            .convert_text(&text, args.name.as_deref(), options, &target)
            .await?;
        Ok(())
    }

    /// Handle upload command - send a JSON file for conversion
    async fn handle_upload(&mut self, args: UploadArgs) -> Result<()> {
        let config = self.load_config().await?;

        let candidate = CandidateFile::from_path(&args.file).await?;
        validate_file_type(&candidate, DEFAULT_ALLOWED_TYPES)?;
        validate_file_size(&candidate, config.max_file_size)?;

        let options = options_from_args(&args.options)?;
        let client = self.build_client(&config)?;
        let service = ConvertService::new(&client);
        let target = OutputTarget {
            dir: config.download_dir.clone(),
            path: args.output,
            force: args.force,
        };

        service
            .convert_file(&candidate, args.name.as_deref(), options, &target)
            .await?;
        Ok(())
    }

    /// Handle batch command - convert many files into one archive
    async fn handle_batch(&mut self, args: BatchArgs) -> Result<()> {
        let config = self.load_config().await?;

        if !has_files(&args.paths) && !args.paths.iter().any(|p| p.is_dir()) {
            return Err(JzipError::empty_selection());
        }

        let candidates = scan_paths(&args.paths, args.recursive).await?;

        let limits = IntakeLimits {
            max_file_size: config.max_file_size,
            ..IntakeLimits::default()
        };
        let mut selection = Selection::new(true, limits);
        let report = selection.offer(candidates)?;
        tracing::debug!("Accepted files: {}", report.accepted.join(", "));

        for rejected in &report.rejected {
            self.ui
                .warning(&format!("Skipped {}: {}", rejected.filename, rejected.reason));
        }
        if selection.is_empty() {
            return Err(JzipError::validation("All files were rejected"));
        }

        let total: u64 = selection.files().iter().map(|f| f.size).sum();
        self.ui.info(&format!(
            "Converting {} files ({})",
            selection.len(),
            format_size_colored(total)
        ));

        let options = options_from_args(&args.options)?;
        let client = self.build_client(&config)?;
        let service = ConvertService::new(&client);
        let target = OutputTarget {
            dir: config.download_dir.clone(),
            path: args.output,
            force: args.force,
        };

        service
            .convert_batch(
                selection.files(),
                args.name.as_deref(),
                options,
                config.max_file_size,
                &target,
            )
            .await?;
        Ok(())
    }

    /// Handle status command - poll a conversion job
    async fn handle_status(&mut self, args: StatusArgs) -> Result<()> {
        let config = self.load_config().await?;
        let client = self.build_client(&config)?;
        let service = ConvertService::new(&client);

        let status = service.status(&args.job_id).await?;

        let state = match status.status {
            JobState::Pending => "pending",
            JobState::Processing => "processing",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
        };

        let mut rows = vec![("Job", status.job_id.clone()), ("Status", state.to_string())];
        if let Some(progress) = status.progress {
            rows.push(("Progress", format!("{}%", progress)));
        }
        if let Some(url) = status.download_url {
            rows.push(("Download", url));
        }
        if let Some(error) = status.error {
            rows.push(("Error", error));
        }

        self.ui.card("Job Status", rows);
        Ok(())
    }

    /// Handle validate command - local structural check or remote verdict
    async fn handle_validate(&mut self, args: ValidateArgs) -> Result<()> {
        let text = if let Some(path) = &args.file {
            let candidate = CandidateFile::from_path(path).await?;
            read_file_as_text(&candidate).await?
        } else {
            self.read_payload(&args.input, args.stdin).await?
        };

        if args.remote {
            let config = self.load_config().await?;
            let client = self.build_client(&config)?;
            let service = ConvertService::new(&client);

            let data = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));
            let verdict = service.validate_remote(data).await?;

            if verdict.is_valid {
                self.ui.success("Valid JSON");
                return Ok(());
            }
            self.ui.error("Invalid JSON");
            for error in &verdict.errors {
                self.ui.warning(&format!("  {}", error));
            }
            return Err(JzipError::validation("Payload failed remote validation"));
        }

        let report = validate_json_data(&JsonPayload::Text(text));
        if report.is_valid {
            self.ui.success("Valid JSON");
            Ok(())
        } else {
            self.ui.error("Invalid JSON");
            for error in &report.errors {
                self.ui.warning(&format!("  {}", error));
            }
            Err(JzipError::invalid_json(report.errors.join("; ")))
        }
    }

    /// Handle formats command - list service capabilities
    async fn handle_formats(&mut self) -> Result<()> {
        let config = self.load_config().await?;
        let client = self.build_client(&config)?;
        let service = ConvertService::new(&client);

        let formats = service.formats().await?;

        let format_list = formats
            .formats
            .iter()
            .map(|f| format!("{} (.{})", f.name, f.extension))
            .collect::<Vec<_>>()
            .join(", ");

        let mut rows = vec![("Formats", format_list)];
        if !formats.compression_methods.is_empty() {
            rows.push(("Compression", formats.compression_methods.join(", ")));
        }
        if let Some(max) = formats.max_file_size {
            rows.push(("Max file size", crate::utils::format_file_size(max)));
        }
        if let Some(batch) = formats.max_batch_size {
            rows.push(("Max batch size", batch.to_string()));
        }

        self.ui.card("Service Capabilities", rows);
        Ok(())
    }

    /// Handle config command
    async fn handle_config(&mut self, args: ConfigArgs) -> Result<()> {
        let config = self.load_config().await?;
        let mut service = if let Some(path) = self.config_path.clone() {
            ConfigService::with_config_path(config, path)
        } else {
            ConfigService::new(config)
        };
        service.handle_config(args).await
    }

    /// Resolve the JSON payload from an argument or standard input
    async fn read_payload(&self, input: &Option<String>, stdin: bool) -> Result<String> {
        if stdin {
            let mut buffer = String::new();
            tokio::io::stdin().read_to_string(&mut buffer).await?;
            return Ok(buffer.trim().to_string());
        }

        match input {
            Some(text) => {
                let trimmed = text.trim();
                if !trimmed.starts_with('{') && !trimmed.starts_with('[')
                    && Path::new(text).is_file()
                {
                    return Err(JzipError::invalid_input(format!(
                        "'{}' is a file; use 'jzip upload' to convert files",
                        text
                    )));
                }
                Ok(text.clone())
            }
            None => Err(JzipError::invalid_input(
                "No input provided. Pass JSON text or use --stdin",
            )),
        }
    }
}

/// Map CLI option flags onto the wire options structure
fn options_from_args(args: &ConvertOptionsArgs) -> Result<ConvertOptions> {
    let mut options = ConvertOptions::default();

    if let Some(compression) = args.compression.as_deref() {
        options.compression = match compression.to_lowercase().as_str() {
            "deflate" => Compression::Deflate,
            "store" => Compression::Store,
            other => {
                return Err(JzipError::invalid_input(format!(
                    "Invalid compression '{}'. Use 'deflate' or 'store'",
                    other
                )))
            }
        };
    }

    if let Some(level) = args.compression_level {
        options.compression_level = level;
    }
    options.create_folders = args.create_folders;
    options.create_separate_files = args.separate_files;

    if let Some(naming) = args.naming.as_deref() {
        options.file_naming = match naming.to_lowercase().as_str() {
            "auto" => FileNaming::Auto,
            "original" => FileNaming::Original,
            "timestamp" => FileNaming::Timestamp,
            other => {
                return Err(JzipError::invalid_input(format!(
                    "Invalid naming strategy '{}'. Use 'auto', 'original', or 'timestamp'",
                    other
                )))
            }
        };
    }

    Ok(options)
}
