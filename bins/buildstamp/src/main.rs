//! buildstamp CLI
//!
//! Resolves the build code and build name of a release artifact and hands
//! them to packaging tools.

use anyhow::Result;
use buildstamp_android::gradle::{self, OutputFormat};
use buildstamp_android::signing::{CredentialSource, Secret, SigningConfig};
use buildstamp_android::{flutter, pubspec};
use buildstamp_cli::output::{self, field, Status};
use buildstamp_core::config::Config;
use buildstamp_core::error::{exit_codes, Error, ResultExt};
use buildstamp_core::identity::{BuildIdentity, Overrides, VersionName};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "buildstamp")]
#[command(about = "Resolve build codes and names for release artifacts")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Project root (pubspec.yaml and android/ are looked up here)
    #[arg(short = 'C', long, global = true, default_value = ".")]
    project_dir: PathBuf,

    /// Increase output verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Override flags shared by commands that resolve an identity
#[derive(clap::Args)]
struct IdentityArgs {
    /// Build code, takes precedence over the configured environment variable
    #[arg(long)]
    code: Option<String>,

    /// Build name, takes precedence over the configured environment variable
    #[arg(long)]
    name: Option<String>,

    /// Version name used when no build name is supplied
    #[arg(long)]
    fallback_name: Option<String>,

    /// Current time in seconds since the Unix epoch (defaults to the system clock)
    #[arg(long)]
    now: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve and print the build identity
    Resolve {
        #[command(flatten)]
        identity: IdentityArgs,

        /// Output format: text, json, env, properties, flutter-args
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the effective release signing configuration
    Signing {
        /// Path to key.properties, relative to the project root
        #[arg(long)]
        properties: Option<PathBuf>,

        /// Fail when the properties file is missing
        #[arg(long)]
        strict: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run `flutter build` with the resolved identity
    #[command(name = "flutter-build")]
    FlutterBuild {
        /// Build target: apk, appbundle, ipa, ...
        target: String,

        #[command(flatten)]
        identity: IdentityArgs,

        /// Extra arguments passed to flutter
        #[arg(last = true)]
        extra: Vec<String>,
    },
}

impl Commands {
    fn wants_json(&self) -> bool {
        match self {
            Commands::Resolve { format, .. } => *format == OutputFormat::Json,
            Commands::Signing { json, .. } | Commands::Config { json } => *json,
            Commands::FlutterBuild { .. } => false,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        owo_colors::set_override(false);
    }

    init_logging(cli.verbose, cli.quiet)?;

    let json = cli.command.wants_json();
    let exit_code = match run(cli) {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            output::report_error(&e, json);
            exit_codes::exit_code_for(&e)
        }
    };

    std::process::exit(exit_code);
}

fn init_logging(verbose: u8, quiet: bool) -> Result<()> {
    let default_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))
}

fn run(cli: Cli) -> buildstamp_core::Result<()> {
    let root = cli.project_dir.as_path();
    let config = Config::load(cli.config.as_deref(), root)?;
    debug!(config = ?config.path, root = %root.display(), "starting");

    match cli.command {
        Commands::Resolve {
            identity,
            format,
            output,
        } => run_resolve(&config, root, identity, format, output.as_deref(), cli.quiet),
        Commands::Signing {
            properties,
            strict,
            json,
        } => run_signing(&config, root, properties, strict, json),
        Commands::Config { json } => run_config(&config, json),
        Commands::FlutterBuild {
            target,
            identity,
            extra,
        } => run_flutter_build(&config, root, &target, identity, &extra, cli.quiet),
    }
}

fn resolve_identity(
    config: &Config,
    root: &Path,
    args: IdentityArgs,
) -> buildstamp_core::Result<BuildIdentity> {
    let settings = &config.schema.identity;

    let flags = Overrides {
        code: args.code,
        name: args.name,
    };
    let overrides = flags.or(Overrides::from_env(&settings.code_env, &settings.name_env));

    let fallback = match args.fallback_name {
        Some(name) => VersionName::new(name)
            .ok_or_else(|| Error::validation("--fallback-name must not be empty"))?,
        None => pubspec::fallback_name(settings, root)?,
    };

    let now = args.now.unwrap_or_else(current_unix_seconds);

    Ok(overrides.resolve(&fallback, now))
}

fn current_unix_seconds() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}

fn run_resolve(
    config: &Config,
    root: &Path,
    args: IdentityArgs,
    format: OutputFormat,
    output: Option<&Path>,
    quiet: bool,
) -> buildstamp_core::Result<()> {
    let identity = resolve_identity(config, root, args)?;
    let rendered = gradle::render(&identity, format, &config.schema.identity)?;

    match output {
        Some(path) => {
            std::fs::write(path, format!("{}\n", rendered))
                .map_err(Error::from)
                .context(format!("Writing {}", path.display()))?;
            if !quiet {
                Status::success(&format!("Wrote {} to {}", identity, path.display()));
            }
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

fn run_signing(
    config: &Config,
    root: &Path,
    properties: Option<PathBuf>,
    strict: bool,
    json: bool,
) -> buildstamp_core::Result<()> {
    let mut settings = config.schema.signing.clone();
    if let Some(path) = properties {
        settings.properties_file = path.to_string_lossy().into_owned();
    }
    if strict {
        settings.require_properties = true;
    }

    let signing = SigningConfig::load(&settings, root)?;

    if json {
        return output::print_json(&signing);
    }

    Status::header("Release signing");
    field("Key alias", &signing.key_alias);
    field("Key password", describe_secret(signing.key_password.as_ref()));
    field("Store file", signing.store_file.display());
    field("Store password", describe_secret(signing.store_password.as_ref()));
    match &signing.source {
        CredentialSource::Properties(path) => field("Source", path.display()),
        CredentialSource::Defaults => field("Source", "configured defaults"),
    }

    if !signing.is_complete() {
        Status::warning("Signing configuration is incomplete; release builds cannot be signed");
    }

    Ok(())
}

fn describe_secret(secret: Option<&Secret>) -> String {
    secret.map_or_else(|| "(not set)".to_string(), Secret::to_string)
}

fn run_config(config: &Config, json: bool) -> buildstamp_core::Result<()> {
    let source = config
        .path
        .as_ref()
        .map_or_else(|| "defaults".to_string(), |p| p.display().to_string());

    if json {
        return output::print_json(&serde_json::json!({
            "source": source,
            "config": config.schema,
        }));
    }

    let rendered = toml::to_string_pretty(&config.schema)
        .map_err(|e| Error::config("Failed to render configuration").with_source(e))?;

    println!("# source: {}", source);
    print!("{}", rendered);
    Ok(())
}

fn run_flutter_build(
    config: &Config,
    root: &Path,
    target: &str,
    args: IdentityArgs,
    extra: &[String],
    quiet: bool,
) -> buildstamp_core::Result<()> {
    let identity = resolve_identity(config, root, args)?;
    // Validate the target before announcing anything
    flutter::build_args(target, &identity, extra)?;

    if !quiet {
        Status::info(&format!("Building {} {}", target, identity));
    }

    flutter::build(root, target, &identity, extra)?;

    if !quiet {
        Status::success(&format!("flutter build {} finished", target));
    }
    Ok(())
}
