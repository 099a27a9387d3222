//! Command-line interface for inspecting settings resolution
//!
//! Lets operators see which profiles are active, what the merged layers
//! look like before binding, and whether they bind cleanly.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::{
    domains::Settings,
    layer::FileLayerSource,
    loader::SettingsLoader,
    profiles::{parse_profile_list, ProfileName},
    ConfigError, ConfigResult, NodeStoreBackend, VectorStoreBackend,
};

/// Settings inspection CLI tool
#[derive(Parser)]
#[command(name = "lantern-settings")]
#[command(about = "Inspect and validate Lantern settings profiles")]
#[command(version)]
pub struct SettingsCli {
    /// Log level filter (overrides RUST_LOG)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: SettingsCommand,
}

/// Profile selection shared by all commands
#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    /// Folder holding settings.yaml and settings-<profile>.yaml
    #[arg(short, long, env = "LANTERN_SETTINGS_FOLDER", default_value = ".")]
    pub folder: PathBuf,

    /// Comma separated profiles applied on top of the base profile
    #[arg(short, long, env = "LANTERN_PROFILES", default_value = "")]
    pub profiles: String,

    /// Disable ${NAME:default} expansion
    #[arg(long)]
    pub no_env: bool,
}

/// Output format for merged layers
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Yaml,
    Json,
}

/// Available settings commands
#[derive(Subcommand)]
pub enum SettingsCommand {
    /// Print the resolved profile order and the file backing each profile
    Profiles {
        #[command(flatten)]
        args: ProfileArgs,
    },

    /// Load, merge and bind the settings
    Validate {
        #[command(flatten)]
        args: ProfileArgs,
    },

    /// Print the merged layers before binding
    Show {
        #[command(flatten)]
        args: ProfileArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },

    /// Print a sample base settings file
    Sample,
}

impl ProfileArgs {
    fn loader(&self) -> SettingsLoader {
        SettingsLoader::new(FileLayerSource::new(&self.folder))
            .with_profiles(parse_profile_list(&self.profiles))
            .with_env_expansion(!self.no_env)
    }
}

/// CLI application runner
pub struct SettingsCliRunner;

impl SettingsCliRunner {
    /// Run the CLI application
    pub fn run(cli: SettingsCli) -> ConfigResult<()> {
        match cli.command {
            SettingsCommand::Profiles { args } => Self::list_profiles(&args),
            SettingsCommand::Validate { args } => Self::validate(&args),
            SettingsCommand::Show { args, format } => Self::show(&args, format),
            SettingsCommand::Sample => {
                print!("{}", Settings::generate_sample());
                Ok(())
            }
        }
    }

    fn list_profiles(args: &ProfileArgs) -> ConfigResult<()> {
        let source = FileLayerSource::new(&args.folder);
        let loader = args.loader();

        println!("📋 Active profiles (lowest to highest precedence):");
        for (index, profile) in loader.active_profiles().iter().enumerate() {
            let path = source.path_for(profile);
            let marker = if path.exists() { "✅" } else { "➖" };
            println!("   {}. {} {} ({})", index + 1, marker, profile, path.display());
        }

        Ok(())
    }

    fn validate(args: &ProfileArgs) -> ConfigResult<()> {
        let loader = args.loader();
        println!(
            "🔍 Validating settings in {} with profiles: {}",
            args.folder.display(),
            join_profiles(loader.active_profiles())
        );

        match loader.load() {
            Ok(settings) => {
                println!("✅ Settings are valid!");
                Self::print_summary(&settings);
                Ok(())
            }
            Err(e) => {
                println!("❌ Error: settings could not be loaded");
                println!("   {}", e);
                Err(e)
            }
        }
    }

    fn show(args: &ProfileArgs, format: OutputFormat) -> ConfigResult<()> {
        let merged = args.loader().merged()?.into_value();

        let rendered = match format {
            OutputFormat::Yaml => serde_yaml::to_string(&merged).map_err(|e| e.to_string()),
            OutputFormat::Json => serde_json::to_string_pretty(&merged).map_err(|e| e.to_string()),
        }
        .map_err(|message| ConfigError::MalformedLayer {
            profile: join_profiles(args.loader().active_profiles()),
            message,
        })?;

        println!("{}", rendered);
        Ok(())
    }

    fn print_summary(settings: &Settings) {
        println!("\n📋 Settings Summary:");
        println!(
            "   🖥️  Server: {} on port {}",
            settings.server.env_name, settings.server.port
        );
        println!(
            "   🔐 Auth: basic {}, jwt {}, cors {}",
            settings.server.basic_auth.enabled,
            settings.server.jwt_auth.enabled,
            settings.server.cors.enabled
        );
        println!("   🤖 LLM: {}", settings.llm_backend().mode());

        match settings.vector_store() {
            VectorStoreBackend::Chroma { collection_name } => {
                println!("   🧭 Vector store: chroma, collection {}", collection_name)
            }
            VectorStoreBackend::Qdrant { collection_name, connection } => println!(
                "   🧭 Vector store: qdrant, collection {} ({})",
                collection_name,
                if connection.is_some() { "configured" } else { "embedded" }
            ),
        }

        println!(
            "   📄 Document store: {}",
            describe_node_store(settings.documentstore.backend(), &settings.documentstore.namespace)
        );
        println!(
            "   🗂️  Index store: {}",
            describe_node_store(settings.indexstore.backend(), &settings.indexstore.namespace)
        );
        println!(
            "   💾 Data: {}{}",
            settings.data.local_data_folder,
            if settings.ui.enabled {
                format!(", UI at {}", settings.ui.path)
            } else {
                String::new()
            }
        );
    }
}

/// Initialize console tracing; an explicit level wins over `RUST_LOG`
pub fn init_simple_tracing(log_level: Option<&str>) {
    let env_filter = log_level
        .and_then(|level| EnvFilter::try_new(level).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));

    // A subscriber may already be installed by an embedding binary
    if tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_err()
    {
        tracing::debug!("Global tracing subscriber already initialized, skipping");
    }
}

fn describe_node_store(backend: NodeStoreBackend<'_>, namespace: &str) -> String {
    match backend {
        NodeStoreBackend::Disk => format!("disk, namespace {}", namespace),
        NodeStoreBackend::Redis(redis) => {
            format!("redis at {}:{}, namespace {}", redis.host, redis.port, namespace)
        }
        NodeStoreBackend::DynamoDb(dynamodb) => {
            format!("dynamodb table {}, namespace {}", dynamodb.table_name, namespace)
        }
    }
}

fn join_profiles(profiles: &[ProfileName]) -> String {
    profiles
        .iter()
        .map(ProfileName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
