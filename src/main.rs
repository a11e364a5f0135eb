use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use futures::future::join_all;
use infisical_datasource::config::{ConfigValue, ProcessEnv, ProviderConfig};
use infisical_datasource::datasource::{
    DataSource, OrganizationsConfig, OrganizationsDataSource, ProjectsConfig, ProjectsDataSource,
};
use infisical_datasource::diagnostics::Diagnostics;
use infisical_datasource::provider::{InfisicalProvider, ProviderData};
use infisical_datasource::VERSION;
use serde::Serialize;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Read Infisical organizations and projects
#[derive(Parser, Debug)]
#[command(name = "infisical-datasource", version, about, long_about = None)]
struct Args {
    /// Infisical API host (overrides INFISICAL_HOST)
    #[arg(long, global = true)]
    host: Option<String>,

    /// Infisical API token (overrides INFISICAL_API_TOKEN)
    #[arg(long, global = true)]
    api_token: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json", global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the organizations of the current user
    Organizations {
        /// Include created_at, updated_at and v
        #[arg(long)]
        include_audit_fields: bool,
    },
    /// List the projects of an organization
    Projects {
        /// Organization to list projects for
        #[arg(long, required_unless_present = "all_organizations")]
        organization_id: Option<String>,

        /// List projects of every organization of the current user
        #[arg(long, conflicts_with = "organization_id")]
        all_organizations: bool,
    },
    /// Print the provider and data source schemas
    Schema,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    // RUST_LOG can narrow or widen individual targets
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing_level.to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("infisical-datasource {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir
            .join("infisical-datasource")
            .join("infisical-datasource.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home
            .join(".infisical-datasource")
            .join("infisical-datasource.log");
    }
    PathBuf::from("infisical-datasource.log")
}

fn print<T: Serialize>(value: &T, format: OutputFormat) -> Result<()> {
    let text = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
    };
    println!("{}", text.trim_end());
    Ok(())
}

fn report(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics {
        eprintln!("{diagnostic}\n");
    }
}

#[derive(Serialize)]
struct SchemaOutput {
    provider: infisical_datasource::schema::Schema,
    data_sources: Vec<NamedSchema>,
}

#[derive(Serialize)]
struct NamedSchema {
    name: String,
    schema: infisical_datasource::schema::Schema,
}

fn schema_output(provider: &InfisicalProvider) -> SchemaOutput {
    let data_sources = provider
        .data_sources()
        .into_iter()
        .map(|factory| {
            let ds: DataSource = factory();
            NamedSchema {
                name: ds.type_name(InfisicalProvider::TYPE_NAME),
                schema: ds.schema(),
            }
        })
        .collect();

    SchemaOutput {
        provider: provider.schema(),
        data_sources,
    }
}

/// Read projects of every organization, one concurrent read per organization
async fn read_all_projects(
    data: &ProviderData,
    diagnostics: &mut Diagnostics,
) -> Option<Vec<infisical_datasource::datasource::state::ProjectsState>> {
    let mut organizations = OrganizationsDataSource::new();
    organizations.configure(Some(data));
    let response = organizations.read(&OrganizationsConfig::default()).await;
    diagnostics.append(response.diagnostics);
    let orgs = response.state?;

    let mut projects = ProjectsDataSource::new();
    projects.configure(Some(data));

    let reads = orgs.organizations.iter().map(|org| {
        let projects = &projects;
        let config = ProjectsConfig::new(org.id.clone());
        async move { projects.read(&config).await }
    });

    let mut states = Vec::new();
    for response in join_all(reads).await {
        diagnostics.append(response.diagnostics);
        states.extend(response.state);
    }
    Some(states)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    let provider = InfisicalProvider::new();

    if let Command::Schema = args.command {
        return print(&schema_output(&provider), args.output);
    }

    let config = ProviderConfig {
        host: ConfigValue::from(args.host.clone()),
        api_token: ConfigValue::from(args.api_token.clone()),
    };

    let configured = provider.configure(&config, &ProcessEnv);
    let mut diagnostics = configured.diagnostics;

    if let Some(data) = configured.data {
        match args.command {
            Command::Organizations {
                include_audit_fields,
            } => {
                let mut ds = OrganizationsDataSource::new();
                ds.configure(Some(&data));
                let response = ds
                    .read(&OrganizationsConfig {
                        include_audit_fields,
                    })
                    .await;
                diagnostics.append(response.diagnostics);
                if let Some(state) = response.state {
                    print(&state, args.output)?;
                }
            }
            Command::Projects {
                all_organizations: true,
                ..
            } => {
                // Failed organizations are left out; the rest still print
                if let Some(states) = read_all_projects(&data, &mut diagnostics).await {
                    print(&states, args.output)?;
                }
            }
            Command::Projects {
                organization_id, ..
            } => {
                let mut ds = ProjectsDataSource::new();
                ds.configure(Some(&data));
                let response = ds
                    .read(&ProjectsConfig {
                        organization_id: ConfigValue::from(organization_id),
                    })
                    .await;
                diagnostics.append(response.diagnostics);
                if let Some(state) = response.state {
                    print(&state, args.output)?;
                }
            }
            Command::Schema => {}
        }
    }

    report(&diagnostics);

    let errors = diagnostics.errors().count();
    if errors > 0 {
        bail!("read failed with {} error(s)", errors);
    }

    Ok(())
}
