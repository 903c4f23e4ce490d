//! cinderctl
//!
//! Command-line front end for the Keystone-authenticated Cinder client.
//! Results are printed to stdout as JSON; logs go to stderr.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cinderctl::{
    ApiVersion, ClientConfig, CloudStorageClient, Error, NetworkInterfaceResolver, Result,
    Volume, VolumeDetail, VolumeQuery,
};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Manage Cinder volumes through Keystone authentication
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML configuration file; flags below override its values
    #[arg(long, env = "CINDERCTL_CONFIG")]
    config: Option<PathBuf>,

    /// Cloud host (Keystone and Cinder). Guessed from --interface when unset
    #[arg(long, env = "OS_HOST")]
    host: Option<String>,

    /// Username; the tenant with the same name is used
    #[arg(long, env = "OS_USERNAME")]
    username: Option<String>,

    /// Password
    #[arg(long, env = "OS_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Local interface whose address is used as host
    #[arg(long, env = "OS_INTERFACE")]
    interface: Option<String>,

    /// Per-request deadline in seconds
    #[arg(long, env = "OS_TIMEOUT")]
    timeout_secs: Option<u64>,

    /// Concurrent sub-requests for bulk commands
    #[arg(long, env = "BULK_CONCURRENCY")]
    bulk_concurrency: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List local interfaces and their IPv4 addresses
    Interfaces,
    /// Authenticate and show tenant, endpoints and token expiry
    Auth,
    /// Look up a user id on the admin endpoint
    AdminId {
        #[arg(long, default_value = "admin")]
        name: String,
    },
    /// Create a volume
    Create {
        /// Size in GB
        size: u64,
    },
    /// List volumes
    List {
        /// API version (v1, v2)
        #[arg(long, default_value = "v1")]
        api: ApiVersion,
        /// Use the /detail listing
        #[arg(long)]
        detail: bool,
        /// Server-side status filter
        #[arg(long)]
        status: Option<String>,
    },
    /// List in-use volumes (v1)
    ListFiltered,
    /// List volumes with details (v1)
    ListDetailed,
    /// List volumes (v2)
    ListV2,
    /// List volumes with details (v2)
    ListDetailedV2,
    /// List snapshots (v2)
    Snapshots,
    /// GET a storage path; `tenantid` is replaced by the tenant id
    Get { path: String },
    /// Delete a volume
    Delete { id: String },
    /// Delete every volume of the tenant
    DeleteAll,
    /// Create several volumes; missing sizes default to 1 GB
    CreateMany {
        count: usize,
        sizes: Vec<u64>,
    },
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args);

    if let Err(e) = run(args).await {
        error!("{}", e);
        return Err(e);
    }
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    if let Command::Interfaces = args.command {
        let resolver = NetworkInterfaceResolver::from_system()?;
        return print_json(&resolver.interfaces());
    }

    let config = build_config(&args)?;
    info!("Starting {} {}", cinderctl::NAME, cinderctl::VERSION);
    let client = CloudStorageClient::connect(config).await?;

    match args.command {
        Command::Interfaces => Ok(()),
        Command::Auth => {
            print_json(&serde_json::json!({
                "tenant_id": client.tenant_id().await,
                "endpoints": client.endpoints().await,
                "token_expires_at": client.token_expires_at().await,
            }))
        }
        Command::AdminId { name } => {
            let id = client.admin_user_id(&name).await?;
            print_json(&serde_json::json!({ "name": name, "id": id }))
        }
        Command::Create { size } => print_json(&client.create_volume(size).await?),
        Command::List {
            api,
            detail,
            status,
        } => {
            let mut query = VolumeQuery::new(api);
            if let Some(status) = status {
                query = query.with_status(status);
            }
            if detail {
                let volumes: Vec<VolumeDetail> = client.query_volumes(&query.detailed()).await?;
                print_json(&volumes)
            } else {
                let volumes: Vec<Volume> = client.query_volumes(&query).await?;
                print_json(&volumes)
            }
        }
        Command::ListFiltered => print_json(&client.list_volumes_filtered().await?),
        Command::ListDetailed => print_json(&client.list_volumes_detailed().await?),
        Command::ListV2 => print_json(&client.list_volumes_v2().await?),
        Command::ListDetailedV2 => print_json(&client.list_volumes_detailed_v2().await?),
        Command::Snapshots => print_json(&client.list_snapshots().await?),
        Command::Get { path } => print_json(&client.get_by_path(&path).await?),
        Command::Delete { id } => {
            client.delete_volume(&id).await?;
            print_json(&serde_json::json!({ "deleted": id }))
        }
        Command::DeleteAll => {
            let deleted = client.delete_all_volumes().await?;
            print_json(&serde_json::json!({ "deleted": deleted }))
        }
        Command::CreateMany { count, sizes } => {
            print_json(&client.create_volumes(count, &sizes).await?)
        }
    }
}

// =============================================================================
// Configuration
// =============================================================================

fn build_config(args: &Args) -> Result<ClientConfig> {
    let mut config = match &args.config {
        Some(path) => ClientConfig::from_yaml_file(path)?,
        None => ClientConfig::default(),
    };

    if let Some(host) = &args.host {
        config.host = Some(host.clone());
    }
    if let Some(username) = &args.username {
        config.username = username.clone();
    }
    if let Some(password) = &args.password {
        config.password = password.clone();
    }
    if let Some(interface) = &args.interface {
        config.interface = interface.clone();
    }
    if let Some(timeout) = args.timeout_secs {
        config.request_timeout_secs = timeout;
    }
    if let Some(concurrency) = args.bulk_concurrency {
        config.bulk_concurrency = concurrency;
    }

    config.validate()?;
    Ok(config)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).map_err(Error::from)?;
    println!("{}", rendered);
    Ok(())
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let mut filter = EnvFilter::from_default_env().add_directive(level.into());
    for directive in ["hyper=warn", "reqwest=warn"] {
        if let Ok(d) = directive.parse() {
            filter = filter.add_directive(d);
        }
    }

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
