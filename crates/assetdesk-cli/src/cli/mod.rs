//! CLI entry and dispatch.

use anyhow::{Context, Result};
use assetdesk_core::config;
use assetdesk_core::controllers::transfers::TransferFilter;
use assetdesk_core::models::Id;
use chrono::NaiveDate;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "assetdesk")]
#[command(version)]
#[command(about = "AssetDesk inventory client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Answer yes to every confirmation prompt
    #[arg(long, short = 'y', global = true)]
    yes: bool,

    /// Override the API base URL for this invocation
    #[arg(long, value_name = "URL", global = true)]
    base_url: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Log in and store the session token
    Login {
        /// Account email (prompted when omitted)
        #[arg(long)]
        email: Option<String>,
        /// Read the password from stdin without prompting
        #[arg(long)]
        password_stdin: bool,
        /// Log in again even if a session exists
        #[arg(long)]
        force: bool,
    },
    /// Clear the stored session
    Logout,
    /// Register a new employee account (password read from stdin)
    Register {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        position: String,
        /// Defaults to "employee"
        #[arg(long, default_value = "")]
        role: String,
        #[arg(long = "department", value_name = "ID")]
        department_id: Option<Id>,
    },
    /// Show the current session
    Whoami,
    /// Show headline counts and recent transfers
    Dashboard,
    /// Manage assets
    Assets {
        #[command(subcommand)]
        command: AssetCommands,
    },
    /// Manage employees
    Employees {
        #[command(subcommand)]
        command: EmployeeCommands,
    },
    /// Manage departments
    Departments {
        #[command(subcommand)]
        command: DepartmentCommands,
    },
    /// Record and browse asset transfers
    Transfers {
        #[command(subcommand)]
        command: TransferCommands,
    },
    /// Aggregate reports
    Reports {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// List known locations
    Locations,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Asset form values; omitted options keep their current value.
#[derive(clap::Args, Debug, Default)]
pub struct AssetFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    /// Acquisition date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub acquired: Option<String>,
    #[arg(long)]
    pub cost: Option<String>,
    /// Status id
    #[arg(long, value_name = "ID")]
    pub status: Option<String>,
    /// Location id
    #[arg(long, value_name = "ID")]
    pub location: Option<String>,
    /// Department id ("" to unassign)
    #[arg(long, value_name = "ID")]
    pub department: Option<String>,
}

/// Employee form values; omitted options keep their current value.
#[derive(clap::Args, Debug, Default)]
pub struct EmployeeFields {
    #[arg(long)]
    pub full_name: Option<String>,
    #[arg(long)]
    pub position: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub role: Option<String>,
    /// Department id ("" to unassign)
    #[arg(long, value_name = "ID")]
    pub department: Option<String>,
    /// Read the password from stdin
    #[arg(long)]
    pub password_stdin: bool,
}

/// Department form values; omitted options keep their current value.
#[derive(clap::Args, Debug, Default)]
pub struct DepartmentFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    /// Head employee id ("" to unassign)
    #[arg(long, value_name = "ID")]
    pub head: Option<String>,
}

/// Transfer form values.
#[derive(clap::Args, Debug, Default)]
pub struct TransferFields {
    /// Asset id
    #[arg(long, value_name = "ID")]
    pub asset: Option<String>,
    /// Employee id
    #[arg(long, value_name = "ID")]
    pub employee: Option<String>,
    /// Source location id
    #[arg(long, value_name = "ID")]
    pub from: Option<String>,
    /// Destination location id
    #[arg(long, value_name = "ID")]
    pub to: Option<String>,
    /// Transfer time (YYYY-MM-DDTHH:MM, defaults to now)
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(clap::Args, Debug, Default)]
struct TransferFilterArgs {
    /// Only transfers of this asset
    #[arg(long, value_name = "ID")]
    asset: Option<Id>,
    /// Only transfers by this employee
    #[arg(long, value_name = "ID")]
    employee: Option<Id>,
    /// Only transfers from or to this location
    #[arg(long, value_name = "ID")]
    location: Option<Id>,
    /// Only transfers on this day (YYYY-MM-DD)
    #[arg(long)]
    date: Option<NaiveDate>,
}

impl From<TransferFilterArgs> for TransferFilter {
    fn from(args: TransferFilterArgs) -> Self {
        TransferFilter {
            asset_id: args.asset,
            employee_id: args.employee,
            location_id: args.location,
            date: args.date,
        }
    }
}

#[derive(clap::Subcommand)]
enum AssetCommands {
    /// Lists assets
    List,
    /// Shows one asset
    Show { id: Id },
    /// Creates an asset (without options, shows the form)
    Create {
        #[command(flatten)]
        fields: AssetFields,
    },
    /// Updates an asset (without options, shows the prefilled form)
    Update {
        id: Id,
        #[command(flatten)]
        fields: AssetFields,
    },
    /// Deletes an asset
    Delete { id: Id },
    /// Shows the transfer history of an asset
    Transfers { id: Id },
    /// Lists asset statuses
    Statuses,
}

#[derive(clap::Subcommand)]
enum EmployeeCommands {
    /// Lists employees
    List,
    /// Shows one employee
    Show { id: Id },
    /// Creates an employee (without options, shows the form)
    Create {
        #[command(flatten)]
        fields: EmployeeFields,
    },
    /// Updates an employee (without options, shows the prefilled form)
    Update {
        id: Id,
        #[command(flatten)]
        fields: EmployeeFields,
    },
    /// Deletes an employee
    Delete { id: Id },
}

#[derive(clap::Subcommand)]
enum DepartmentCommands {
    /// Lists departments
    List,
    /// Shows one department
    Show { id: Id },
    /// Creates a department (without options, shows the form)
    Create {
        #[command(flatten)]
        fields: DepartmentFields,
    },
    /// Updates a department (without options, shows the prefilled form)
    Update {
        id: Id,
        #[command(flatten)]
        fields: DepartmentFields,
    },
    /// Deletes a department
    Delete { id: Id },
    /// Lists the employees of a department
    Employees { id: Id },
}

#[derive(clap::Subcommand)]
enum TransferCommands {
    /// Lists transfers, optionally filtered
    List {
        #[command(flatten)]
        filter: TransferFilterArgs,
    },
    /// Shows one transfer
    Show { id: Id },
    /// Records a transfer (without options, shows the form)
    Create {
        #[command(flatten)]
        fields: TransferFields,
    },
    /// Lists the newest transfers
    Recent {
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
}

#[derive(clap::Subcommand)]
enum ReportCommands {
    /// Asset count and cost per status
    Status,
    /// Asset cost per department
    Departments,
    /// Transfers in a date range (default: last 30 days)
    Transfers {
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },
    /// Inventory summary
    Inventory,
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Generate a fresh config from Rust defaults (for xtask)
    Generate,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

fn init_tracing(config: &config::Config) {
    let filter = EnvFilter::try_new(config.effective_log_filter())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = config::Config::load().context("load config")?;
    init_tracing(&config);

    let Cli {
        command,
        yes,
        base_url,
    } = cli;

    // built lazily so config commands work without a usable API setup
    let ctx = move || commands::Context::new(config, base_url.as_deref(), yes);

    match command {
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::Generate => commands::config::generate(),
        },

        Commands::Login {
            email,
            password_stdin,
            force,
        } => commands::auth::login(&ctx()?, email, password_stdin, force).await,
        Commands::Logout => commands::auth::logout(&ctx()?),
        Commands::Register {
            full_name,
            email,
            position,
            role,
            department_id,
        } => {
            commands::auth::register(
                &ctx()?,
                commands::auth::Registration {
                    full_name,
                    email,
                    position,
                    role,
                    department_id,
                },
            )
            .await
        }
        Commands::Whoami => commands::auth::whoami(&ctx()?),
        Commands::Dashboard => commands::dashboard::show(ctx()?).await,

        Commands::Assets { command } => match command {
            AssetCommands::List => commands::assets::list(ctx()?).await,
            AssetCommands::Show { id } => commands::assets::show(ctx()?, id).await,
            AssetCommands::Create { fields } => commands::assets::save(ctx()?, None, &fields).await,
            AssetCommands::Update { id, fields } => {
                commands::assets::save(ctx()?, Some(id), &fields).await
            }
            AssetCommands::Delete { id } => commands::assets::delete(ctx()?, id).await,
            AssetCommands::Transfers { id } => commands::assets::history(ctx()?, id).await,
            AssetCommands::Statuses => commands::assets::statuses(ctx()?).await,
        },

        Commands::Employees { command } => match command {
            EmployeeCommands::List => commands::employees::list(ctx()?).await,
            EmployeeCommands::Show { id } => commands::employees::show(ctx()?, id).await,
            EmployeeCommands::Create { fields } => {
                commands::employees::save(ctx()?, None, &fields).await
            }
            EmployeeCommands::Update { id, fields } => {
                commands::employees::save(ctx()?, Some(id), &fields).await
            }
            EmployeeCommands::Delete { id } => commands::employees::delete(ctx()?, id).await,
        },

        Commands::Departments { command } => match command {
            DepartmentCommands::List => commands::departments::list(ctx()?).await,
            DepartmentCommands::Show { id } => commands::departments::show(ctx()?, id).await,
            DepartmentCommands::Create { fields } => {
                commands::departments::save(ctx()?, None, &fields).await
            }
            DepartmentCommands::Update { id, fields } => {
                commands::departments::save(ctx()?, Some(id), &fields).await
            }
            DepartmentCommands::Delete { id } => commands::departments::delete(ctx()?, id).await,
            DepartmentCommands::Employees { id } => commands::departments::members(ctx()?, id).await,
        },

        Commands::Transfers { command } => match command {
            TransferCommands::List { filter } => {
                commands::transfers::list(ctx()?, filter.into()).await
            }
            TransferCommands::Show { id } => commands::transfers::show(ctx()?, id).await,
            TransferCommands::Create { fields } => commands::transfers::create(ctx()?, &fields).await,
            TransferCommands::Recent { limit } => commands::transfers::recent(ctx()?, limit).await,
        },

        Commands::Reports { command } => match command {
            ReportCommands::Status => commands::reports::status(ctx()?).await,
            ReportCommands::Departments => commands::reports::departments(ctx()?).await,
            ReportCommands::Transfers { from, to } => {
                commands::reports::transfers(ctx()?, from, to).await
            }
            ReportCommands::Inventory => commands::reports::inventory(ctx()?).await,
        },

        Commands::Locations => commands::locations::list(ctx()?).await,
    }
}
