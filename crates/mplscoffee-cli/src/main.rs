mod harvest;
mod runs;
mod schedule;
mod shops;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "mplscoffee")]
#[command(about = "Minneapolis coffee shop harvester")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one harvest: seeds → nearby search → details → catalog
    Harvest {
        /// Seed to search around; repeat to pass several. Replaces the
        /// region file's seeds.
        #[arg(long = "seed")]
        seeds: Vec<String>,

        /// Reconcile into memory and print the result instead of writing
        /// to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Run the harvest on the configured cron schedule until interrupted
    Schedule,
    /// Inspect and curate the coffee shop catalog
    Shops {
        #[command(subcommand)]
        command: ShopsCommands,
    },
    /// Inspect the harvest run ledger
    Runs {
        #[command(subcommand)]
        command: RunsCommands,
    },
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum ShopsCommands {
    List {
        #[arg(long, default_value_t = 50)]
        limit: i64,
        #[arg(long, default_value_t = 0)]
        offset: i64,
    },
    Get {
        place_id: String,
    },
    /// Record the operator verdict for a shop
    Mark {
        place_id: String,
        #[arg(long, value_enum)]
        verdict: Verdict,
    },
}

#[derive(Debug, Subcommand)]
enum RunsCommands {
    List {
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    Ping,
    Migrate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Verdict {
    Good,
    Bad,
    Unset,
}

impl Verdict {
    fn as_flag(self) -> Option<bool> {
        match self {
            Verdict::Good => Some(true),
            Verdict::Bad => Some(false),
            Verdict::Unset => None,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("mplscoffee: no command given; run `mplscoffee --help`");
        return Ok(());
    };

    let config = mplscoffee_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(?config, "configuration loaded");

    if let Commands::Harvest {
        seeds,
        dry_run: true,
    } = &command
    {
        return harvest::run_dry_run(&config, seeds).await;
    }

    let pool_config = mplscoffee_db::PoolConfig::from_app_config(&config);
    let pool = mplscoffee_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Harvest { seeds, .. } => {
            harvest::run_harvest(&pool, &config, &seeds, harvest::TRIGGER_CLI).await?;
        }
        Commands::Schedule => schedule::run_schedule(pool, config).await?,
        Commands::Shops { command } => match command {
            ShopsCommands::List { limit, offset } => {
                shops::run_shops_list(&pool, limit, offset).await?;
            }
            ShopsCommands::Get { place_id } => shops::run_shops_get(&pool, &place_id).await?,
            ShopsCommands::Mark { place_id, verdict } => {
                shops::run_shops_mark(&pool, &place_id, verdict.as_flag()).await?;
            }
        },
        Commands::Runs { command } => match command {
            RunsCommands::List { limit } => runs::run_runs_list(&pool, limit).await?,
        },
        Commands::Db { command } => match command {
            DbCommands::Ping => {
                mplscoffee_db::ping(&pool).await?;
                println!("database: ok");
            }
            DbCommands::Migrate => {
                let applied = mplscoffee_db::run_migrations(&pool).await?;
                println!("migrations applied: {applied}");
            }
        },
    }

    Ok(())
}
