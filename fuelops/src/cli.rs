use clap::Parser;
use clap::Subcommand;
use std::env::current_dir;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
pub struct Opts {
    /// The address to listen on for the HTTP API.
    #[clap(long, default_value = "0.0.0.0:8000")]
    pub http_address: SocketAddr,

    /// Where to keep local state (runtime settings), defaults to the
    /// current working directory.
    #[clap(long)]
    data_dir: Option<PathBuf>,

    /// If enabled logs will be in json format
    #[clap(short, long)]
    pub json: bool,

    /// The address where to find the database including username and password.
    /// Falls back to the DATABASE_URL environment variable.
    #[clap(long)]
    pub database: Option<String>,

    #[clap(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run schema migrations.
    Migrate {
        #[clap(subcommand)]
        direction: MigrateCommand,
    },
    /// Insert default plans and the super-admin account.
    Seed,
}

#[derive(Subcommand)]
pub enum MigrateCommand {
    /// Apply all pending migrations.
    Up,
    /// Revert the most recent migration.
    Down,
    /// Print applied and pending migrations.
    Status,
}

impl Opts {
    // use this method to parse the options from the cli.
    pub fn read() -> Opts {
        Opts::parse()
    }

    pub fn database_url(&self) -> anyhow::Result<String> {
        if let Some(database) = &self.database {
            return Ok(database.clone());
        }

        std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("set --database or the DATABASE_URL environment variable"))
    }

    pub fn data_dir(&self) -> anyhow::Result<PathBuf> {
        let data_dir = match self.data_dir.clone() {
            None => current_dir()?.join("data"),
            Some(path) => path,
        }
        .join("fuelops");

        Ok(data_dir)
    }
}
