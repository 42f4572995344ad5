use clap::{Args, Subcommand};
use engine_config::settings::{
    DEFAULT_ADDR, DEFAULT_BATCH_SIZE, DEFAULT_FILE_NAME, DEFAULT_NUM_WORKERS, DEFAULT_TABLE,
    IngestSettings, StoreSettings,
};
use model::records::coercion::CoercionPolicy;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load the input file into the destination table (the default command)
    Ingest(IngestArgs),

    /// Check that the destination store is reachable
    TestConn(StoreArgs),
}

#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    /// Rows per committed batch
    #[arg(
        long,
        alias = "batchSize",
        env = "TILELOAD_BATCH_SIZE",
        default_value_t = DEFAULT_BATCH_SIZE
    )]
    pub batch_size: usize,

    /// Header-prefixed delimited input file
    #[arg(
        long,
        alias = "fileName",
        env = "TILELOAD_FILE",
        default_value = DEFAULT_FILE_NAME
    )]
    pub file_name: PathBuf,

    /// Number of parallel ingestion workers
    #[arg(
        long,
        alias = "numWorkers",
        env = "TILELOAD_WORKERS",
        default_value_t = DEFAULT_NUM_WORKERS
    )]
    pub num_workers: usize,

    /// Field delimiter of the input file
    #[arg(long, default_value_t = ',')]
    pub delimiter: char,

    /// Destination table
    #[arg(long, default_value = DEFAULT_TABLE)]
    pub table: String,

    /// What to do with a record whose fields fail type coercion: fail, skip or zero
    #[arg(long, default_value_t = CoercionPolicy::Fail)]
    pub on_invalid: CoercionPolicy,

    /// Count rows in memory instead of writing to the destination
    #[arg(long)]
    pub dry_run: bool,

    /// If specified, writes the JSON summary to this file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// ClickHouse HTTP address, `host:port` or URL
    #[arg(long, env = "CLICKHOUSE_ADDR", default_value = DEFAULT_ADDR)]
    pub addr: String,

    #[arg(long, env = "CLICKHOUSE_DATABASE", default_value = "default")]
    pub database: String,

    #[arg(long, env = "CLICKHOUSE_USER", default_value = "default")]
    pub user: String,

    #[arg(long, env = "CLICKHOUSE_PASSWORD", default_value = "", hide_env_values = true)]
    pub password: String,
}

impl From<StoreArgs> for StoreSettings {
    fn from(args: StoreArgs) -> Self {
        StoreSettings {
            addr: args.addr,
            database: args.database,
            user: args.user,
            password: args.password,
        }
    }
}

impl From<IngestArgs> for IngestSettings {
    fn from(args: IngestArgs) -> Self {
        IngestSettings {
            batch_size: args.batch_size,
            file_name: args.file_name,
            num_workers: args.num_workers,
            delimiter: args.delimiter,
            table: args.table,
            on_invalid: args.on_invalid,
            dry_run: args.dry_run,
            store: args.store.into(),
        }
    }
}
