//! binkv CLI Client
//!
//! Command-line interface for talking to a server over the binary protocol.

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, EnvFilter};

use binkv::auth::PasswordFile;
use binkv::client::{BucketType, Document, EwouldblockMode, MutationType};
use binkv::{BinkvError, ClientConfig, Connection, Result};

/// binkv CLI
#[derive(Parser, Debug)]
#[command(name = "binkv-cli")]
#[command(about = "CLI for binary-protocol key-value servers")]
#[command(version)]
struct Args {
    /// Server address (default: BINKV_ADDR, then 127.0.0.1:11210)
    #[arg(short, long)]
    server: Option<String>,

    /// Username to authenticate as
    #[arg(short, long)]
    user: Option<String>,

    /// Password (falls back to the BINKV_PWFILE password file)
    #[arg(short, long)]
    password: Option<String>,

    /// SASL mechanism ("any" to let the client choose)
    #[arg(long, default_value = "PLAIN")]
    mech: String,

    /// Bucket to select after authenticating
    #[arg(short, long)]
    bucket: Option<String>,

    /// Read timeout in milliseconds (0 = block)
    #[arg(long, default_value = "5000")]
    timeout_ms: u64,

    /// Log a hex dump of every frame
    #[arg(long)]
    packet_dump: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ClapArgs, Debug)]
struct StoreArgs {
    /// The key to store
    key: String,

    /// The value to store
    value: String,

    /// Opaque client flags
    #[arg(long, default_value = "0")]
    flags: u32,

    /// Relative expiry in seconds
    #[arg(long, default_value = "0")]
    expiry: u32,
}

#[derive(ClapArgs, Debug)]
struct CounterArgs {
    /// The counter key
    key: String,

    #[arg(long, default_value = "1")]
    delta: u64,

    /// Value used when the key does not exist
    #[arg(long, default_value = "0")]
    initial: u64,

    #[arg(long, default_value = "0")]
    expiry: u32,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum BucketKind {
    Memcached,
    Ewouldblock,
    Couchbase,
}

impl From<BucketKind> for BucketType {
    fn from(kind: BucketKind) -> Self {
        match kind {
            BucketKind::Memcached => BucketType::Memcached,
            BucketKind::Ewouldblock => BucketType::EWouldBlock,
            BucketKind::Couchbase => BucketType::Couchbase,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum EwbMode {
    NextN,
    Random,
    First,
    Sequence,
}

impl From<EwbMode> for EwouldblockMode {
    fn from(mode: EwbMode) -> Self {
        match mode {
            EwbMode::NextN => EwouldblockMode::NextN,
            EwbMode::Random => EwouldblockMode::Random,
            EwbMode::First => EwouldblockMode::First,
            EwbMode::Sequence => EwouldblockMode::Sequence,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,

        #[arg(long, default_value = "0")]
        vbucket: u16,
    },

    /// Store unconditionally
    Set(StoreArgs),

    /// Store only if absent
    Add(StoreArgs),

    /// Store only if present
    Replace(StoreArgs),

    /// Append to an existing value
    Append(StoreArgs),

    /// Prepend to an existing value
    Prepend(StoreArgs),

    /// Increment a counter
    Incr(CounterArgs),

    /// Decrement a counter
    Decr(CounterArgs),

    /// Print a stat group as JSON
    Stats {
        /// Stat group (empty for the default group)
        #[arg(default_value = "")]
        group: String,
    },

    /// List buckets
    Buckets,

    /// Negotiate features and print the server's SASL mechanisms
    Hello {
        /// Free-form note logged alongside the agent
        #[arg(long, default_value = "")]
        comment: String,
    },

    /// Create a bucket
    CreateBucket {
        name: String,

        #[arg(long, default_value = "")]
        config: String,

        #[arg(long, value_enum, default_value = "memcached")]
        kind: BucketKind,
    },

    /// Delete a bucket
    DeleteBucket { name: String },

    /// Program failure injection on an ewouldblock bucket
    Ewouldblock {
        #[arg(long, value_enum, default_value = "next-n")]
        mode: EwbMode,

        /// Engine error code to inject
        #[arg(long, default_value = "7")]
        err_code: u32,

        /// Mode parameter (count, percentage or bit pattern)
        #[arg(long, default_value = "1")]
        value: u32,

        #[arg(default_value = "")]
        key: String,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,binkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    // Environment first, explicit flags on top
    let mut builder = ClientConfig::from_env()
        .into_builder()
        .read_timeout_ms(args.timeout_ms)
        .write_timeout_ms(args.timeout_ms);
    if let Some(server) = &args.server {
        builder = builder.addr(server);
    }
    if args.packet_dump {
        builder = builder.packet_dump(true);
    }
    let config = builder.build();

    let mut conn = Connection::connect(config)?;
    tracing::debug!("Opened {}", conn);

    if let Some(user) = &args.user {
        let password = resolve_password(user, args.password.as_deref())?;
        let mech = conn.authenticate(user, &password, &args.mech)?;
        tracing::info!("Authenticated as {} using {}", user, mech);
    }

    if let Some(bucket) = &args.bucket {
        conn.select_bucket(bucket)?;
    }

    match args.command {
        Commands::Get { key, vbucket } => {
            let doc = conn.get(&key, vbucket)?;
            println!("{}", String::from_utf8_lossy(&doc.value));
            tracing::info!("flags={} cas={}", doc.info.flags, doc.info.cas);
        }
        Commands::Set(store) => print_store(&mut conn, store, MutationType::Set)?,
        Commands::Add(store) => print_store(&mut conn, store, MutationType::Add)?,
        Commands::Replace(store) => print_store(&mut conn, store, MutationType::Replace)?,
        Commands::Append(store) => print_store(&mut conn, store, MutationType::Append)?,
        Commands::Prepend(store) => print_store(&mut conn, store, MutationType::Prepend)?,
        Commands::Incr(c) => println!("{}", conn.increment(&c.key, c.delta, c.initial, c.expiry)?),
        Commands::Decr(c) => println!("{}", conn.decrement(&c.key, c.delta, c.initial, c.expiry)?),
        Commands::Stats { group } => {
            let stats = conn.stats(&group)?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Commands::Buckets => {
            for name in conn.list_buckets()? {
                println!("{}", name);
            }
        }
        Commands::Hello { comment } => {
            conn.hello("binkv-cli", binkv::VERSION, &comment)?;
            println!("features: {}", conn.features());
            println!("mechanisms: {}", conn.sasl_mechanisms());
        }
        Commands::CreateBucket { name, config, kind } => {
            conn.create_bucket(&name, &config, kind.into())?;
        }
        Commands::DeleteBucket { name } => conn.delete_bucket(&name)?,
        Commands::Ewouldblock { mode, err_code, value, key } => {
            conn.configure_ewouldblock_engine(mode.into(), err_code, value, &key)?;
        }
    }

    Ok(())
}

fn print_store<T: binkv::network::Transport>(
    conn: &mut Connection<T>,
    store: StoreArgs,
    mutation: MutationType,
) -> Result<()> {
    let mut doc = Document::new(store.key, store.value);
    doc.info.flags = store.flags;
    doc.info.expiry = store.expiry;

    let info = conn.mutate(&doc, 0, mutation)?;
    println!("cas={}", info.cas);
    Ok(())
}

fn resolve_password(user: &str, given: Option<&str>) -> Result<String> {
    if let Some(password) = given {
        return Ok(password.to_string());
    }
    let file = PasswordFile::from_env()?
        .ok_or_else(|| BinkvError::Config("No password given and BINKV_PWFILE not set".to_string()))?;
    file.lookup(user)
        .map(|c| c.password().to_string())
        .ok_or_else(|| BinkvError::Config(format!("No password for {} in password file", user)))
}
