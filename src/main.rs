use clap::Parser;
use colored::Colorize;
use ip_address_pool::config;
use ip_address_pool::output::{format_addresses, format_used_addresses};
use ip_address_pool::AddressPool;
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use std::error::Error;
use std::path::PathBuf;

/// Hand out IPv4 host addresses from a pool kept in a JSON file.
#[derive(Parser, Debug)]
#[command(name = "ip-pool", version)]
struct Cli {
    /// Path to ip pool database json file
    #[arg(env = config::ENV_POOL_DB)]
    pool_db_json: PathBuf,

    /// Initialize IP pool with the provided CIDR address/netmask
    #[arg(long, value_name = "CIDR_ADDRESS")]
    initialize: Option<String>,

    /// Allocate next unused address to HOSTNAME
    #[arg(long, value_name = "HOSTNAME")]
    new_address: Option<String>,

    /// Print the address assigned to HOSTNAME
    #[arg(long, value_name = "HOSTNAME")]
    address_for: Option<String>,

    /// Return the address of HOSTNAME to the pool
    #[arg(long, value_name = "HOSTNAME")]
    release: Option<String>,

    /// Print all hostnames and their addresses
    #[arg(long)]
    used: bool,

    /// Print every address of the pool
    #[arg(long)]
    list: bool,
}

fn main() {
    // Do as little as possible in main.rs as it can't contain any tests
    dotenv::dotenv().ok();
    init_logging();
    log::info!("#Start main()");

    if let Err(e) = run(Cli::parse()) {
        eprintln!("{} {e}", "error:".red().bold());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut pool = AddressPool::open(&cli.pool_db_json)?;

    if let Some(cidr) = &cli.initialize {
        pool.initialize(cidr)?;
    }
    if let Some(hostname) = &cli.new_address {
        println!("{}", pool.new_address(hostname)?);
    }
    if let Some(hostname) = &cli.address_for {
        println!("{}", pool.address_for(hostname)?);
    }
    if let Some(hostname) = &cli.release {
        pool.release_address(hostname)?;
    }
    if cli.used {
        for line in format_used_addresses(&pool.used_addresses()) {
            println!("{line}");
        }
    }
    if cli.list {
        for line in format_addresses(&pool.addresses(), &pool.used_addresses()) {
            println!("{line}");
        }
    }
    Ok(())
}

fn init_logging() {
    let log_config = config::log_config_path();
    if log4rs::init_file(&log_config, Default::default()).is_ok() {
        return;
    }
    // no config file, warnings to stderr only
    let stderr = ConsoleAppender::builder().target(Target::Stderr).build();
    let fallback = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(LevelFilter::Warn));
    if let Ok(fallback) = fallback {
        let _ = log4rs::init_config(fallback);
    }
}
