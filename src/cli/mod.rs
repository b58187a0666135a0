use anyhow::Result;
use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::entry::ConfigEntry;
use crate::filestore::FileStore;
use crate::transcode::VirtualAttrs;

mod host;
mod pool;
mod server;
mod service;
mod subnet;

#[derive(Parser)]
#[command(
    name = "dhcpdir",
    about = "Manage ISC DHCP configuration stored as directory-service entries",
    long_about = "Exposes DHCP service, subnet, pool, host and server configuration as \
                  directory entries whose raw statement/option lists carry ISC DHCP \
                  configuration-language fragments.",
    after_help = "Examples:\n  dhcpdir --store ./dhcp.xml service setup\n  dhcpdir --store ./dhcp.xml service mod --default-lease-time 3600\n  dhcpdir --store ./dhcp.xml subnet add-cidr 10.0.0.0/24\n  dhcpdir --store ./dhcp.xml pool add 10.0.0.0 backyard --range \"10.0.0.5 10.0.0.10\"\n  dhcpdir --store ./dhcp.xml host add host1.example.com aa:bb:cc:dd:ee:ff"
)]
struct Cli {
    /// Entry store file
    #[arg(long, global = true, default_value = "dhcpdir.xml")]
    store: PathBuf,

    /// Print a diff of the would-be store changes instead of writing them
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the DHCP service configuration
    #[command(subcommand)]
    Service(service::ServiceCommand),

    /// Manage DHCP subnets
    #[command(subcommand)]
    Subnet(subnet::SubnetCommand),

    /// Manage DHCP pools
    #[command(subcommand)]
    Pool(pool::PoolCommand),

    /// Manage DHCP hosts
    #[command(subcommand)]
    Host(host::HostCommand),

    /// Manage DHCP servers
    #[command(subcommand)]
    Server(server::ServerCommand),
}

pub fn run_with_args<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    let ctx = StoreContext {
        path: cli.store,
        dry_run: cli.dry_run,
    };

    match cli.command {
        Commands::Service(cmd) => service::run(&ctx, cmd),
        Commands::Subnet(cmd) => subnet::run(&ctx, cmd),
        Commands::Pool(cmd) => pool::run(&ctx, cmd),
        Commands::Host(cmd) => host::run(&ctx, cmd),
        Commands::Server(cmd) => server::run(&ctx, cmd),
    }
}

pub(crate) struct StoreContext {
    path: PathBuf,
    dry_run: bool,
}

impl StoreContext {
    /// Open the store for a read-only command.
    pub(crate) fn read(&self) -> Result<FileStore> {
        FileStore::open(&self.path)
    }

    /// Run a mutating command: load, apply, then write the store back
    /// atomically. With --dry-run the file is left untouched and a unified
    /// diff of the would-be change is printed instead.
    pub(crate) fn mutate<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut FileStore) -> Result<()>,
    {
        let mut store = FileStore::open(&self.path)?;
        let before = store.render()?;
        f(&mut store)?;
        let after = store.render()?;

        if self.dry_run {
            if before == after {
                println!("No changes.");
            } else {
                let diff = similar::TextDiff::from_lines(&before, &after);
                let unified = diff
                    .unified_diff()
                    .context_radius(3)
                    .header("stored", "modified")
                    .to_string();
                let mut out = io::stdout().lock();
                write!(out, "{}", unified)?;
            }
            return Ok(());
        }

        if before == after {
            return Ok(());
        }
        store.save()
    }
}

pub(crate) fn print_entry(key: &str, entry: &ConfigEntry) {
    println!("dn: {key}");
    for (name, values) in entry.iter() {
        for value in values {
            println!("  {name}: {value}");
        }
    }
}

pub(crate) fn print_virtual_attrs(virtual_attrs: &VirtualAttrs) {
    for (name, value) in virtual_attrs {
        println!("  {name}: {value}");
    }
}

pub(crate) fn print_matches(matches: &[(String, ConfigEntry)], singular: &str, plural: &str) {
    for (key, entry) in matches {
        print_entry(key, entry);
    }
    let noun = if matches.len() == 1 { singular } else { plural };
    println!("{} {noun} matched", matches.len());
}
