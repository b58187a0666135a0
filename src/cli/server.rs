use anyhow::Result;
use clap::Subcommand;

use super::{print_entry, print_matches, StoreContext};
use crate::objects::server::{
    key, server_add, server_del, server_find, server_mod, server_show,
};

#[derive(Subcommand)]
pub(crate) enum ServerCommand {
    /// Register a DHCP server
    Add {
        /// Server hostname
        hostname: String,

        /// Comments
        #[arg(long)]
        comments: Option<String>,
    },

    /// Display a DHCP server
    Show {
        /// Server hostname
        hostname: String,
    },

    /// Modify a DHCP server
    Mod {
        /// Server hostname
        hostname: String,

        /// Comments
        #[arg(long)]
        comments: Option<String>,
    },

    /// Deregister a DHCP server
    Del {
        /// Server hostname
        hostname: String,
    },

    /// Search for DHCP servers
    Find {
        /// Substring to match against hostnames and service DNs
        #[arg(default_value = "")]
        needle: String,
    },
}

pub(crate) fn run(ctx: &StoreContext, cmd: ServerCommand) -> Result<()> {
    match cmd {
        ServerCommand::Add { hostname, comments } => ctx.mutate(|store| {
            let entry = server_add(store, &hostname, comments.as_deref())?;
            println!("Created DHCP server \"{hostname}\"");
            print_entry(&key(&hostname), &entry);
            Ok(())
        }),

        ServerCommand::Show { hostname } => {
            let store = ctx.read()?;
            let entry = server_show(&store, &hostname)?;
            print_entry(&key(&hostname), &entry);
            Ok(())
        }

        ServerCommand::Mod { hostname, comments } => ctx.mutate(|store| {
            let entry = server_mod(store, &hostname, comments.as_deref())?;
            println!("Modified a DHCP server");
            print_entry(&key(&hostname), &entry);
            Ok(())
        }),

        ServerCommand::Del { hostname } => ctx.mutate(|store| {
            server_del(store, &hostname)?;
            println!("Deleted DHCP server \"{hostname}\"");
            Ok(())
        }),

        ServerCommand::Find { needle } => {
            let store = ctx.read()?;
            let matches = server_find(&store, &needle)?;
            print_matches(&matches, "DHCP server", "DHCP servers");
            Ok(())
        }
    }
}
