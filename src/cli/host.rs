use anyhow::Result;
use clap::Subcommand;

use super::{print_entry, print_matches, StoreContext};
use crate::objects::host::{host_add, host_del, host_find, host_show, host_sync_macs, key};

#[derive(Subcommand)]
pub(crate) enum HostCommand {
    /// Create a DHCP host record for a hostname/MAC pair
    Add {
        /// Hostname
        hostname: String,

        /// MAC address (HH:HH:HH:HH:HH:HH)
        macaddress: String,
    },

    /// Delete the DHCP host record for a hostname/MAC pair
    Del {
        /// Hostname
        hostname: String,

        /// MAC address (HH:HH:HH:HH:HH:HH)
        macaddress: String,
    },

    /// Display a DHCP host by canonical name
    Show {
        /// Canonical name, e.g. host1-AABBCCDDEEFF
        cn: String,
    },

    /// Search for DHCP hosts
    Find {
        /// Substring to match against names and hardware addresses
        #[arg(default_value = "")]
        needle: String,
    },

    /// Reconcile a host's DHCP records with a MAC address list
    Sync {
        /// Hostname
        hostname: String,

        /// Desired MAC addresses; an empty list removes all records
        #[arg(long = "mac")]
        macs: Vec<String>,
    },
}

pub(crate) fn run(ctx: &StoreContext, cmd: HostCommand) -> Result<()> {
    match cmd {
        HostCommand::Add {
            hostname,
            macaddress,
        } => ctx.mutate(|store| {
            let (cn, entry) = host_add(store, &hostname, &macaddress)?;
            println!("Created DHCP host \"{cn}\"");
            print_entry(&key(&cn), &entry);
            Ok(())
        }),

        HostCommand::Del {
            hostname,
            macaddress,
        } => ctx.mutate(|store| {
            let cn = host_del(store, &hostname, &macaddress)?;
            println!("Deleted DHCP host \"{cn}\"");
            Ok(())
        }),

        HostCommand::Show { cn } => {
            let store = ctx.read()?;
            let entry = host_show(&store, &cn)?;
            print_entry(&key(&cn), &entry);
            Ok(())
        }

        HostCommand::Find { needle } => {
            let store = ctx.read()?;
            let matches = host_find(&store, &needle)?;
            print_matches(&matches, "DHCP host", "DHCP hosts");
            Ok(())
        }

        HostCommand::Sync { hostname, macs } => ctx.mutate(|store| {
            host_sync_macs(store, &hostname, &macs)?;
            let remaining = host_find(store, &format!("{hostname}-"))?;
            println!(
                "Synchronized DHCP records for \"{hostname}\" ({} remaining)",
                remaining.len()
            );
            Ok(())
        }),
    }
}
