use anyhow::Result;
use clap::{Args, Subcommand};
use std::net::Ipv4Addr;

use super::{print_entry, print_matches, print_virtual_attrs, StoreContext};
use crate::fields::FieldValue;
use crate::objects::subnet::{
    key, subnet_add, subnet_add_cidr, subnet_del, subnet_find, subnet_mod, subnet_show,
    DEFAULT_NETMASK,
};
use crate::transcode::FieldUpdates;

#[derive(Subcommand)]
pub(crate) enum SubnetCommand {
    /// Create a new DHCP subnet
    Add {
        /// Subnet network address
        subnet: Ipv4Addr,

        /// Prefix length (0-32)
        #[arg(long, default_value_t = DEFAULT_NETMASK)]
        netmask: u8,

        /// Comments
        #[arg(long)]
        comments: Option<String>,
    },

    /// Create a new DHCP subnet from CIDR notation
    AddCidr {
        /// Network address in CIDR notation, e.g. 10.0.0.0/24
        networkaddr: String,

        /// Comments
        #[arg(long)]
        comments: Option<String>,
    },

    /// Display a DHCP subnet
    Show {
        /// Subnet network address
        subnet: String,
    },

    /// Modify a DHCP subnet
    Mod(SubnetModArgs),

    /// Delete a DHCP subnet and its pools
    Del {
        /// Subnet network address
        subnet: String,
    },

    /// Search for DHCP subnets
    Find {
        /// Substring to match against subnet addresses
        #[arg(default_value = "")]
        needle: String,
    },
}

#[derive(Args)]
pub(crate) struct SubnetModArgs {
    /// Subnet network address
    subnet: String,

    /// Router handed to clients
    #[arg(long)]
    router: Option<String>,

    /// Comments
    #[arg(long)]
    comments: Option<String>,
}

impl SubnetModArgs {
    fn updates(&self) -> FieldUpdates {
        let mut updates = FieldUpdates::new();
        if let Some(v) = &self.router {
            updates.push(("router".to_string(), FieldValue::Text(v.clone())));
        }
        updates
    }
}

pub(crate) fn run(ctx: &StoreContext, cmd: SubnetCommand) -> Result<()> {
    match cmd {
        SubnetCommand::Add {
            subnet,
            netmask,
            comments,
        } => ctx.mutate(|store| {
            let entry = subnet_add(store, subnet, netmask, comments.as_deref())?;
            println!("Created DHCP subnet \"{subnet}\"");
            print_entry(&key(&subnet.to_string()), &entry);
            Ok(())
        }),

        SubnetCommand::AddCidr {
            networkaddr,
            comments,
        } => ctx.mutate(|store| {
            let entry = subnet_add_cidr(store, &networkaddr, comments.as_deref())?;
            let cn = entry.first(crate::ATTR_CN).unwrap_or_default().to_string();
            println!("Created DHCP subnet \"{cn}\"");
            print_entry(&key(&cn), &entry);
            Ok(())
        }),

        SubnetCommand::Show { subnet } => {
            let store = ctx.read()?;
            let (entry, virtual_attrs) = subnet_show(&store, &subnet)?;
            print_entry(&key(&subnet), &entry);
            print_virtual_attrs(&virtual_attrs);
            Ok(())
        }

        SubnetCommand::Mod(args) => ctx.mutate(|store| {
            let (entry, virtual_attrs) =
                subnet_mod(store, &args.subnet, &args.updates(), args.comments.as_deref())?;
            println!("Modified a DHCP subnet");
            print_entry(&key(&args.subnet), &entry);
            print_virtual_attrs(&virtual_attrs);
            Ok(())
        }),

        SubnetCommand::Del { subnet } => ctx.mutate(|store| {
            subnet_del(store, &subnet)?;
            println!("Deleted DHCP subnet \"{subnet}\"");
            Ok(())
        }),

        SubnetCommand::Find { needle } => {
            let store = ctx.read()?;
            let matches = subnet_find(&store, &needle)?;
            print_matches(&matches, "DHCP subnet", "DHCP subnets");
            Ok(())
        }
    }
}
