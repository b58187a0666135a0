use anyhow::Result;
use clap::{Args, Subcommand};

use super::{print_entry, print_matches, print_virtual_attrs, StoreContext};
use crate::fields::FieldValue;
use crate::objects::pool::{
    key, pool_add, pool_check_range, pool_del, pool_find, pool_mod, pool_show, PoolCreate,
};
use crate::transcode::FieldUpdates;

#[derive(Subcommand)]
pub(crate) enum PoolCommand {
    /// Create a new DHCP pool under a subnet
    Add(PoolAddArgs),

    /// Display a DHCP pool
    Show {
        /// Parent subnet network address
        subnet: String,

        /// Pool name
        name: String,
    },

    /// Modify a DHCP pool
    Mod(PoolModArgs),

    /// Delete a DHCP pool
    Del {
        /// Parent subnet network address
        subnet: String,

        /// Pool name
        name: String,
    },

    /// Search for DHCP pools
    Find {
        /// Substring to match against pool names and ranges
        #[arg(default_value = "")]
        needle: String,
    },

    /// Check that an address range fits a subnet
    CheckRange {
        /// Parent subnet network address
        subnet: String,

        /// Address range, e.g. "10.0.0.5 10.0.0.10"
        range: String,
    },
}

#[derive(Args)]
pub(crate) struct PoolAddArgs {
    /// Parent subnet network address
    subnet: String,

    /// Pool name
    name: String,

    /// Address range, e.g. "10.0.0.5 10.0.0.10"
    #[arg(long)]
    range: String,

    /// Initial permit list lines (defaults to allowing both client classes)
    #[arg(long = "permit")]
    permit: Option<Vec<String>>,

    /// Initial raw statement lines
    #[arg(long = "statement")]
    statements: Vec<String>,

    /// Initial raw option lines
    #[arg(long = "option")]
    options: Vec<String>,

    /// Comments
    #[arg(long)]
    comments: Option<String>,
}

#[derive(Args)]
pub(crate) struct PoolModArgs {
    /// Parent subnet network address
    subnet: String,

    /// Pool name
    name: String,

    /// Default lease time in seconds
    #[arg(long)]
    default_lease_time: Option<u32>,

    /// Maximum lease time in seconds
    #[arg(long)]
    max_lease_time: Option<u32>,

    /// DNS domain name handed to clients
    #[arg(long)]
    domain_name: Option<String>,

    /// DNS servers handed to clients (comma-separated)
    #[arg(long, value_delimiter = ',')]
    domain_name_servers: Option<Vec<String>>,

    /// DNS search list handed to clients (comma-separated)
    #[arg(long, value_delimiter = ',')]
    domain_search: Option<Vec<String>>,

    /// Permit known clients (true/false)
    #[arg(long)]
    permit_known_clients: Option<bool>,

    /// Permit unknown clients (true/false)
    #[arg(long)]
    permit_unknown_clients: Option<bool>,

    /// Comments
    #[arg(long)]
    comments: Option<String>,
}

impl PoolModArgs {
    fn updates(&self) -> FieldUpdates {
        let mut updates = FieldUpdates::new();
        if let Some(v) = self.default_lease_time {
            updates.push(("defaultleasetime".to_string(), FieldValue::Int(v)));
        }
        if let Some(v) = self.max_lease_time {
            updates.push(("maxleasetime".to_string(), FieldValue::Int(v)));
        }
        if let Some(v) = &self.domain_name {
            updates.push(("domainname".to_string(), FieldValue::Text(v.clone())));
        }
        if let Some(v) = &self.domain_name_servers {
            updates.push(("domainnameservers".to_string(), FieldValue::List(v.clone())));
        }
        if let Some(v) = &self.domain_search {
            updates.push(("domainsearch".to_string(), FieldValue::List(v.clone())));
        }
        if let Some(v) = self.permit_known_clients {
            updates.push(("permitknownclients".to_string(), FieldValue::Flag(v)));
        }
        if let Some(v) = self.permit_unknown_clients {
            updates.push(("permitunknownclients".to_string(), FieldValue::Flag(v)));
        }
        updates
    }
}

pub(crate) fn run(ctx: &StoreContext, cmd: PoolCommand) -> Result<()> {
    match cmd {
        PoolCommand::Add(args) => ctx.mutate(|store| {
            let create = PoolCreate {
                permit_list: args.permit.clone(),
                statements: args.statements.clone(),
                options: args.options.clone(),
                comments: args.comments.clone(),
            };
            let entry = pool_add(store, &args.subnet, &args.name, &args.range, &create)?;
            println!("Created DHCP pool \"{}\"", args.name);
            print_entry(&key(&args.subnet, &args.name), &entry);
            Ok(())
        }),

        PoolCommand::Show { subnet, name } => {
            let store = ctx.read()?;
            let (entry, virtual_attrs) = pool_show(&store, &subnet, &name)?;
            print_entry(&key(&subnet, &name), &entry);
            print_virtual_attrs(&virtual_attrs);
            Ok(())
        }

        PoolCommand::Mod(args) => ctx.mutate(|store| {
            let (entry, virtual_attrs) = pool_mod(
                store,
                &args.subnet,
                &args.name,
                &args.updates(),
                args.comments.as_deref(),
            )?;
            println!("Modified a DHCP pool");
            print_entry(&key(&args.subnet, &args.name), &entry);
            print_virtual_attrs(&virtual_attrs);
            Ok(())
        }),

        PoolCommand::Del { subnet, name } => ctx.mutate(|store| {
            pool_del(store, &subnet, &name)?;
            println!("Deleted DHCP pool \"{name}\"");
            Ok(())
        }),

        PoolCommand::Find { needle } => {
            let store = ctx.read()?;
            let matches = pool_find(&store, &needle)?;
            print_matches(&matches, "DHCP pool", "DHCP pools");
            Ok(())
        }

        PoolCommand::CheckRange { subnet, range } => {
            let store = ctx.read()?;
            let check = pool_check_range(&store, &subnet, &range)?;
            println!("{check}");
            if !check.is_valid() {
                anyhow::bail!("check-range: invalid pool range");
            }
            Ok(())
        }
    }
}
