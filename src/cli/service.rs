use anyhow::Result;
use clap::{Args, Subcommand};

use super::{print_entry, print_virtual_attrs, StoreContext};
use crate::fields::FieldValue;
use crate::objects::service::{service_mod, service_setup, service_show};
use crate::objects::CONTAINER_KEY;
use crate::transcode::FieldUpdates;

#[derive(Subcommand)]
pub(crate) enum ServiceCommand {
    /// Create the DHCP service entry
    Setup {
        /// Comments
        #[arg(long)]
        comments: Option<String>,
    },

    /// Display the DHCP configuration
    Show,

    /// Modify the DHCP configuration
    Mod(ServiceModArgs),
}

#[derive(Args)]
pub(crate) struct ServiceModArgs {
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

    /// Comments
    #[arg(long)]
    comments: Option<String>,
}

impl ServiceModArgs {
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
        updates
    }
}

pub(crate) fn run(ctx: &StoreContext, cmd: ServiceCommand) -> Result<()> {
    match cmd {
        ServiceCommand::Setup { comments } => ctx.mutate(|store| {
            let entry = service_setup(store, comments.as_deref())?;
            println!("Created the DHCP configuration");
            print_entry(CONTAINER_KEY, &entry);
            Ok(())
        }),

        ServiceCommand::Show => {
            let store = ctx.read()?;
            let (entry, virtual_attrs) = service_show(&store)?;
            print_entry(CONTAINER_KEY, &entry);
            print_virtual_attrs(&virtual_attrs);
            Ok(())
        }

        ServiceCommand::Mod(args) => ctx.mutate(|store| {
            let (entry, virtual_attrs) =
                service_mod(store, &args.updates(), args.comments.as_deref())?;
            println!("Modified the DHCP configuration");
            print_entry(CONTAINER_KEY, &entry);
            print_virtual_attrs(&virtual_attrs);
            Ok(())
        }),
    }
}
