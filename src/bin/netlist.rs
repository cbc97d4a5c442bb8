//! netlist: print every network connection the Network List Manager knows.
//!
//! Usage: netlist [--networks] [--make-public]
//!
//!   --networks     list all known networks instead of live connections
//!   --make-public  switch every Private network to Public (needs admin)
//!
//! Logging is controlled with `RUST_LOG` (default `netlistmgr=info`).

use std::ops::ControlFlow;

use anyhow::{Context, Result};

use netlistmgr::com::runtime;
use netlistmgr::nlm::{EnumNetworkFlags, Manager, Network, NetworkCategory};
use netlistmgr::RuntimeConfig;

#[derive(Debug, Default)]
struct Options {
    networks: bool,
    make_public: bool,
}

fn parse_args() -> Result<Option<Options>> {
    let mut opts = Options::default();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--networks" => opts.networks = true,
            "--make-public" => opts.make_public = true,
            "-h" | "--help" => {
                println!("Usage: netlist [--networks] [--make-public]");
                return Ok(None);
            }
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }
    Ok(Some(opts))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "netlistmgr=info".into()),
        )
        .init();

    let Some(opts) = parse_args()? else {
        return Ok(());
    };

    let config = RuntimeConfig::load().context("failed to load configuration")?;
    runtime::initialize_with(&config).context("failed to initialize COM")?;

    let result = run(&opts);
    runtime::uninitialize();
    result
}

fn run(opts: &Options) -> Result<()> {
    let manager = Manager::new().context("failed to create network list manager")?;
    println!(
        "Connectivity: {} (internet: {})",
        manager.connectivity()?,
        manager.is_connected_to_internet()?
    );
    println!();

    if opts.networks {
        let networks = manager
            .networks(EnumNetworkFlags::ALL)
            .context("failed to list networks")?;
        for network in &networks {
            report(network, opts.make_public)?;
        }
        return Ok(());
    }

    let connections = manager
        .network_connections()
        .context("failed to list network connections")?;
    let mut failure = None;
    connections.for_each(|index, connection| {
        let outcome = connection
            .network()
            .map_err(anyhow::Error::from)
            .and_then(|network| {
                println!("Adapter: {}", connection.adapter_id()?);
                report(&network, opts.make_public)
            });
        match outcome {
            Ok(()) => ControlFlow::Continue(()),
            Err(err) => {
                failure = Some(err.context(format!("connection {index}")));
                ControlFlow::Break(())
            }
        }
    });
    failure.map_or(Ok(()), Err)
}

fn report(network: &Network, make_public: bool) -> Result<()> {
    let name = network.name()?;
    println!("Name: {name:?}");
    println!("Description: {:?}", network.description()?);

    let category = network.category()?;
    println!("Category: {category}");
    if make_public && category == NetworkCategory::PRIVATE {
        network
            .set_category(NetworkCategory::PUBLIC)
            .with_context(|| format!("failed to change category of {name}"))?;
        println!("Category changed to: {}", network.category()?);
    }

    println!("Domain Type: {}", network.domain_type()?);
    println!("Connectivity: {}", network.connectivity()?);
    println!("Network Connections: {}", network.network_connections()?.size());
    println!("Network ID: {}", network.network_id()?);
    let (created, connected) = network.time_created_and_connected()?;
    println!("Created At: {created}");
    println!("Connected At: {connected}");
    println!("Connected to internet: {}", network.is_connected_to_internet()?);
    println!("Connected: {}", network.is_connected()?);
    println!();
    Ok(())
}
