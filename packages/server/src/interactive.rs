//! Interactive mode for the server.
//!
//! Prompts for the listen address and geocoder timeout, shows which
//! geocoding service will be used, then starts the server.

use std::time::Duration;

use dialoguer::{Confirm, Input};
use route_planner_geocoder::resolver::{AddressResolver, ResolverConfig};
use route_planner_geocoder::service_registry;

use crate::ServerConfig;

/// Runs the server in interactive mode, prompting for configuration.
///
/// Environment values (`BIND_ADDR`, `PORT`, `GEOCODER_TIMEOUT_MS`) are
/// offered as defaults.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the underlying server fails to
/// start.
#[allow(clippy::future_not_send)]
pub async fn run() -> std::io::Result<()> {
    println!("Route Planner Server");
    println!();

    let defaults = ServerConfig::from_env();
    let mut resolver_config = ResolverConfig::from_env();

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default(defaults.bind_addr.clone())
        .interact_text()
        .unwrap_or(defaults.bind_addr);

    let port: u16 = Input::new()
        .with_prompt("Port")
        .default(defaults.port)
        .interact_text()
        .unwrap_or(defaults.port);

    let default_timeout = u64::try_from(resolver_config.timeout.as_millis()).unwrap_or(u64::MAX);
    let timeout_ms: u64 = Input::new()
        .with_prompt("Geocoder timeout (ms)")
        .default(default_timeout)
        .interact_text()
        .unwrap_or(default_timeout);
    resolver_config.timeout = Duration::from_millis(timeout_ms);

    let client = service_registry::client_from_env();
    match &client {
        Some(client) => println!("Geocoder: {:?}", client.provider()),
        None => println!("Geocoder: none (suggestions disabled, addresses echoed)"),
    }

    if !Confirm::new()
        .with_prompt(format!("Start server on {bind_addr}:{port}?"))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::serve(
        ServerConfig { bind_addr, port },
        AddressResolver::new(client, resolver_config),
    )
    .await
}
