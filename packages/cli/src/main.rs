#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Interactive route planner.
//!
//! Lets users pick a planner mode (professional, traveler, tourist) and
//! walks them through building an itinerary, or starts the HTTP API.
//!
//! Uses `indicatif-log-bridge` (via [`route_planner_cli_utils::init_logger`])
//! so that log lines and geocoder spinners never fight for the terminal.

mod output;
mod professional;
mod prompt;
mod tourist;
mod traveler;

use dialoguer::Select;
use route_planner_cli_utils::MultiProgress;
use route_planner_geocoder::resolver::AddressResolver;

/// Shared state for the planner screens.
pub struct Context {
    pub resolver: AddressResolver,
    pub multi: MultiProgress,
}

impl Context {
    fn new(multi: MultiProgress) -> Self {
        let resolver = AddressResolver::from_env();
        if !resolver.is_available() {
            println!("No geocoder configured: suggestions are off and addresses are used as typed.");
        }
        Self { resolver, multi }
    }
}

/// Top-level selection.
enum Tool {
    Professional,
    Traveler,
    Tourist,
    Server,
}

impl Tool {
    const ALL: &[Self] = &[
        Self::Professional,
        Self::Traveler,
        Self::Tourist,
        Self::Server,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Professional => "Professional planner (editable point list)",
            Self::Traveler => "Traveler planner (origin, destination, one stop)",
            Self::Tourist => "Tourist planner (list of places to visit)",
            Self::Server => "Start server",
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = route_planner_cli_utils::init_logger();

    println!("Route Planner");
    println!();

    let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Tool::ALL[idx] {
        Tool::Professional => professional::run(&Context::new(multi)).await?,
        Tool::Traveler => traveler::run(&Context::new(multi)).await?,
        Tool::Tourist => tourist::run(&Context::new(multi)).await?,
        Tool::Server => {
            // The server uses actix-web's runtime, so we need to run it
            // in a blocking task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(|| {
                actix_web::rt::System::new().block_on(route_planner_server::interactive::run())
            })
            .await??;
        }
    }

    Ok(())
}
