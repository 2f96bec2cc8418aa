//! Traveler planner screen: origin, destination and one optional stop.

use dialoguer::Select;
use route_planner_geocoder::address;
use route_planner_route::PlannerSession;
use route_planner_route::planner::TravelerPlanner;
use route_planner_route_models::{PlannerMode, RouteEntry};

use crate::{Context, output, prompt};

/// Runs the traveler menu until the user goes back.
///
/// # Errors
///
/// Returns an error if a terminal prompt fails.
pub async fn run(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = PlannerSession::new(PlannerMode::Traveler);

    loop {
        if let PlannerSession::Traveler(planner) = &session {
            println!();
            println!("Origin:      {}", slot(planner.origin.as_ref()));
            println!("Stop:        {}", slot(planner.stop.as_ref()));
            println!("Destination: {}", slot(planner.destination.as_ref()));
            println!();
        }

        let items = &[
            "Set origin",
            "Set destination",
            "Set stop",
            "Preferences",
            "Location bias",
            "Generate route",
            "Back",
        ];

        let selection = Select::new()
            .with_prompt("Traveler planner")
            .items(items)
            .default(0)
            .interact()?;

        let bias = session.settings().bias;
        match selection {
            0 => {
                let current = current_slot(&session, |p| p.origin.as_ref());
                let entry =
                    prompt::prompt_address(ctx, "Origin", current.as_ref(), bias.as_ref()).await?;
                session.set_origin(entry)?;
            }
            1 => {
                let current = current_slot(&session, |p| p.destination.as_ref());
                let entry =
                    prompt::prompt_address(ctx, "Destination", current.as_ref(), bias.as_ref())
                        .await?;
                session.set_destination(entry)?;
            }
            2 => {
                let current = current_slot(&session, |p| p.stop.as_ref());
                let entry = prompt::prompt_address(
                    ctx,
                    "Stop (blank for none)",
                    current.as_ref(),
                    bias.as_ref(),
                )
                .await?;
                session.set_stop(entry)?;
            }
            3 => prompt::preferences(session.settings_mut(), false)?,
            4 => prompt::bias(session.settings_mut())?,
            5 => match session.generate(&ctx.resolver).await {
                Ok(links) => output::print_route(&links, &session.settings().options),
                Err(e) => println!("{e}"),
            },
            6 => return Ok(()),
            _ => unreachable!(),
        }
    }
}

fn current_slot(
    session: &PlannerSession,
    pick: impl Fn(&TravelerPlanner) -> Option<&RouteEntry>,
) -> Option<RouteEntry> {
    match session {
        PlannerSession::Traveler(planner) => pick(planner).cloned(),
        _ => None,
    }
}

/// Display text for a slot.
pub fn slot(entry: Option<&RouteEntry>) -> String {
    entry
        .and_then(|e| address::normalize(&e.input))
        .unwrap_or_else(|| "(not set)".to_string())
}
