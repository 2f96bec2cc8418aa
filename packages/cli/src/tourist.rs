//! Tourist planner screen: origin, destination and a list of places to
//! visit, in order.

use dialoguer::Select;
use route_planner_cli_utils::prompt_optional;
use route_planner_route::PlannerSession;
use route_planner_route::planner::TouristPlanner;
use route_planner_route_models::{PlannerMode, RouteEntry};

use crate::traveler::slot;
use crate::{Context, output, prompt};

/// Runs the tourist menu until the user goes back.
///
/// # Errors
///
/// Returns an error if a terminal prompt fails.
pub async fn run(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = PlannerSession::new(PlannerMode::Tourist);

    loop {
        if let PlannerSession::Tourist(planner) = &session {
            println!();
            for line in summary(planner) {
                println!("{line}");
            }
            println!();
        }

        let items = &[
            "Set origin",
            "Set destination",
            "Set places to visit",
            "Preferences",
            "Location bias",
            "Generate route",
            "Back",
        ];

        let selection = Select::new()
            .with_prompt("Tourist planner")
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
                let text = prompt_places()?;
                session.set_stops_text(&text)?;
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

/// Reads places one per line until a blank answer and returns them as
/// newline separated text.
fn prompt_places() -> dialoguer::Result<String> {
    println!("Enter the places to visit in order. Leave blank to finish.");
    let mut lines = Vec::new();
    while let Some(place) = prompt_optional(&format!("Place {}", lines.len() + 1))? {
        lines.push(place);
    }
    Ok(lines.join("\n"))
}

fn current_slot(
    session: &PlannerSession,
    pick: impl Fn(&TouristPlanner) -> Option<&RouteEntry>,
) -> Option<RouteEntry> {
    match session {
        PlannerSession::Tourist(planner) => pick(planner).cloned(),
        _ => None,
    }
}

fn summary(planner: &TouristPlanner) -> Vec<String> {
    let mut lines = vec![format!("Origin:      {}", slot(planner.origin.as_ref()))];
    let stops = planner.stops_text();
    if stops.is_empty() {
        lines.push("Visit:       (none)".to_string());
    } else {
        lines.extend(stops.lines().map(|stop| format!("Visit:       {stop}")));
    }
    lines.push(format!(
        "Destination: {}",
        slot(planner.destination.as_ref())
    ));
    lines
}
