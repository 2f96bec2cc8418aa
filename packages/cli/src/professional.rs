//! Professional planner screen: an editable, ordered list of points.

use dialoguer::{Confirm, Select};
use route_planner_geocoder::address;
use route_planner_route::{Direction, PlannerSession, RoutePointList};
use route_planner_route_models::PlannerMode;

use crate::{Context, output, prompt};

/// Runs the point list menu until the user goes back.
///
/// # Errors
///
/// Returns an error if a terminal prompt fails.
pub async fn run(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = PlannerSession::new(PlannerMode::Professional);

    loop {
        println!();
        for line in list_lines(session.points_mut()?) {
            println!("{line}");
        }
        println!();

        let items = &[
            "Add point",
            "Select point",
            "Move selected up",
            "Move selected down",
            "Edit selected",
            "Delete selected",
            "Clear all",
            "Preferences",
            "Location bias",
            "Generate route",
            "Back",
        ];

        let selection = Select::new()
            .with_prompt("Professional planner")
            .items(items)
            .default(0)
            .interact()?;

        match selection {
            0 => add_point(ctx, &mut session).await?,
            1 => select_point(session.points_mut()?)?,
            2 => move_selected(session.points_mut()?, Direction::Up),
            3 => move_selected(session.points_mut()?, Direction::Down),
            4 => edit_selected(ctx, &mut session).await?,
            5 => {
                if let Some(removed) = session.points_mut()?.delete_active() {
                    log::info!(
                        "Removed {}",
                        address::normalize(&removed.input).unwrap_or_default()
                    );
                }
            }
            6 => {
                if Confirm::new()
                    .with_prompt("Remove every point?")
                    .default(false)
                    .interact()?
                {
                    session.points_mut()?.clear();
                }
            }
            7 => prompt::preferences(session.settings_mut(), true)?,
            8 => prompt::bias(session.settings_mut())?,
            9 => match session.generate(&ctx.resolver).await {
                Ok(links) => output::print_route(&links, &session.settings().options),
                Err(e) => println!("{e}"),
            },
            10 => return Ok(()),
            _ => unreachable!(),
        }
    }
}

async fn add_point(
    ctx: &Context,
    session: &mut PlannerSession,
) -> Result<(), Box<dyn std::error::Error>> {
    let bias = session.settings().bias;
    let Some(entry) = prompt::prompt_address(ctx, "Address", None, bias.as_ref()).await? else {
        return Ok(());
    };
    if let Err(e) = session.points_mut()?.add_entry(entry) {
        println!("{e}");
    }
    Ok(())
}

async fn edit_selected(
    ctx: &Context,
    session: &mut PlannerSession,
) -> Result<(), Box<dyn std::error::Error>> {
    let bias = session.settings().bias;
    let Some(current) = session.points_mut()?.active().cloned() else {
        println!("No point is selected");
        return Ok(());
    };

    let Some(entry) = prompt::prompt_address(ctx, "Address", Some(&current), bias.as_ref()).await?
    else {
        return Ok(());
    };
    if let Err(e) = session.points_mut()?.edit_active_entry(entry) {
        println!("{e}");
    }
    Ok(())
}

fn select_point(points: &mut RoutePointList) -> dialoguer::Result<()> {
    if points.is_empty() {
        println!("The list is empty");
        return Ok(());
    }

    let labels = list_lines(points);
    let idx = Select::new()
        .with_prompt("Select a point")
        .items(&labels)
        .default(points.active_index().unwrap_or(0))
        .interact()?;
    points.select(idx);
    Ok(())
}

fn move_selected(points: &mut RoutePointList, direction: Direction) {
    if !points.move_active(direction) {
        println!("Cannot move {direction}");
    }
}

/// One line per entry: marker, position, role and address.
fn list_lines(points: &RoutePointList) -> Vec<String> {
    if points.is_empty() {
        return vec!["(no points yet)".to_string()];
    }

    points
        .entries()
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let marker = if points.active_index() == Some(i) {
                '>'
            } else {
                ' '
            };
            let role = points
                .role_of(i)
                .map_or_else(String::new, |role| format!(" [{role}]"));
            let text = address::normalize(&entry.input).unwrap_or_default();
            format!("{marker} {}.{role} {text}", i + 1)
        })
        .collect()
}
