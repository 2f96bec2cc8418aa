//! Address and preference prompts shared by the planner screens.

use dialoguer::{Confirm, Input, Select};
use route_planner_cli_utils::{prompt_with_default, with_spinner};
use route_planner_geocoder::address;
use route_planner_route::planner::{AvoidChoice, RoutePreset, RouteSettings};
use route_planner_route_models::{LocationBias, RouteEntry, Suggestion, TravelMode};

use crate::Context;

/// Asks for an address, then offers autocomplete suggestions for it.
///
/// `current` is offered as the initial text. A blank answer yields `None`.
/// When the geocoder has nothing to suggest the typed text is kept as is.
///
/// # Errors
///
/// Returns an error if a terminal prompt fails.
pub async fn prompt_address(
    ctx: &Context,
    prompt: &str,
    current: Option<&RouteEntry>,
    bias: Option<&LocationBias>,
) -> dialoguer::Result<Option<RouteEntry>> {
    let current = current.and_then(|entry| address::normalize(&entry.input));
    let Some(text) = prompt_with_default(prompt, current.as_deref())? else {
        return Ok(None);
    };

    let suggestions = with_spinner(
        &ctx.multi,
        "Looking up suggestions...",
        ctx.resolver.suggest(&text, bias),
    )
    .await;

    if suggestions.is_empty() {
        return Ok(Some(RouteEntry::text(text)));
    }

    let items = suggestion_items(&suggestions, &text);
    let idx = Select::new()
        .with_prompt("Pick an address")
        .items(&items)
        .default(0)
        .interact()?;

    Ok(Some(
        suggestions
            .get(idx)
            .map_or_else(|| RouteEntry::text(text), RouteEntry::selected),
    ))
}

/// Suggestion labels followed by a "keep what I typed" item.
fn suggestion_items(suggestions: &[Suggestion], typed: &str) -> Vec<String> {
    suggestions
        .iter()
        .map(|s| s.description.clone())
        .chain(std::iter::once(format!("Use \"{typed}\" as typed")))
        .collect()
}

/// Position of `value` in `all`, or the first item.
fn position_of<T: PartialEq>(all: &[T], value: &T) -> usize {
    all.iter().position(|v| v == value).unwrap_or(0)
}

/// Asks for travel mode and avoid preferences. With `professional` set,
/// the route type and the optimize flag are asked for too.
///
/// # Errors
///
/// Returns an error if a terminal prompt fails.
pub fn preferences(settings: &mut RouteSettings, professional: bool) -> dialoguer::Result<()> {
    let modes: Vec<String> = TravelMode::ALL.iter().map(ToString::to_string).collect();
    let mode = Select::new()
        .with_prompt("Travel mode")
        .items(&modes)
        .default(position_of(TravelMode::ALL, &settings.options.mode))
        .interact()?;
    settings.options.mode = TravelMode::ALL[mode];

    let preset = if professional {
        let presets: Vec<String> = RoutePreset::ALL.iter().map(ToString::to_string).collect();
        let idx = Select::new()
            .with_prompt("Route type")
            .items(&presets)
            .default(0)
            .interact()?;
        RoutePreset::ALL[idx]
    } else {
        RoutePreset::default()
    };

    let choices: Vec<String> = AvoidChoice::ALL.iter().map(ToString::to_string).collect();
    let choice = Select::new()
        .with_prompt("Avoid")
        .items(&choices)
        .default(0)
        .interact()?;
    settings.apply_preferences(preset, AvoidChoice::ALL[choice]);

    if professional {
        settings.options.optimize = Confirm::new()
            .with_prompt("Let the provider optimize the stop order?")
            .default(settings.options.optimize)
            .interact()?;
    }

    Ok(())
}

/// Asks for an autocomplete bias circle. A blank center clears it.
///
/// # Errors
///
/// Returns an error if a terminal prompt fails.
pub fn bias(settings: &mut RouteSettings) -> dialoguer::Result<()> {
    let current = settings.bias.map(|b| b.center.to_string());
    let Some(text) = prompt_with_default(
        "Bias suggestions around lat,lng (blank for none)",
        current.as_deref(),
    )?
    else {
        settings.bias = None;
        return Ok(());
    };

    let Some(center) = address::parse_coordinate_pair(&text) else {
        println!("'{text}' is not a lat,lng pair; bias unchanged.");
        return Ok(());
    };

    let radius_m: u32 = Input::new()
        .with_prompt("Radius (m)")
        .default(
            settings
                .bias
                .map_or(LocationBias::DEFAULT_RADIUS_M, |b| b.radius_m),
        )
        .interact_text()?;

    settings.bias = Some(LocationBias { center, radius_m });
    Ok(())
}
