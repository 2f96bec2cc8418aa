#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared CLI utilities for the route planner.
//!
//! Provides [`init_logger`], which sets up `indicatif-log-bridge` so that
//! `log::info!` and friends are suspended while spinners redraw, a
//! [`with_spinner`] helper for slow geocoder calls, and a few `dialoguer`
//! prompt wrappers shared by the planner screens.

use std::future::Future;
use std::time::Duration;

use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;

/// Adds a spinner with `message` to `multi`.
#[must_use]
pub fn spinner(multi: &MultiProgress, message: &str) -> ProgressBar {
    let bar = multi.add(ProgressBar::new_spinner());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_string());
    bar
}

/// Awaits `fut` while a spinner with `message` is shown, then clears it.
pub async fn with_spinner<F: Future>(multi: &MultiProgress, message: &str, fut: F) -> F::Output {
    let bar = spinner(multi, message);
    let output = fut.await;
    bar.finish_and_clear();
    multi.remove(&bar);
    output
}

/// Prompts for free text. A blank answer is `None`.
///
/// # Errors
///
/// Returns an error if the terminal prompt fails.
pub fn prompt_optional(prompt: &str) -> dialoguer::Result<Option<String>> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    Ok(non_blank(&value))
}

/// Prompts for free text, offering `current` as the default. Clearing the
/// field yields `None`.
///
/// # Errors
///
/// Returns an error if the terminal prompt fails.
pub fn prompt_with_default(
    prompt: &str,
    current: Option<&str>,
) -> dialoguer::Result<Option<String>> {
    let mut input = Input::<String>::new().with_prompt(prompt).allow_empty(true);
    if let Some(current) = current {
        input = input.with_initial_text(current);
    }
    Ok(non_blank(&input.interact_text()?))
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Initializes the global logger wrapped in `indicatif-log-bridge` so that
/// `log::info!` and friends are suspended while spinners redraw.
///
/// Returns the [`MultiProgress`] that all spinners must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    // Build the pretty-env-logger logger manually so we can wrap it.
    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok(); // Ignore error if logger was already set (e.g., in tests)

    log::set_max_level(level);

    multi
}
