//! `nearest`: list the stores serving a coordinate.

use grocesphere_core::{AppConfig, Coordinate};
use grocesphere_engine::listings;

use crate::directory::load_directory;

/// # Errors
///
/// Returns an error for out-of-range coordinates or an unreadable stores file.
pub(crate) fn run_nearest(
    config: &AppConfig,
    demo: bool,
    lat: f64,
    lng: f64,
    json: bool,
) -> anyhow::Result<()> {
    let at = Coordinate::new(lat, lng);
    if !at.in_range() {
        anyhow::bail!("coordinate {at} is outside WGS84 range");
    }

    let loaded = load_directory(config, demo)?;
    let listed = listings(loaded.directory.stores_near(at), at);

    if json {
        println!("{}", serde_json::to_string_pretty(&listed)?);
        return Ok(());
    }

    if listed.is_empty() {
        println!("no stores serve {at}");
        return Ok(());
    }

    for entry in &listed {
        println!(
            "{:>8}  {:<12} {:<8} {}",
            entry.distance,
            entry.store.id,
            entry.store.kind.to_string(),
            entry.store.name
        );
    }
    Ok(())
}
