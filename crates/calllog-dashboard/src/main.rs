mod bootstrap;
mod render;

use anyhow::{Context, Result};
use calllog_core::settings::Settings;
use calllog_data::analysis::{analyze, load_call_log};
use calllog_data::export::write_csv_file;

fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_deref())?;

    tracing::info!("Call log dashboard v{} starting", env!("CARGO_PKG_VERSION"));

    let log = load_call_log(&settings.file)
        .with_context(|| format!("could not load call log from {}", settings.file.display()))?;

    let spec = settings.filter_spec(&log);
    tracing::debug!(
        "Filter: {} users (unassigned: {}), {} directions",
        spec.assigned_to.allowed.len(),
        spec.assigned_to.include_missing,
        spec.direction.allowed.len()
    );

    let dashboard = analyze(&log, &spec, settings.top as usize);
    if dashboard.records.is_empty() {
        tracing::warn!("No calls match the current filter");
    }

    if settings.wants_json() {
        println!("{}", render::render_json(&dashboard)?);
    } else {
        print!("{}", render::render_tables(&dashboard));
    }

    if let Some(path) = settings.export.as_deref() {
        let rows = write_csv_file(path, &log.columns, dashboard.records.iter().copied())
            .with_context(|| format!("could not export to {}", path.display()))?;
        eprintln!("Exported {} records to {}", rows, path.display());
    }

    Ok(())
}
