//! Human-readable printing of store state.

use pothole_map_report_models::{Bounds, Report};
use pothole_map_store::{FetchOutcome, MapViewState};

pub fn format_bounds(b: &Bounds) -> String {
    format!("[{} .. {}]", b.south_west, b.north_east)
}

pub fn print_outcome(b: &Bounds, outcome: &FetchOutcome, limit: u32) {
    println!(
        "{}: {} report(s), {} new",
        format_bounds(b),
        outcome.received,
        outcome.inserted
    );
    if outcome.truncated {
        println!("  More than {limit} potholes match this area. Zoom in to see them all.");
    }
}

pub fn print_view(view: &MapViewState) {
    println!("Center: {}  Zoom: {}", view.center, view.zoom);
    if let Some(marker) = view.user_marker {
        println!("Marker: {marker}");
    }
}

pub fn print_reports(reports: &[Report]) {
    if reports.is_empty() {
        println!("No potholes found.");
        return;
    }

    println!(
        "{:<38} {:<20} {:<22} {:>5}  {:<24} PHOTO",
        "ID", "DEVICE", "REPORTED", "CONF", "POSITION"
    );
    println!("{}", "-".repeat(120));

    for r in reports {
        let device = if r.device_name.chars().count() > 20 {
            format!("{}...", r.device_name.chars().take(17).collect::<String>())
        } else {
            r.device_name.clone()
        };
        println!(
            "{:<38} {:<20} {:<22} {:>5.2}  {:<24} {}",
            r.id,
            device,
            r.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            r.confidence,
            r.coordinate().to_string(),
            r.photo_url.as_deref().unwrap_or("-")
        );
    }

    println!("\n{} pothole(s)", reports.len());
}
