//! Terse plain-text renderings for terminals and `?format=text`.
//!
//! JSON output is just the serde form of the models; nothing here affects it.

use crate::clock;
use crate::models::{BusArrivals, Departure, DepartureBoard, DirectionArrivals};
use crate::tfl::{ROUTE, STOPS};

fn direction_line(fallback: &str, direction: Option<&DirectionArrivals>) -> String {
    match direction {
        Some(d) if !d.seconds.is_empty() => {
            let minutes: Vec<String> = d.seconds.iter().map(|s| (s / 60).to_string()).collect();
            format!("{}: {} min", d.destination, minutes.join(", "))
        }
        Some(d) => format!("{}: no buses", d.destination),
        None => format!("{}: no buses", fallback),
    }
}

/// Render bus arrivals as a heading plus one line per direction.
pub fn bus_text(arrivals: &BusArrivals) -> String {
    // A direction with no arrivals carries no destination, so take it from the stop table.
    let (inbound_name, outbound_name) = STOPS
        .iter()
        .find(|stop| stop.name == arrivals.stop)
        .map(|stop| (stop.inbound_destination, stop.outbound_destination))
        .unwrap_or(("Inbound", "Outbound"));

    [
        format!("{} ({})", arrivals.stop, ROUTE),
        direction_line(inbound_name, arrivals.inbound.as_ref()),
        direction_line(outbound_name, arrivals.outbound.as_ref()),
    ]
    .join("\n")
}

fn departure_line(departure: &Departure) -> String {
    let mut parts = vec![clock::with_colon(&departure.scheduled_departure)];

    if let Some(platform) = &departure.platform {
        parts.push(format!("plat {}", platform));
    }

    parts.push(if departure.cancelled {
        "CANCELLED".to_string()
    } else if departure.delay_minutes > 0 {
        format!("+{} min", departure.delay_minutes)
    } else {
        clock::STATUS_ON_TIME.to_string()
    });

    if !departure.cancelled && !departure.eta.is_empty() {
        parts.push(format!("arr {}", clock::with_colon(&departure.eta)));
    }

    parts.join("  ")
}

/// Render a departure board as a header plus one line per departure.
pub fn board_text(board: &DepartureBoard) -> String {
    let mut lines = vec![format!(
        "{} -> {}",
        board.origin_name, board.destination_name
    )];
    if board.departures.is_empty() {
        lines.push("No departures".to_string());
    } else {
        lines.extend(board.departures.iter().map(departure_line));
    }
    lines.join("\n")
}
