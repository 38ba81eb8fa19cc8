use client::{ResultSnapshot, SearchState};
use std::fmt::Write;

/// Lines printed after every snapshot change.
pub fn render(snapshot: &ResultSnapshot) -> String {
    let mut out = String::new();

    let origin = snapshot
        .origin
        .map(|o| o.to_string())
        .unwrap_or_else(|| "no position".to_string());
    let category = snapshot
        .category
        .map(|c| c.to_string())
        .unwrap_or_else(|| "all".to_string());
    let _ = write!(
        out,
        "[#{}] {origin} within {} m, category {category}",
        snapshot.generation, snapshot.radius_m
    );
    if let Some(text) = &snapshot.text {
        let _ = write!(out, ", text \"{text}\"");
    }
    out.push('\n');

    let status = match &snapshot.state {
        SearchState::Idle => "waiting for a position".to_string(),
        SearchState::Loading => "searching...".to_string(),
        SearchState::LoadingMore => "loading more...".to_string(),
        SearchState::Success => format!("{} listings", snapshot.items.len()),
        SearchState::Empty => "nothing nearby".to_string(),
        SearchState::Error(failure) if failure.retryable() => {
            format!("error: {} (:refresh to retry)", failure.message)
        }
        SearchState::Error(failure) => format!("error: {}", failure.message),
    };
    let _ = writeln!(out, "  {status}");
    if let Some(notice) = &snapshot.notice {
        let _ = writeln!(out, "  ! {notice}");
    }

    for (i, hit) in snapshot.items.iter().enumerate() {
        let price = if hit.is_free {
            "free".to_string()
        } else {
            match (hit.price, &hit.currency) {
                (Some(price), Some(currency)) => format!("{price} {currency}"),
                (Some(price), None) => price.to_string(),
                _ => "-".to_string(),
            }
        };
        let _ = writeln!(
            out,
            "  {:>3}. {:>8}  {} [{}] {price}",
            i + 1,
            format_distance(hit.distance_meters),
            hit.title,
            hit.category
        );
    }
    if snapshot.has_more {
        let _ = writeln!(out, "  (:more for the next page)");
    }

    out
}

fn format_distance(meters: f64) -> String {
    if meters < 1_000.0 {
        format!("{meters:.0} m")
    } else {
        format!("{:.1} km", meters / 1_000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(120.4), "120 m");
        assert_eq!(format_distance(2_540.0), "2.5 km");
    }

    #[test]
    fn test_render_idle() {
        let text = render(&ResultSnapshot {
            radius_m: 10_000,
            ..Default::default()
        });
        assert!(text.contains("no position within 10000 m"));
        assert!(text.contains("waiting for a position"));
    }
}
