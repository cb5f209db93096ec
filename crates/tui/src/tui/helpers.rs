use chrono::{DateTime, Utc};
use ratatui::layout::Rect;

/// A rect of the given size centered inside `area`, clamped to fit.
pub(crate) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect {
        x,
        y,
        width,
        height,
    }
}

/// First six chars of an id. Ids are opaque strings, so truncation must not
/// assume ASCII.
pub(crate) fn short_id(id: &str) -> &str {
    match id.char_indices().nth(6) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

/// Compact "how long ago" label for the task list.
pub(crate) fn age_label(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(created_at);
    let minutes = elapsed.num_minutes();
    if minutes < 1 {
        "now".into()
    } else if minutes < 60 {
        format!("{minutes}m")
    } else if minutes < 60 * 24 {
        format!("{}h", elapsed.num_hours())
    } else {
        format!("{}d", elapsed.num_days())
    }
}
