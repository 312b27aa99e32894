//! Candidate meeting slots: future business hours over the next week,
//! rendered as the pt-BR strings the dialogue and the bookings store share.

use std::collections::HashSet;

use chrono::{DateTime, Datelike, Days, Duration, Utc, Weekday};

pub const BUSINESS_HOURS: [u32; 4] = [9, 11, 14, 16];
pub const MAX_SLOTS: usize = 6;

/// São Paulo runs at UTC-3 year round; shifting the clock keeps all of the
/// date math in plain naive types.
const BRT_UTC_OFFSET_HOURS: i64 = 3;

/// Up to [`MAX_SLOTS`] options starting tomorrow, weekends skipped, slots
/// already taken by a stored booking excluded. Format: `dd/mm/yyyy HH:MM BRT`
/// (the first 10 characters are the date, characters 11..16 the time — the
/// slot-choice extractor relies on that layout).
pub fn generate_slots(now: DateTime<Utc>, booked: &HashSet<String>) -> Vec<String> {
    let local_now = now - Duration::hours(BRT_UTC_OFFSET_HOURS);
    let today = local_now.date_naive();
    let mut slots = Vec::new();

    for day_offset in 1..=7u64 {
        if slots.len() >= MAX_SLOTS {
            break;
        }
        let Some(date) = today.checked_add_days(Days::new(day_offset)) else {
            continue;
        };
        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            continue;
        }
        for hour in BUSINESS_HOURS {
            if slots.len() >= MAX_SLOTS {
                break;
            }
            let formatted = format!("{} {:02}:00 BRT", date.format("%d/%m/%Y"), hour);
            if booked.contains(&formatted) {
                continue;
            }
            slots.push(formatted);
        }
    }

    slots
}
