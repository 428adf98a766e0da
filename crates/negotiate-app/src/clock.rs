// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::OffsetDateTime;

/// Wall-clock time as shown on chat bubbles: `2:34 PM`, `12:05 AM`.
pub fn format_clock_time(at: OffsetDateTime) -> String {
    let hour = at.hour();
    let period = if hour < 12 { "AM" } else { "PM" };
    let hour_12 = match hour % 12 {
        0 => 12,
        other => other,
    };
    format!("{hour_12}:{:02} {period}", at.minute())
}

/// Local time when the platform can resolve the offset, UTC otherwise.
pub fn local_now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}
