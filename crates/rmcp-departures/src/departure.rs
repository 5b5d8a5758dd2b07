use chrono::{DateTime, Duration, FixedOffset, LocalResult, NaiveDateTime, Offset, TimeZone};
use chrono_tz::Tz;

/// An expected departure instant, or `Unknown` when the feed's timestamp
/// could not be read.
///
/// The derived ordering puts every known instant before `Unknown`, so a
/// stable sort leaves unknown departures at the end in feed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DepartureTime {
    At(DateTime<FixedOffset>),
    Unknown,
}

impl DepartureTime {
    /// Parses an ISO-8601 timestamp. Timestamps without an offset are taken
    /// as wall-clock time in `local`. When nothing parses, the text is cut at
    /// its first `.` and tried once more.
    pub fn parse(text: &str, local: Tz) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return DepartureTime::Unknown;
        }

        parse_iso(text, local)
            .or_else(|| {
                text.split_once('.')
                    .and_then(|(head, _)| parse_iso(head, local))
            })
            .map(DepartureTime::At)
            .unwrap_or(DepartureTime::Unknown)
    }

    /// `HH:MM` wall-clock time in `tz`, or `unknown`.
    pub fn label(&self, tz: Tz) -> String {
        match self {
            DepartureTime::At(at) => at.with_timezone(&tz).format("%H:%M").to_string(),
            DepartureTime::Unknown => "unknown".to_string(),
        }
    }
}

const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%dT%H:%M%:z",
];

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

fn parse_iso(text: &str, local: Tz) -> Option<DateTime<FixedOffset>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Some(at);
    }

    let with_offset = match text.strip_suffix('Z').or_else(|| text.strip_suffix('z')) {
        Some(head) => format!("{}+00:00", head),
        None => text.to_string(),
    };
    if let Some(at) = OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(&with_offset, format).ok())
    {
        return Some(at);
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .and_then(|naive| resolve_local(naive, local))
}

/// Pins a wall-clock time to `local`. Ambiguous times take the earlier
/// instant; times skipped by a forward transition keep the offset that was
/// in force before it.
fn resolve_local(naive: NaiveDateTime, local: Tz) -> Option<DateTime<FixedOffset>> {
    match local.from_local_datetime(&naive) {
        LocalResult::Single(at) | LocalResult::Ambiguous(at, _) => Some(at.fixed_offset()),
        LocalResult::None => {
            let before = local
                .offset_from_utc_datetime(&(naive - Duration::hours(24)))
                .fix();
            before.from_local_datetime(&naive).single()
        }
    }
}

/// Renders the departure board returned to the tool caller.
pub fn render_board(origin: &str, destination: &str, departures: &[DepartureTime], tz: Tz) -> String {
    let mut lines = Vec::with_capacity(departures.len() + 2);
    lines.push(format!("📊 Next departures from {} → {}:", origin, destination));
    for departure in departures {
        lines.push(format!("- {}", departure.label(tz)));
    }
    lines.push(format!(
        "\nSummary: {} upcoming departure(s) found.",
        departures.len()
    ));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Paris;

    fn label(text: &str) -> String {
        DepartureTime::parse(text, Paris).label(Paris)
    }

    #[test]
    fn utc_suffix_converts_to_paris_winter_time() {
        assert_eq!(label("2025-01-15T23:30:00Z"), "00:30");
    }

    #[test]
    fn summer_time_applies_two_hour_offset() {
        assert_eq!(label("2025-07-01T06:05:00Z"), "08:05");
    }

    #[test]
    fn spring_forward_transition_is_handled() {
        assert_eq!(label("2025-03-30T00:59:00Z"), "01:59");
        assert_eq!(label("2025-03-30T01:00:00Z"), "03:00");
    }

    #[test]
    fn explicit_offsets_and_fractions_parse() {
        assert_eq!(label("2025-01-15T23:30:00+01:00"), "23:30");
        assert_eq!(label("2025-01-15T22:30:00.000Z"), "23:30");
        assert_eq!(label("2025-01-15T22:30:00+0000"), "23:30");
    }

    #[test]
    fn timestamps_without_seconds_parse() {
        assert_eq!(label("2025-01-15T23:30Z"), "00:30");
        assert_eq!(label("2025-01-15T23:30+01:00"), "23:30");
        assert_eq!(label("2025-01-15T23:30"), "23:30");
    }

    #[test]
    fn naive_time_in_spring_gap_keeps_winter_offset() {
        let expected = DateTime::parse_from_rfc3339("2025-03-30T02:30:00+01:00").expect("valid");

        assert_eq!(
            DepartureTime::parse("2025-03-30T02:30:00", Paris),
            DepartureTime::At(expected)
        );
        assert_eq!(label("2025-03-30T02:30:00"), "03:30");
    }

    #[test]
    fn naive_time_in_autumn_overlap_takes_earlier_instant() {
        let expected = DateTime::parse_from_rfc3339("2025-10-26T02:30:00+02:00").expect("valid");

        assert_eq!(
            DepartureTime::parse("2025-10-26T02:30:00", Paris),
            DepartureTime::At(expected)
        );
    }

    #[test]
    fn trailing_garbage_after_dot_is_dropped() {
        // Without an offset the remaining wall-clock time is read as Paris time.
        assert_eq!(label("2025-01-15T23:30:00.garbage"), "23:30");
    }

    #[test]
    fn unreadable_timestamps_are_unknown() {
        assert_eq!(DepartureTime::parse("", Paris), DepartureTime::Unknown);
        assert_eq!(DepartureTime::parse("soon", Paris), DepartureTime::Unknown);
        assert_eq!(label("not.a-date"), "unknown");
    }

    #[test]
    fn unknown_sorts_after_known_and_keeps_order() {
        let early = DepartureTime::parse("2025-01-15T08:00:00Z", Paris);
        let late = DepartureTime::parse("2025-01-15T09:00:00Z", Paris);
        let mut times = vec![DepartureTime::Unknown, late, early, DepartureTime::Unknown];

        times.sort();

        assert_eq!(times, vec![early, late, DepartureTime::Unknown, DepartureTime::Unknown]);
    }

    #[test]
    fn board_lists_lines_and_summary() {
        let times = vec![
            DepartureTime::parse("2025-01-15T07:02:00Z", Paris),
            DepartureTime::Unknown,
        ];

        let board = render_board("Les Vallées", "Saint Lazare", &times, Paris);

        assert_eq!(
            board,
            "📊 Next departures from Les Vallées → Saint Lazare:\n\
             - 08:02\n\
             - unknown\n\
             \n\
             Summary: 2 upcoming departure(s) found."
        );
    }
}
