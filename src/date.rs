use {
    anyhow::Context,
    jiff::{Span, Timestamp, civil::Date, tz::TimeZone},
};

use crate::{
    TZ,
    args::{Usage, flags::Weekday},
};

/// A calendar date given on the CLI.
///
/// Besides plain ISO 8601 dates, this accepts a handful of formats that are
/// interpreted relative to "today." Today is the current date in the system
/// time zone, or the date of `RECUR_NOW` when that is set.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct FlexibleDate {
    date: Date,
}

impl FlexibleDate {
    pub const START_ARG: Usage = Usage::arg(
        "<start>",
        "The first date of the sequence, e.g., `2024-01-31` (default today).",
        r#"
The first date of the sequence. When absent, today is used.

Any of the date formats below may be given.

An ISO 8601 date, e.g., `2024-01-31`. A datetime may be given too, in which
case only its date is used, e.g., `2024-01-31T17:30`. A timestamp with a `Z`
or offset is converted to your system's time zone first (which may be
overridden by the `TZ` environment variable).

A date expressed as a duration from today. For example, `3d` is three days
from today, `-1w` (or `1 week ago`) is one week before today and `P1M` is one
month from today. Only calendar units make sense here.

`today`, `yesterday` and `tomorrow` mean what you'd expect.

A day of the week, optionally prefixed with `this`, `next` or `last`. A bare
weekday or `this` refers to today (if it's that weekday) or the soonest date
that falls on it. `next` and `last` refer to the next or previous such
weekday, never today.

Today is computed once when recur starts. If the `RECUR_NOW` environment
variable is set to an RFC 3339 timestamp, then that is used instead.
"#,
    );

    pub const UNTIL_FLAG: Usage = Usage::flag(
        "-u/--until <date>",
        "The last date (inclusive) that may be generated.",
        r#"
The last date (inclusive) that may be generated.

This accepts the same formats as <start>, e.g., `2024-12-31`, `3mo` or
`next fri`.

Generation stops as soon as a step of the sequence begins after this date. At
a weekly frequency, a selected weekday that falls on this date is not
generated.
"#,
    );

    pub fn today() -> FlexibleDate {
        FlexibleDate { date: crate::NOW.date() }
    }

    pub fn get(&self) -> Date {
        self.date
    }

    /// Parse `s` as a date, resolving relative formats against `today`.
    ///
    /// Timestamps are converted to `tz` before taking their date.
    fn parse_relative(
        today: Date,
        tz: &TimeZone,
        s: &str,
    ) -> anyhow::Result<FlexibleDate> {
        let s = s.trim();
        let lower = s.to_ascii_lowercase();
        match &*lower {
            "today" => return Ok(FlexibleDate { date: today }),
            "yesterday" => {
                let date = today.yesterday().context("no date before today")?;
                return Ok(FlexibleDate { date });
            }
            "tomorrow" => {
                let date = today.tomorrow().context("no date after today")?;
                return Ok(FlexibleDate { date });
            }
            _ => {}
        }
        if let Some(date) = parse_weekday(today, &lower)? {
            return Ok(FlexibleDate { date });
        }
        // N.B. Timestamps must come first. The civil parsers accept an
        // offset and silently drop it.
        if let Ok(ts) = s.parse::<Timestamp>() {
            let date = ts.to_zoned(tz.clone()).date();
            return Ok(FlexibleDate { date });
        }
        if let Ok(date) = s.parse::<Date>() {
            return Ok(FlexibleDate { date });
        }
        if let Ok(dt) = s.parse::<jiff::civil::DateTime>() {
            return Ok(FlexibleDate { date: dt.date() });
        }
        match s.parse::<Span>() {
            Ok(span) => {
                let date = today.checked_add(span).with_context(|| {
                    format!("failed to add `{span:#}` to `{today}`")
                })?;
                Ok(FlexibleDate { date })
            }
            Err(err) => {
                log::debug!("failed to parse `{s}` as a span: {err}");
                anyhow::bail!("unrecognized date `{s}`")
            }
        }
    }
}

impl std::str::FromStr for FlexibleDate {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<FlexibleDate> {
        FlexibleDate::parse_relative(crate::NOW.date(), &TZ, s)
    }
}

impl std::fmt::Display for FlexibleDate {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.date, f)
    }
}

/// Parses `[this|next|last] <weekday>`.
///
/// Returns `None` when `s` isn't of that shape at all.
fn parse_weekday(today: Date, s: &str) -> anyhow::Result<Option<Date>> {
    let (nth, name) = match s.split_once(' ') {
        None => (0, s),
        Some(("this", name)) => (0, name.trim()),
        Some(("next", name)) => (1, name.trim()),
        Some(("last", name)) => (-1, name.trim()),
        Some(_) => return Ok(None),
    };
    let Ok(weekday) = name.parse::<Weekday>() else { return Ok(None) };
    if nth == 0 && today.weekday() == weekday.get() {
        return Ok(Some(today));
    }
    let nth = if nth == 0 { 1 } else { nth };
    let date = today.nth_weekday(nth, weekday.get()).with_context(|| {
        format!("failed to find {weekday} relative to `{today}`")
    })?;
    Ok(Some(date))
}
