use {
    anyhow::Context,
    jiff::{civil, fmt::strtime},
};

use crate::args::Usage;

/// Provides parsing for Jiff's civil `Weekday` type.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Weekday {
    weekday: civil::Weekday,
}

impl Weekday {
    /// Return the parsed weekday.
    pub fn get(&self) -> civil::Weekday {
        self.weekday
    }
}

impl std::str::FromStr for Weekday {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Weekday> {
        use jiff::civil::Weekday::*;

        let weekday = match &*s.to_ascii_lowercase() {
            "sunday" | "sun" | "su" => Sunday,
            "monday" | "mon" | "mo" => Monday,
            "tuesday" | "tues" | "tue" | "tu" => Tuesday,
            "wednesday" | "wed" | "we" => Wednesday,
            "thursday" | "thurs" | "thu" | "th" => Thursday,
            "friday" | "fri" | "fr" => Friday,
            "saturday" | "sat" | "sa" => Saturday,
            unk => anyhow::bail!("unrecognized weekday: `{unk}`"),
        };
        Ok(Weekday { weekday })
    }
}

impl std::fmt::Display for Weekday {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use jiff::civil::Weekday::*;

        let label = match self.get() {
            Sunday => "Sunday",
            Monday => "Monday",
            Tuesday => "Tuesday",
            Wednesday => "Wednesday",
            Thursday => "Thursday",
            Friday => "Friday",
            Saturday => "Saturday",
        };
        write!(f, "{label}")
    }
}

/// A scrappy comma delimited sequence of values.
///
/// This type doesn't have any requirements on `T` other than that it can be
/// parsed. It also requires that `,` cannot appear within the parse format
/// of `T`. There's no support for quoting or escaping the commas.
///
/// The sequence must not be empty.
#[derive(Clone, Debug)]
pub struct CommaSequence<T>(Vec<T>);

impl<T> CommaSequence<T> {
    /// Returns an iterator over every item in this sequence.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.0.iter()
    }
}

impl<'a, T> IntoIterator for &'a CommaSequence<T> {
    type IntoIter = std::slice::Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> std::slice::Iter<'a, T> {
        self.0.iter()
    }
}

impl<T, E> std::str::FromStr for CommaSequence<T>
where
    T: std::str::FromStr<Err = E>,
    E: std::fmt::Display,
{
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<CommaSequence<T>> {
        let mut seq = vec![];
        for item in s.split(",") {
            seq.push(item.parse::<T>().map_err(|err| {
                anyhow::Error::msg(format!(
                    "failed to parse `{item}` \
                     within sequence `{s}`: {err:#}",
                ))
            })?);
        }
        anyhow::ensure!(!seq.is_empty(), "empty sequences are not allowed");
        Ok(CommaSequence(seq))
    }
}

/// An inclusive range of weekdays, e.g., `mon..fri`.
///
/// A single weekday on its own is a range of one. Any weekday may start a
/// range, so `fri..mon` is Friday, Saturday, Sunday and Monday.
#[derive(Clone, Copy, Debug)]
pub struct WeekdayRange {
    start: civil::Weekday,
    end: civil::Weekday,
}

impl WeekdayRange {
    pub const USAGE: Usage = Usage::flag(
        "-w/--week-day <week-day-list>",
        "Provide one or more days of the week.",
        r#"
Provide one or more days of the week.

Any day of the week may be given. They can be specified in the following way
(without regard for case):

Sunday, Sun, SU

Monday, Mon, MO

Tuesday, Tues, Tue, TU

Wednesday, Wed, WE

Thursday, Thurs, Thu, TH

Friday, Fri, FR

Saturday, Sat, SA

Contiguous ranges of weekdays may be specified. For example, `mon..wed`
corresponds to Monday, Tuesday and Wednesday. Ranges wrap around the end of
the week, so `sat..mon` is Saturday, Sunday and Monday.

Multiple weekdays or ranges can be specified with repeated use of this flag, or
by separating values with a comma. For example, `sun,tue..thu,sat` corresponds
to every day of the week except for Monday and Friday.

Each step of a weekly sequence emits the selected weekdays that fall within the
seven days beginning at the current step. Weekdays are ignored at any other
frequency.
"#,
    );

    /// Returns every weekday in this range, in order from its start.
    pub fn weekdays(&self) -> impl Iterator<Item = civil::Weekday> {
        let mut next = Some(self.start);
        let end = self.end;
        std::iter::from_fn(move || {
            let cur = next?;
            next = if cur == end { None } else { Some(cur.next()) };
            Some(cur)
        })
    }
}

impl std::str::FromStr for WeekdayRange {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<WeekdayRange> {
        let Some((start, end)) = s.split_once("..") else {
            let weekday = s.parse::<Weekday>()?.get();
            return Ok(WeekdayRange { start: weekday, end: weekday });
        };
        let start = start.parse::<Weekday>().with_context(|| {
            format!("failed to parse start of weekday range `{s}`")
        })?;
        let end = end.parse::<Weekday>().with_context(|| {
            format!("failed to parse end of weekday range `{s}`")
        })?;
        Ok(WeekdayRange { start: start.get(), end: end.get() })
    }
}

/// A `strftime`-style format for printing dates.
#[derive(Clone, Debug)]
pub struct DateFormat(Box<str>);

impl DateFormat {
    pub const USAGE: Usage = Usage::flag(
        "-f/--format <strftime>",
        "Print dates in this format (default `%a %b %d %Y`).",
        r#"
Print dates in this format.

The default is `%a %b %d %Y`, which prints dates like `Mon Jan 01 2024`. Use
`%F` to print ISO 8601 dates like `2024-01-01`.

Some commonly useful directives:

`%A`, `%a`: The full and abbreviated weekday, respectively.

`%B`, `%b`: The full and abbreviated month name, respectively.

`%d`, `%e`: The day of the month. `%d` is zero-padded, `%e` is space padded.

`%F`: Equivalent to `%Y-%m-%d`.

`%j`: The day of the year. Range is `1..=366`. Zero padded to 3 digits.

`%m`: The month. Zero padded.

`%V`: Week number in the ISO 8601 week-based calendar. Zero padded.

`%Y`: A full year, including century. Zero padded to 4 digits.

`%%`: A literal `%`.

Only date directives make sense here, since there is no time of day or time
zone to format.
"#,
    );

    /// Format a single date.
    pub fn format(&self, date: civil::Date) -> anyhow::Result<String> {
        strtime::format(&*self.0, date).with_context(|| {
            format!("failed to format `{date}` with `{}`", self.0)
        })
    }
}

impl Default for DateFormat {
    fn default() -> DateFormat {
        DateFormat("%a %b %d %Y".into())
    }
}

impl std::str::FromStr for DateFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<DateFormat> {
        anyhow::ensure!(!s.is_empty(), "date format must not be empty");
        Ok(DateFormat(s.into()))
    }
}
