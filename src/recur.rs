use std::{collections::BTreeSet, sync::Arc};

use jiff::{
    Span, ToSpan,
    civil::{Date, Weekday},
};

use crate::args::Usage;

/// The number of iterations used when a caller doesn't ask for a specific
/// budget.
pub const DEFAULT_MAX_ITERATIONS: usize = 50;

/// A recurrence rule over local calendar dates.
///
/// A rule is cheap to clone and never changes once built. Use
/// `RecurrenceRule::builder` to construct one.
#[derive(Clone, Debug)]
pub struct RecurrenceRule {
    inner: Arc<RecurrenceRuleInner>,
}

#[derive(Debug)]
struct RecurrenceRuleInner {
    freq: Frequency,
    start: Date,
    until: Option<Date>,
    // Not checked when building. See `RecurrenceRule::validate`.
    interval: i32,
    // Sorted Monday first, with no duplicates.
    weekdays: Box<[Weekday]>,
}

impl RecurrenceRule {
    /// Returns a builder for constructing a `RecurrenceRule`.
    ///
    /// The frequency and the starting date are the only two things required
    /// to create a rule.
    pub fn builder(freq: Frequency, start: Date) -> RecurrenceRuleBuilder {
        RecurrenceRuleBuilder::new(freq, start)
    }

    /// Expand this rule into a finite, sorted sample of dates.
    ///
    /// At most `max_iterations` steps of the rule's cadence are taken. Each
    /// step emits one date at daily, monthly or yearly frequency, and up to
    /// one date per selected weekday at weekly frequency. Generation also
    /// stops once the cursor moves past the end date (if one is set).
    ///
    /// This never fails. Rules that don't pass `RecurrenceRule::validate`
    /// still produce a finite (but perhaps surprising) sample.
    pub fn expand(&self, max_iterations: usize) -> DateSample {
        Expander::new(self).run(max_iterations)
    }

    /// Checks this rule for settings that would produce degenerate output.
    ///
    /// Expanding a rule that fails validation is still well defined, but
    /// callers that want stricter guarantees should reject such rules.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.interval() < 1 {
            return Err(ValidationError::NonPositiveInterval {
                interval: self.interval(),
            });
        }
        if let Some(until) = self.until() {
            if until < self.start() {
                return Err(ValidationError::EndBeforeStart {
                    start: self.start(),
                    end: until,
                });
            }
        }
        if matches!(self.frequency(), Frequency::Weekly)
            && self.weekdays().is_empty()
        {
            return Err(ValidationError::NoWeekdays);
        }
        Ok(())
    }

    pub fn frequency(&self) -> Frequency {
        self.inner.freq
    }

    pub fn start(&self) -> Date {
        self.inner.start
    }

    pub fn until(&self) -> Option<Date> {
        self.inner.until
    }

    pub fn interval(&self) -> i32 {
        self.inner.interval
    }

    /// The selected weekdays, in order starting with Monday.
    ///
    /// These are only used at a weekly frequency.
    pub fn weekdays(&self) -> &[Weekday] {
        &self.inner.weekdays
    }
}

/// A builder for a `RecurrenceRule`.
#[derive(Clone, Debug)]
pub struct RecurrenceRuleBuilder {
    freq: Frequency,
    start: Date,
    until: Option<Date>,
    interval: i32,
    weekdays: Vec<Weekday>,
}

impl RecurrenceRuleBuilder {
    fn new(freq: Frequency, start: Date) -> RecurrenceRuleBuilder {
        RecurrenceRuleBuilder {
            freq,
            start,
            until: None,
            interval: 1,
            weekdays: vec![],
        }
    }

    /// Build the rule.
    ///
    /// No validation is done here. Callers that want to reject degenerate
    /// rules should call `RecurrenceRule::validate` on the result.
    pub fn build(&self) -> RecurrenceRule {
        let mut weekdays = self.weekdays.clone();
        weekdays.sort_by_key(|wd| wd.to_monday_zero_offset());
        weekdays.dedup();
        let inner = RecurrenceRuleInner {
            freq: self.freq,
            start: self.start,
            until: self.until,
            interval: self.interval,
            weekdays: weekdays.into_boxed_slice(),
        };
        RecurrenceRule { inner: Arc::new(inner) }
    }

    /// Set the last date (inclusive) that may be generated.
    pub fn until(&mut self, until: Date) -> &mut RecurrenceRuleBuilder {
        self.until = Some(until);
        self
    }

    pub fn interval(&mut self, interval: i32) -> &mut RecurrenceRuleBuilder {
        self.interval = interval;
        self
    }

    /// Add zero or more weekdays to the selection.
    pub fn weekdays<I: IntoIterator<Item = Weekday>>(
        &mut self,
        weekdays: I,
    ) -> &mut RecurrenceRuleBuilder {
        self.weekdays.extend(weekdays);
        self
    }
}

/// Drives a single expansion of a rule.
#[derive(Debug)]
struct Expander<'r> {
    rule: &'r RecurrenceRule,
    /// The date that each iteration expands from.
    cur: Date,
    /// Everything emitted so far, in emission order.
    emitted: Vec<Date>,
    /// Dates emitted by the weekly branch. Other frequencies can't emit
    /// duplicates when the interval is positive, so they skip this.
    seen: BTreeSet<Date>,
}

impl<'r> Expander<'r> {
    fn new(rule: &'r RecurrenceRule) -> Expander<'r> {
        Expander {
            rule,
            cur: rule.start(),
            emitted: vec![],
            seen: BTreeSet::new(),
        }
    }

    fn run(mut self, max_iterations: usize) -> DateSample {
        for i in 0..max_iterations {
            if let Some(until) = self.rule.until() {
                if until < self.cur {
                    log::trace!(
                        "cursor `{cur}` is after `{until}`, \
                         stopping after {i} iterations",
                        cur = self.cur,
                    );
                    break;
                }
            }
            match self.rule.frequency() {
                Frequency::Daily
                | Frequency::Monthly
                | Frequency::Yearly => self.emitted.push(self.cur),
                Frequency::Weekly => self.weekly(),
            }
            self.cur = match self.advance() {
                Ok(next) => next,
                Err(err) => {
                    log::debug!(
                        "could not advance cursor past `{cur}`, \
                         stopping after {n} iterations: {err:#}",
                        cur = self.cur,
                        n = i + 1,
                    );
                    break;
                }
            };
        }
        // Stable sort. Equal dates can only show up with a degenerate
        // interval and are kept as they are.
        self.emitted.sort();
        log::debug!(
            "expanded {freq} rule starting at `{start}` into {len} dates",
            freq = self.rule.frequency(),
            start = self.rule.start(),
            len = self.emitted.len(),
        );
        DateSample { dates: self.emitted }
    }

    /// Emit the selected weekdays that fall in the week beginning at the
    /// cursor.
    ///
    /// The "week" is always the seven days starting at the cursor itself,
    /// not a calendar week. So a rule starting on a Wednesday with Monday
    /// selected will first emit the following Monday.
    fn weekly(&mut self) {
        let cur_offset = self.cur.weekday().to_monday_zero_offset();
        for &weekday in self.rule.weekdays() {
            let days = (weekday.to_monday_zero_offset() - cur_offset + 7) % 7;
            let Ok(date) = self.cur.checked_add(days.days()) else {
                log::trace!(
                    "`{weekday:?}` after `{cur}` is out of range, skipping",
                    cur = self.cur,
                );
                continue;
            };
            // N.B. Dates equal to the end date are excluded here, unlike
            // the cursor check in `run`.
            if self.rule.until().is_some_and(|until| date >= until) {
                continue;
            }
            if self.seen.insert(date) {
                self.emitted.push(date);
            }
        }
    }

    /// Returns the cursor for the next iteration.
    fn advance(&self) -> anyhow::Result<Date> {
        let step = self.rule.frequency().to_span(self.rule.interval())?;
        Ok(self.cur.checked_add(step)?)
    }
}

/// A finite, sorted sample of dates produced by expanding a rule.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DateSample {
    dates: Vec<Date>,
}

impl DateSample {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Date> {
        self.dates.iter()
    }
}

impl<'s> IntoIterator for &'s DateSample {
    type IntoIter = std::slice::Iter<'s, Date>;
    type Item = &'s Date;

    fn into_iter(self) -> std::slice::Iter<'s, Date> {
        self.iter()
    }
}

impl serde::Serialize for DateSample {
    fn serialize<S: serde::Serializer>(
        &self,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = s.serialize_struct("DateSample", 2)?;
        state.serialize_field("count", &self.dates.len())?;
        // Jiff serializes civil dates as `YYYY-MM-DD`.
        state.serialize_field("dates", &self.dates)?;
        state.end()
    }
}

/// The reasons a recurrence rule might be rejected by
/// `RecurrenceRule::validate`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ValidationError {
    /// The interval was zero or negative.
    NonPositiveInterval { interval: i32 },
    /// The end date comes before the start date.
    EndBeforeStart { start: Date, end: Date },
    /// A weekly rule was given no days of the week.
    NoWeekdays,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            ValidationError::NonPositiveInterval { interval } => write!(
                f,
                "interval value of `{interval}` is invalid \
                 (interval must be greater than or equal to 1)",
            ),
            ValidationError::EndBeforeStart { start, end } => write!(
                f,
                "end date `{end}` is before start date `{start}`",
            ),
            ValidationError::NoWeekdays => write!(
                f,
                "weekly frequency requires at least one day of the week",
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub const USAGE: Usage = Usage::arg(
        "<frequency>",
        "The frequency at which to repeat a sequence.",
        r#"
The frequency at which to repeat a sequence.

Valid values are:

daily, day, d

weekly, week, wk, w

monthly, month, mo

yearly, year, yr, y
"#,
    );

    /// Returns the span covering `interval` units of this frequency.
    ///
    /// Month and year steps are clamped to the end of the month by Jiff, so
    /// `2024-01-31` plus one month is `2024-02-29`.
    fn to_span(&self, interval: i32) -> anyhow::Result<Span> {
        let span = match *self {
            Frequency::Daily => Span::new().try_days(interval)?,
            Frequency::Weekly => Span::new().try_weeks(interval)?,
            Frequency::Monthly => Span::new().try_months(interval)?,
            Frequency::Yearly => Span::new().try_years(interval)?,
        };
        Ok(span)
    }

    fn as_str(&self) -> &'static str {
        match *self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Frequency> {
        use self::Frequency::*;

        let freq = match &*s.to_lowercase() {
            "daily" | "day" | "d" => Daily,
            "weekly" | "week" | "wk" | "w" => Weekly,
            "monthly" | "month" | "mo" => Monthly,
            "yearly" | "year" | "yr" | "y" => Yearly,
            unk => anyhow::bail!("unrecognized frequency: `{unk}`"),
        };
        Ok(freq)
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
