use anyhow::Context;

use crate::{
    args::{
        self, Usage,
        flags::{CommaSequence, WeekdayRange},
    },
    date::FlexibleDate,
    recur::{DEFAULT_MAX_ITERATIONS, DateSample, Frequency, RecurrenceRule},
};

/// The arguments shared by every command that expands a rule.
#[derive(Debug, Default)]
pub struct RuleConfig {
    freq: Option<Frequency>,
    start: Option<FlexibleDate>,
    until: Option<FlexibleDate>,
    interval: Option<i32>,
    week_days: Vec<CommaSequence<WeekdayRange>>,
    max_iterations: Option<usize>,
    lenient: bool,
}

impl RuleConfig {
    /// Build the rule described on the command line.
    ///
    /// Unless `--lenient` was given, a rule that fails validation is an
    /// error.
    pub fn recurrence_rule(&self) -> anyhow::Result<RecurrenceRule> {
        let freq = self.freq()?;
        let mut b = RecurrenceRule::builder(freq, self.start().get());
        b.interval(self.interval());
        for range in self.week_days.iter().flatten() {
            b.weekdays(range.weekdays());
        }
        if let Some(until) = self.until {
            b.until(until.get());
        }
        let rule = b.build();
        if freq != Frequency::Weekly && !rule.weekdays().is_empty() {
            log::warn!(
                "-w/--week-day is ignored at {freq} frequency, \
                 it only applies to weekly rules",
            );
        }
        match rule.validate() {
            Ok(()) => {}
            Err(err) if self.lenient => {
                log::debug!("--lenient given, ignoring invalid rule: {err}");
            }
            Err(err) => {
                return Err(err).context(
                    "invalid recurrence rule (use --lenient to expand it \
                     anyway)",
                );
            }
        }
        log::trace!(
            "built {freq} rule starting at `{start}` with interval {interval} \
             and weekdays {weekdays:?}, until {until:?}",
            start = rule.start(),
            interval = rule.interval(),
            weekdays = rule.weekdays(),
            until = rule.until(),
        );
        Ok(rule)
    }

    /// Build the rule and expand it within the configured budget.
    pub fn sample(&self) -> anyhow::Result<DateSample> {
        let rule = self.recurrence_rule()?;
        Ok(rule.expand(self.max_iterations()))
    }

    fn freq(&self) -> anyhow::Result<Frequency> {
        self.freq.context("missing required <frequency>")
    }

    fn start(&self) -> FlexibleDate {
        self.start.unwrap_or_else(FlexibleDate::today)
    }

    fn interval(&self) -> i32 {
        self.interval.unwrap_or(1)
    }

    fn max_iterations(&self) -> usize {
        self.max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS)
    }
}

impl args::Configurable for RuleConfig {
    fn configure(
        &mut self,
        p: &mut lexopt::Parser,
        arg: &mut lexopt::Arg,
    ) -> anyhow::Result<bool> {
        use lexopt::Arg::*;

        match *arg {
            Value(ref v) => {
                if self.freq.is_none() {
                    self.freq = Some(args::parse_value(v, "<frequency>")?);
                    return Ok(true);
                }
                if self.start.is_none() {
                    self.start = Some(args::parse_value(v, "<start>")?);
                    return Ok(true);
                }
                return Ok(false);
            }
            Short('i') | Long("interval") => {
                self.interval = Some(args::parse(p, "-i/--interval")?);
            }
            Short('w') | Long("week-day") => {
                self.week_days.push(args::parse(p, "-w/--week-day")?);
            }
            Short('u') | Long("until") => {
                self.until = Some(args::parse(p, "-u/--until")?);
            }
            Short('n') | Long("max-iterations") => {
                self.max_iterations =
                    Some(args::parse(p, "-n/--max-iterations")?);
            }
            Long("lenient") => {
                self.lenient = true;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        const INTERVAL: Usage = Usage::flag(
            "-i/--interval <number>",
            "Sets the interval at which the sequence repeats (default 1).",
            r#"
Sets the interval at which the sequence repeats.

For example, `-i 2` at a weekly frequency means every other week. The default
is `1`.

An interval less than 1 is rejected unless `--lenient` is given. With
`--lenient`, an interval of `0` repeats the start date (or, at a weekly
frequency, the selected weekdays of the first week) and a negative interval
walks backwards in time. The dates printed are always sorted.
"#,
        );
        const MAX_ITERATIONS: Usage = Usage::flag(
            "-n/--max-iterations <number>",
            "The number of steps to take through the sequence (default 50).",
            r#"
The number of steps to take through the sequence.

Each step emits one date at daily, monthly or yearly frequency, and one date
for each selected weekday at weekly frequency. So `weekly -w mon,wed -n 3`
may print up to six dates.

The default is `50`. A value of `0` always results in an empty sequence.
"#,
        );
        const LENIENT: Usage = Usage::flag(
            "--lenient",
            "Expand the rule even if it is invalid.",
            r#"
Expand the rule even if it is invalid.

By default, a rule is rejected when its interval is less than 1, when its end
date is before its start date or when a weekly rule has no days of the week.
When this flag is given, such rules are expanded anyway. The result is always
finite, but may be empty or contain repeated dates.
"#,
        );
        &[
            Frequency::USAGE,
            FlexibleDate::START_ARG,
            INTERVAL,
            WeekdayRange::USAGE,
            FlexibleDate::UNTIL_FLAG,
            MAX_ITERATIONS,
            LENIENT,
        ]
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::{Weekday, date};

    use crate::{args::Configurable, recur::ValidationError};

    use super::*;

    /// Parse `argv` (not including a command name) into a config.
    fn config(argv: &[&str]) -> anyhow::Result<RuleConfig> {
        let mut p = lexopt::Parser::from_args(argv.iter().copied());
        let mut config = RuleConfig::default();
        args::configure(&mut p, "", &mut [&mut config])?;
        Ok(config)
    }

    #[test]
    fn flags() {
        let config = config(&[
            "weekly",
            "2024-01-01",
            "-i2",
            "-w",
            "mon,wed",
            "--week-day",
            "fri..sat",
            "--until",
            "2024-03-01",
            "-n",
            "7",
        ])
        .unwrap();
        let rule = config.recurrence_rule().unwrap();
        assert_eq!(rule.frequency(), Frequency::Weekly);
        assert_eq!(rule.start(), date(2024, 1, 1));
        assert_eq!(rule.until(), Some(date(2024, 3, 1)));
        assert_eq!(rule.interval(), 2);
        assert_eq!(
            rule.weekdays(),
            &[
                Weekday::Monday,
                Weekday::Wednesday,
                Weekday::Friday,
                Weekday::Saturday,
            ],
        );
        assert_eq!(config.max_iterations(), 7);
    }

    #[test]
    fn negative_interval_value() {
        let config = config(&["daily", "2024-01-01", "-i", "-1", "--lenient"])
            .unwrap();
        assert_eq!(config.interval(), -1);
        let sample = config.sample().unwrap();
        assert_eq!(sample.len(), DEFAULT_MAX_ITERATIONS);
        assert_eq!(sample.iter().last(), Some(&date(2024, 1, 1)));
    }

    #[test]
    fn missing_frequency() {
        let err = config(&["-i", "2"]).unwrap().sample().unwrap_err();
        insta::assert_snapshot!(err, @"missing required <frequency>");
    }

    #[test]
    fn bad_positionals() {
        let err = config(&["hourly"]).unwrap_err();
        insta::assert_snapshot!(
            format!("{err:#}"),
            @"<frequency>: unrecognized frequency: `hourly`",
        );

        let err = config(&["daily", "2024-01-01", "2024-02-01"]).unwrap_err();
        insta::assert_snapshot!(
            err,
            @r#"unexpected argument "2024-02-01""#,
        );
    }

    #[test]
    fn invalid_rules() {
        let err = config(&["weekly", "2024-01-01"])
            .unwrap()
            .sample()
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::NoWeekdays),
        );
        insta::assert_snapshot!(
            format!("{err:#}"),
            @"invalid recurrence rule (use --lenient to expand it anyway): weekly frequency requires at least one day of the week",
        );

        let sample = config(&["weekly", "2024-01-01", "--lenient"])
            .unwrap()
            .sample()
            .unwrap();
        assert!(sample.is_empty());
    }

    #[test]
    fn usage_lists_rule_arguments() {
        let config = RuleConfig::default();
        let formats: Vec<&str> =
            config.usage().iter().map(|u| u.format).collect();
        assert_eq!(
            formats,
            vec![
                "<frequency>",
                "<start>",
                "-i/--interval <number>",
                "-w/--week-day <week-day-list>",
                "-u/--until <date>",
                "-n/--max-iterations <number>",
                "--lenient",
            ],
        );
    }
}
