use std::io::Write;

use crate::{
    args::{self, Usage, flags::DateFormat},
    cmd::rule::RuleConfig,
    style::Theme,
};

const USAGE: &'static str = r#"
Print a human readable preview of the dates in a recurrence.

Dates are generated from the given start date (today by default) at the given
frequency and printed one per line in chronological order. When no dates are
generated, a short note saying so is printed instead.

USAGE:
    recur preview <frequency> [<start>]

TIP:
    use -h for short docs and --help for long docs

EXAMPLES:
    Every Monday and Wednesday for two weeks:

        $ recur preview weekly -w mon,wed -n 2 2024-01-01
        Mon Jan 01 2024
        Wed Jan 03 2024
        Mon Jan 08 2024
        Wed Jan 10 2024

    %snip-start%

    The last day of every other month. The day of the month is kept when it
    exists:

        $ recur preview monthly -i 2 -n 3 -f %F 2024-01-31
        2024-01-31
        2024-03-31
        2024-05-31

    Without `-i 2`, February clamps the sequence to the 29th, and it stays
    there:

        $ recur preview monthly -n 4 -f %F 2024-01-31
        2024-01-31
        2024-02-29
        2024-03-29
        2024-04-29

    Every work day until the end of next week, starting today:

        $ recur preview weekly -w mon..fri --until 'next sat'

    %snip-end%
ARGUMENTS:
%args%
OPTIONS:
%flags%
"#;

pub fn run(p: &mut lexopt::Parser) -> anyhow::Result<()> {
    let mut config = Config::default();
    let mut rule = RuleConfig::default();
    args::configure(p, USAGE, &mut [&mut rule, &mut config])?;

    let sample = rule.sample()?;
    let mut wtr = std::io::stdout().lock();
    if sample.is_empty() {
        writeln!(wtr, "{}", Theme::stdout().note("No dates selected"))?;
        return Ok(());
    }
    for &date in &sample {
        writeln!(wtr, "{}", config.format.format(date)?)?;
    }
    Ok(())
}

#[derive(Debug, Default)]
struct Config {
    format: DateFormat,
}

impl args::Configurable for Config {
    fn configure(
        &mut self,
        p: &mut lexopt::Parser,
        arg: &mut lexopt::Arg,
    ) -> anyhow::Result<bool> {
        match *arg {
            lexopt::Arg::Short('f') | lexopt::Arg::Long("format") => {
                self.format = args::parse(p, "-f/--format")?;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        &[DateFormat::USAGE]
    }
}
