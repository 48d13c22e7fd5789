use std::io::Write;

use anyhow::Context;

use crate::{args, cmd::rule::RuleConfig};

const USAGE: &'static str = r#"
Emit the dates in a recurrence as JSON for a downstream consumer.

The dates are the same ones `recur preview` would print for the same
arguments. They are written as a single JSON object on one line, with a
`count` of dates and the `dates` themselves in chronological order, each as
an ISO 8601 date.

USAGE:
    recur submit <frequency> [<start>]

TIP:
    use -h for short docs and --help for long docs

EXAMPLES:
    Every Monday and Wednesday for two weeks:

        $ recur submit weekly -w mon,wed -n 2 2024-01-01
        {"count":4,"dates":["2024-01-01","2024-01-03","2024-01-08","2024-01-10"]}

    %snip-start%

    An empty sequence is still a valid document:

        $ recur submit daily -n 0
        {"count":0,"dates":[]}

    %snip-end%
ARGUMENTS:
%args%
OPTIONS:
%flags%
"#;

pub fn run(p: &mut lexopt::Parser) -> anyhow::Result<()> {
    let mut rule = RuleConfig::default();
    args::configure(p, USAGE, &mut [&mut rule])?;

    let sample = rule.sample()?;
    log::debug!("writing {} dates as JSON", sample.len());
    let mut wtr = std::io::stdout().lock();
    serde_json::to_writer(&mut wtr, &sample)
        .context("failed to write dates as JSON")?;
    writeln!(wtr)?;
    Ok(())
}
