mod preview;
mod rule;
mod submit;

const USAGE: &'static str = "\
Expand recurrence rules into concrete calendar dates.

USAGE:
    recur <command> ...

COMMANDS:
    preview  Print a human readable preview of the dates in a recurrence
    submit   Emit the dates in a recurrence as JSON for a downstream consumer
";

pub fn run(p: &mut lexopt::Parser) -> anyhow::Result<()> {
    let cmd = crate::args::next_as_command(USAGE, p)?;
    match &*cmd {
        "preview" => preview::run(p),
        "submit" => submit::run(p),
        unk => anyhow::bail!("unrecognized command '{}'", unk),
    }
}
