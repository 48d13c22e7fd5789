use crate::command::assert_cmd_snapshot;

fn submit() -> crate::command::Command {
    crate::recur(["submit"])
}

#[test]
fn weekly() {
    assert_cmd_snapshot!(
        submit().args(["weekly", "-w", "mon,wed", "-n", "2", "2024-01-01"]),
        @r#"
    success: true
    exit_code: 0
    ----- stdout -----
    {"count":4,"dates":["2024-01-01","2024-01-03","2024-01-08","2024-01-10"]}

    ----- stderr -----
    "#,
    );
}

#[test]
fn empty() {
    assert_cmd_snapshot!(
        submit().args(["daily", "-n", "0"]),
        @r#"
    success: true
    exit_code: 0
    ----- stdout -----
    {"count":0,"dates":[]}

    ----- stderr -----
    "#,
    );
}

#[test]
fn default_budget() {
    let snap = submit().args(["daily", "2024-01-01"]).snapshot();
    let doc: serde_json::Value = serde_json::from_slice(snap.stdout()).unwrap();
    assert_eq!(doc["count"], 50);
    let dates = doc["dates"].as_array().unwrap();
    assert_eq!(dates.len(), 50);
    assert_eq!(dates[0], "2024-01-01");
    assert_eq!(dates[49], "2024-02-19");
}

#[test]
fn one_document_per_line() {
    let snap = submit().args(["yearly", "-n", "3", "2024-02-29"]).snapshot();
    let stdout = std::str::from_utf8(snap.stdout()).unwrap();
    assert_eq!(stdout.lines().count(), 1);
    assert!(stdout.ends_with('\n'));
    insta::assert_snapshot!(
        stdout.trim_end(),
        @r#"{"count":3,"dates":["2024-02-29","2025-02-28","2026-02-28"]}"#,
    );
}

#[test]
fn invalid() {
    assert_cmd_snapshot!(
        submit().args(["weekly", "-i", "-1", "-w", "fri", "2024-01-01"]),
        @r"
    success: false
    exit_code: 1
    ----- stdout -----

    ----- stderr -----
    invalid recurrence rule (use --lenient to expand it anyway): interval value of `-1` is invalid (interval must be greater than or equal to 1)
    ",
    );

    // With `--lenient`, a weekly rule with a zero interval repeats the same
    // week, but each date only shows up once.
    assert_cmd_snapshot!(
        submit().args([
            "weekly",
            "-i",
            "0",
            "-w",
            "mon,fri",
            "-n",
            "5",
            "--lenient",
            "2024-01-01",
        ]),
        @r#"
    success: true
    exit_code: 0
    ----- stdout -----
    {"count":2,"dates":["2024-01-01","2024-01-05"]}

    ----- stderr -----
    "#,
    );
}

#[test]
fn help() {
    assert_cmd_snapshot!(
        submit().arg("-h"),
        @r#"
    success: true
    exit_code: 0
    ----- stdout -----
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

    ARGUMENTS:
        <frequency>  The frequency at which to repeat a sequence.
        <start>      The first date of the sequence, e.g., `2024-01-31` (default today).

    OPTIONS:
        -h/--help                      Print help output. Use --help for more details.
        -i/--interval <number>         Sets the interval at which the sequence repeats (default 1).
        --lenient                      Expand the rule even if it is invalid.
        -n/--max-iterations <number>   The number of steps to take through the sequence (default 50).
        -u/--until <date>              The last date (inclusive) that may be generated.
        --version                      Print the version of recur.
        -w/--week-day <week-day-list>  Provide one or more days of the week.

    ----- stderr -----
    "#,
    );
}
