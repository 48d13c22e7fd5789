use crate::command::assert_cmd_snapshot;

fn preview() -> crate::command::Command {
    crate::recur(["preview"])
}

// The expansion rules themselves are tested by unit tests. These focus on how
// the command line maps onto a rule and how the sample is printed.

#[test]
fn weekly() {
    assert_cmd_snapshot!(
        preview().args(["weekly", "-w", "mon,wed", "-n", "2", "2024-01-01"]),
        @r"
    success: true
    exit_code: 0
    ----- stdout -----
    Mon Jan 01 2024
    Wed Jan 03 2024
    Mon Jan 08 2024
    Wed Jan 10 2024

    ----- stderr -----
    ",
    );

    // A range of weekdays, ending the day before the next Saturday.
    assert_cmd_snapshot!(
        preview().args(["weekly", "-w", "mon..fri", "-u", "next sat"]),
        @r"
    success: true
    exit_code: 0
    ----- stdout -----
    Mon Jul 22 2024
    Tue Jul 23 2024
    Wed Jul 24 2024
    Thu Jul 25 2024
    Fri Jul 26 2024

    ----- stderr -----
    ",
    );

    // Both flag spellings accumulate.
    assert_cmd_snapshot!(
        preview().args([
            "w",
            "2024-01-03",
            "-w",
            "mon",
            "--week-day",
            "sun",
            "-n1",
            "-f",
            "%F %a",
        ]),
        @r"
    success: true
    exit_code: 0
    ----- stdout -----
    2024-01-07 Sun
    2024-01-08 Mon

    ----- stderr -----
    ",
    );
}

#[test]
fn default_start_is_today() {
    assert_cmd_snapshot!(
        preview().args(["daily", "-n", "3"]),
        @r"
    success: true
    exit_code: 0
    ----- stdout -----
    Sat Jul 20 2024
    Sun Jul 21 2024
    Mon Jul 22 2024

    ----- stderr -----
    ",
    );

    assert_cmd_snapshot!(
        preview().args(["daily", "-n", "2", "-f", "%F", "-1w"]),
        @r"
    success: true
    exit_code: 0
    ----- stdout -----
    2024-07-13
    2024-07-14

    ----- stderr -----
    ",
    );
}

#[test]
fn start_timestamp_in_time_zone() {
    // This is 2024-01-31T15:00 in New York.
    assert_cmd_snapshot!(
        preview().args([
            "daily",
            "-n",
            "2",
            "-f",
            "%F",
            "2024-02-01T05:00+09:00",
        ]),
        @r"
    success: true
    exit_code: 0
    ----- stdout -----
    2024-01-31
    2024-02-01

    ----- stderr -----
    ",
    );
}

#[test]
fn week_days_ignored_warning() {
    let mut settings = insta::Settings::clone_current();
    // Log lines start with the current time and a source location.
    settings.add_filter(r"(?m)^\S+\|WARN\|\S+:\d+: ", "[WARN] ");
    settings.bind(|| {
        assert_cmd_snapshot!(
            preview()
                .args(["monthly", "-w", "sat", "-n", "2", "-f", "%F"])
                .arg("2024-01-31")
                .env("RECUR_LOG", "warn"),
            @r"
        success: true
        exit_code: 0
        ----- stdout -----
        2024-01-31
        2024-02-29

        ----- stderr -----
        [WARN] -w/--week-day is ignored at monthly frequency, it only applies to weekly rules
        ",
        );
    });
}

#[test]
fn monthly_clamps() {
    assert_cmd_snapshot!(
        preview().args(["monthly", "-n", "4", "-f", "%F", "2024-01-31"]),
        @r"
    success: true
    exit_code: 0
    ----- stdout -----
    2024-01-31
    2024-02-29
    2024-03-29
    2024-04-29

    ----- stderr -----
    ",
    );

    assert_cmd_snapshot!(
        preview().args(["mo", "-i2", "-n", "3", "-f", "%F", "2024-01-31"]),
        @r"
    success: true
    exit_code: 0
    ----- stdout -----
    2024-01-31
    2024-03-31
    2024-05-31

    ----- stderr -----
    ",
    );
}

#[test]
fn until_is_inclusive() {
    assert_cmd_snapshot!(
        preview().args([
            "yearly",
            "-u",
            "2024-02-01",
            "-f",
            "%F",
            "2024-01-31",
        ]),
        @r"
    success: true
    exit_code: 0
    ----- stdout -----
    2024-01-31

    ----- stderr -----
    ",
    );

    assert_cmd_snapshot!(
        preview().args([
            "daily",
            "-i3",
            "-u",
            "2024-01-07",
            "-f",
            "%F",
            "2024-01-01",
        ]),
        @r"
    success: true
    exit_code: 0
    ----- stdout -----
    2024-01-01
    2024-01-04
    2024-01-07

    ----- stderr -----
    ",
    );
}

#[test]
fn empty() {
    assert_cmd_snapshot!(
        preview().args(["daily", "-n", "0"]),
        @r"
    success: true
    exit_code: 0
    ----- stdout -----
    No dates selected

    ----- stderr -----
    ",
    );

    assert_cmd_snapshot!(
        preview().args(["weekly", "--lenient", "2024-01-01"]),
        @r"
    success: true
    exit_code: 0
    ----- stdout -----
    No dates selected

    ----- stderr -----
    ",
    );
}

#[test]
fn invalid() {
    assert_cmd_snapshot!(
        preview().args(["daily", "-i", "0"]),
        @r"
    success: false
    exit_code: 1
    ----- stdout -----

    ----- stderr -----
    invalid recurrence rule (use --lenient to expand it anyway): interval value of `0` is invalid (interval must be greater than or equal to 1)
    ",
    );

    assert_cmd_snapshot!(
        preview().args(["daily", "-u", "2024-01-01", "2024-02-01"]),
        @r"
    success: false
    exit_code: 1
    ----- stdout -----

    ----- stderr -----
    invalid recurrence rule (use --lenient to expand it anyway): end date `2024-01-01` is before start date `2024-02-01`
    ",
    );

    assert_cmd_snapshot!(
        preview().args(["weekly", "2024-01-01"]),
        @r"
    success: false
    exit_code: 1
    ----- stdout -----

    ----- stderr -----
    invalid recurrence rule (use --lenient to expand it anyway): weekly frequency requires at least one day of the week
    ",
    );
}

#[test]
fn lenient() {
    // The cursor never moves, and repeats are kept.
    assert_cmd_snapshot!(
        preview().args([
            "daily",
            "-i",
            "0",
            "-n",
            "3",
            "--lenient",
            "2024-01-01",
        ]),
        @r"
    success: true
    exit_code: 0
    ----- stdout -----
    Mon Jan 01 2024
    Mon Jan 01 2024
    Mon Jan 01 2024

    ----- stderr -----
    ",
    );

    // Walking backwards still prints in chronological order.
    assert_cmd_snapshot!(
        preview().args([
            "daily",
            "-i-2",
            "-n",
            "3",
            "-f",
            "%F",
            "--lenient",
            "2024-01-01",
        ]),
        @r"
    success: true
    exit_code: 0
    ----- stdout -----
    2023-12-28
    2023-12-30
    2024-01-01

    ----- stderr -----
    ",
    );

    // An end date before the start date gives nothing.
    assert_cmd_snapshot!(
        preview().args([
            "daily",
            "-u",
            "2024-01-01",
            "--lenient",
            "2024-02-01",
        ]),
        @r"
    success: true
    exit_code: 0
    ----- stdout -----
    No dates selected

    ----- stderr -----
    ",
    );
}

#[test]
fn bad_arguments() {
    assert_cmd_snapshot!(
        preview().args(["hourly"]),
        @r"
    success: false
    exit_code: 1
    ----- stdout -----

    ----- stderr -----
    <frequency>: unrecognized frequency: `hourly`
    ",
    );

    assert_cmd_snapshot!(
        preview().args(["daily", "someday"]),
        @r"
    success: false
    exit_code: 1
    ----- stdout -----

    ----- stderr -----
    <start>: unrecognized date `someday`
    ",
    );

    assert_cmd_snapshot!(
        preview().args(["weekly", "-w", "mon..fry"]),
        @r"
    success: false
    exit_code: 1
    ----- stdout -----

    ----- stderr -----
    -w/--week-day: failed to parse `mon..fry` within sequence `mon..fry`: failed to parse end of weekday range `mon..fry`: unrecognized weekday: `fry`
    ",
    );

    assert_cmd_snapshot!(
        preview().args(["daily", "-f", ""]),
        @r"
    success: false
    exit_code: 1
    ----- stdout -----

    ----- stderr -----
    -f/--format: date format must not be empty
    ",
    );

    assert_cmd_snapshot!(
        preview().args(["daily", "--count", "3"]),
        @r"
    success: false
    exit_code: 1
    ----- stdout -----

    ----- stderr -----
    invalid option '--count'
    ",
    );
}

#[test]
fn help() {
    assert_cmd_snapshot!(
        preview().arg("-h"),
        @r"
    success: true
    exit_code: 0
    ----- stdout -----
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

    ARGUMENTS:
        <frequency>  The frequency at which to repeat a sequence.
        <start>      The first date of the sequence, e.g., `2024-01-31` (default today).

    OPTIONS:
        -f/--format <strftime>         Print dates in this format (default `%a %b %d %Y`).
        -h/--help                      Print help output. Use --help for more details.
        -i/--interval <number>         Sets the interval at which the sequence repeats (default 1).
        --lenient                      Expand the rule even if it is invalid.
        -n/--max-iterations <number>   The number of steps to take through the sequence (default 50).
        -u/--until <date>              The last date (inclusive) that may be generated.
        --version                      Print the version of recur.
        -w/--week-day <week-day-list>  Provide one or more days of the week.

    ----- stderr -----
    ",
    );
}
