use std::{env, io::Write, process::ExitCode, sync::LazyLock};

use {
    anyhow::Context,
    jiff::{Timestamp, Zoned, tz::TimeZone},
};

mod args;
mod cmd;
mod date;
mod logger;
mod recur;
mod style;

static TZ: LazyLock<TimeZone> = LazyLock::new(|| TimeZone::system());

/// The current time, which determines what "today" means.
static NOW: LazyLock<Zoned> = LazyLock::new(|| {
    let ts = match read_env_recur_now() {
        Ok(Some(ts)) => {
            log::trace!(
                "setting current time to `{ts}` from `RECUR_NOW` \
                 environment variable",
            );
            ts
        }
        Ok(None) => Timestamp::now(),
        Err(err) => {
            let now = Timestamp::now();
            log::warn!(
                "reading `RECUR_NOW` failed, using current time \
                 `{now}`: {err:#}",
            );
            now
        }
    };
    ts.to_zoned(TZ.clone())
});

/// Every day, every other Tuesday, the last of every month.
fn main() -> ExitCode {
    let err = match run() {
        Ok(code) => return code,
        Err(err) => err,
    };
    let root = err.root_cause();
    if root.is::<args::Help>() || root.is::<args::Version>() {
        writeln!(&mut std::io::stdout(), "{root}").unwrap();
        return ExitCode::SUCCESS;
    }
    // A broken pipe (e.g., `recur preview daily | head -n1`) is treated as
    // success, like it would be for a C program killed by SIGPIPE.
    if is_broken_pipe(&err) {
        return ExitCode::SUCCESS;
    }
    if std::env::var("RUST_BACKTRACE").map_or(false, |v| v == "1")
        && std::env::var("RUST_LIB_BACKTRACE").map_or(true, |v| v == "1")
    {
        writeln!(&mut std::io::stderr(), "{:?}", err).unwrap();
    } else {
        writeln!(&mut std::io::stderr(), "{:#}", err).unwrap();
    }
    ExitCode::from(1)
}

fn run() -> anyhow::Result<ExitCode> {
    log::set_max_level(read_env_recur_log()?);
    // The logger is set up before the system time zone is read so that
    // anything Jiff logs while finding it still gets emitted (in UTC).
    let logger = logger::Logger::init()?;
    logger.set_time_zone(TZ.clone());
    cmd::run(&mut lexopt::Parser::from_env())?;
    Ok(ExitCode::SUCCESS)
}

fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        if let Some(err) = cause.downcast_ref::<std::io::Error>() {
            return err.kind() == std::io::ErrorKind::BrokenPipe;
        }
        // `serde_json` doesn't expose the `std::io::Error` it hits when
        // writing via `to_writer` as a source, so check it explicitly.
        if let Some(err) = cause.downcast_ref::<serde_json::Error>() {
            return err.io_error_kind() == Some(std::io::ErrorKind::BrokenPipe);
        }
        false
    })
}

fn read_env_recur_log() -> anyhow::Result<log::LevelFilter> {
    let level = env::var("RECUR_LOG").unwrap_or_else(|_| String::new());
    Ok(match &*level {
        "" | "off" => log::LevelFilter::Off,
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "info" => log::LevelFilter::Info,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        unk => anyhow::bail!("unrecognized log level '{}'", unk),
    })
}

fn read_env_recur_now() -> anyhow::Result<Option<Timestamp>> {
    let Some(val) = std::env::var_os("RECUR_NOW") else { return Ok(None) };
    let Some(val) = val.to_str() else {
        anyhow::bail!(
            "`RECUR_NOW` environment variable is not valid UTF-8: {val:?}"
        )
    };
    val.parse::<Timestamp>()
        .context(
            "`RECUR_NOW` environment variable is not a valid RFC 3339 timestamp",
        )
        .map(Some)
}
