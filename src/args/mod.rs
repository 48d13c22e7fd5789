use std::{
    ffi::OsStr,
    fmt::{Debug, Display, Write},
    str::FromStr,
    sync::LazyLock,
};

use {
    anyhow::Context,
    lexopt::{Arg, Parser, ValueExt},
    regex::Regex,
};

pub mod flags;

/// Something that claims some subset of the arguments given on the CLI.
///
/// Each command hands a list of these to `configure`, which offers every
/// argument to each of them in turn until one accepts it.
pub trait Configurable: Debug {
    /// Returns true if `arg` was recognized and consumed (along with any
    /// value it needs from `p`).
    fn configure(
        &mut self,
        p: &mut Parser,
        arg: &mut Arg,
    ) -> anyhow::Result<bool>;

    /// A list of `Usage` documentation for the flags/arguments that this
    /// implementation parses.
    fn usage(&self) -> &[Usage] {
        &[]
    }
}

/// Feed every remaining argument in `p` to `targets`.
///
/// `usage` is the command's help template. `%args%` and `%flags%` within it
/// are replaced with the docs collected from `targets` when `-h/--help` is
/// seen, and the rendered help is returned as a `Help` error.
pub fn configure(
    p: &mut Parser,
    usage: &str,
    targets: &mut [&mut dyn Configurable],
) -> anyhow::Result<()> {
    loop {
        let arg = match parse_dash_number(p) {
            Some(arg) => arg,
            None => match p.next()? {
                Some(arg) => arg,
                None => return Ok(()),
            },
        };
        match arg {
            Arg::Short('h') => {
                return Err(Help::render(usage, targets, false).into());
            }
            Arg::Long("help") => {
                return Err(Help::render(usage, targets, true).into());
            }
            Arg::Long("version") => return Err(Version.into()),
            _ => {}
        }
        // Long flag names borrow from `p`, but `p` is also handed to each
        // target. So give the name an owned home first.
        let long_flag = match arg {
            Arg::Long(name) => Some(name.to_string()),
            _ => None,
        };
        let mut arg = match (long_flag.as_deref(), arg) {
            (Some(name), _) => Arg::Long(name),
            (None, Arg::Short(c)) => Arg::Short(c),
            (None, Arg::Value(value)) => Arg::Value(value),
            (None, Arg::Long(_)) => unreachable!(),
        };
        let mut recognized = false;
        for target in targets.iter_mut() {
            if target.configure(p, &mut arg)? {
                recognized = true;
                break;
            }
        }
        if !recognized {
            return Err(arg.unexpected().into());
        }
    }
}

/// Attempts to parse a `-[0-9]{remaining}` and convert it to a positional
/// argument.
///
/// We make `-[0-9]` always be interpreted as a positional argument, since a
/// start date like `-2w` (two weeks ago) is otherwise mistaken for a cluster
/// of short flags. In exchange, we can't have a short flag corresponding to
/// an ASCII digit.
///
/// We also allow `-P1W` for ISO 8601 durations. This means `P` can't be used
/// as a short flag either.
///
/// Ref: https://docs.rs/lexopt/latest/lexopt/struct.Parser.html#method.try_raw_args
fn parse_dash_number(parser: &mut Parser) -> Option<Arg<'_>> {
    parser
        .try_raw_args()?
        .next_if(|arg| {
            let value = arg.as_encoded_bytes();
            value.len() >= 2
                && value[0] == b'-'
                && (value[1].is_ascii_digit() || value[1] == b'P')
        })
        .map(Arg::Value)
}

/// Parses the next argument as a command name.
///
/// `-h/--help` and `--version` are turned into `Help` and `Version` errors.
/// A missing command is an error whose message is the usage text.
pub fn next_as_command(usage: &str, p: &mut Parser) -> anyhow::Result<String> {
    let usage = usage.trim();
    let Some(arg) = p.next()? else { anyhow::bail!("{usage}") };
    match arg {
        Arg::Value(cmd) => Ok(cmd.string()?),
        Arg::Short('h') | Arg::Long("help") => {
            Err(Help(usage.to_string()).into())
        }
        Arg::Long("version") => Err(Version.into()),
        arg => Err(arg.unexpected().into()),
    }
}

/// Parses the next 'p.value()' into 'T'. Any error messages will include the
/// given flag name in them.
pub fn parse<T>(p: &mut Parser, flag_name: &'static str) -> anyhow::Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: Display + Debug + Send + Sync + 'static,
{
    // The 'FromStr' impls in this crate use 'anyhow::Error', which does not
    // impl 'std::error::Error'. So we can't lean on 'ValueExt::parse' here.
    let osv = p.value().context(flag_name)?;
    parse_value(&osv, flag_name)
}

/// Parses a value that was already taken from the parser, such as a
/// positional argument, into `T`.
pub fn parse_value<T>(osv: &OsStr, name: &'static str) -> anyhow::Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: Display + Debug + Send + Sync + 'static,
{
    let Some(strv) = osv.to_str() else {
        let err = lexopt::Error::NonUnicodeValue(osv.into());
        return Err(anyhow::Error::from(err).context(name));
    };
    strv.parse().map_err(|err| anyhow::Error::msg(err).context(name))
}

/// Documentation for a single flag or positional argument.
///
/// `Usage::short` renders a list of these as a two column table, while
/// `Usage::long` renders every paragraph of the long description.
#[derive(Clone, Copy, Debug)]
pub struct Usage {
    /// Whether this is docs for a flag (optional) or an argument.
    pub flag: bool,
    /// The format of the flag, for example, `-i/--interval <number>`.
    pub format: &'static str,
    /// A one line description.
    pub short: &'static str,
    /// A longer form description. Paragraphs are separated by blank lines.
    pub long: &'static str,
}

impl Usage {
    /// Create a new usage for an optional flag from the given components.
    pub const fn flag(
        format: &'static str,
        short: &'static str,
        long: &'static str,
    ) -> Usage {
        Usage { flag: true, format, short, long }
    }

    /// Create a new usage for a positional argument from the given
    /// components.
    pub const fn arg(
        format: &'static str,
        short: &'static str,
        long: &'static str,
    ) -> Usage {
        Usage { flag: false, format, short, long }
    }

    /// Format a two column table from the given usages, where the first
    /// column is the format and the second column is the short description.
    pub fn short(usages: &[Usage]) -> String {
        const MIN_SPACE: usize = 2;

        let mut result = String::new();
        let Some(width) = usages.iter().map(|u| u.format.len()).max() else {
            return result;
        };
        for usage in usages.iter() {
            let pad = " ".repeat(MIN_SPACE + width - usage.format.len());
            writeln!(result, "    {}{pad}{}", usage.format, usage.short)
                .unwrap();
        }
        result
    }

    /// Print the format of each usage with its long description wrapped and
    /// indented below it.
    pub fn long(usages: &[Usage]) -> String {
        let wrap_opts = textwrap::Options::new(79)
            .initial_indent("        ")
            .subsequent_indent("        ");
        let mut result = String::new();
        for (i, usage) in usages.iter().enumerate() {
            if i > 0 {
                result.push('\n');
            }
            writeln!(result, "    {}", usage.format).unwrap();
            let paragraphs = usage.long.trim().split("\n\n");
            for (j, paragraph) in paragraphs.enumerate() {
                if j > 0 {
                    result.push('\n');
                }
                let flattened = paragraph.replace('\n', " ");
                for line in textwrap::wrap(&flattened, &wrap_opts) {
                    result.push_str(&line);
                    result.push('\n');
                }
            }
        }
        result
    }
}

/// An error type indicating that the error is a `-h/--help` message.
///
/// In other words, it should be printed to stdout with a success exit code.
///
/// We sniff this out in `main` via downcasting an `anyhow::Error`.
#[derive(Debug)]
pub struct Help(String);

impl Help {
    const USAGE: Usage = Usage::flag(
        "-h/--help",
        "Print help output. Use --help for more details.",
        r#"
Print help output.

The short flag, -h, shows a condensed help output with a single line for every
flag. The long flag, --help, shows complete documentation.
"#,
    );

    /// Render the help for a command from its template and the docs of every
    /// target that parses its arguments.
    fn render(
        template: &str,
        targets: &[&mut dyn Configurable],
        long: bool,
    ) -> Help {
        // Removes `%snip-start%`, `%snip-end%` and everything between them.
        static SNIPS: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"(?m)^\s*%snip-start%\p{any}*?%snip-end%\s*$")
                .unwrap()
        });
        // Removes only the `%snip-start%` and `%snip-end%` markers.
        static SNIP_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"(?m)^\s*%snip-(start|end)%\s*$").unwrap()
        });

        // Positional arguments keep the order their targets list them in.
        let mut args = vec![];
        let mut flags = vec![Help::USAGE, Version::USAGE];
        for target in targets.iter() {
            for &usage in target.usage() {
                if usage.flag {
                    flags.push(usage);
                } else {
                    args.push(usage);
                }
            }
        }
        flags.sort_by_key(|u| u.format.trim_start_matches('-'));

        let (template, args, flags) = if long {
            let template = SNIP_MARKERS.replace_all(template, "");
            (template, Usage::long(&args), Usage::long(&flags))
        } else {
            let template = SNIPS.replace_all(template, "");
            (template, Usage::short(&args), Usage::short(&flags))
        };
        let rendered =
            template.replace("%args%", &args).replace("%flags%", &flags);
        Help(rendered.trim().to_string())
    }
}

impl std::fmt::Display for Help {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for Help {}

/// An error type indicating that the error is a `--version` message.
///
/// Like `Help`, this is printed to stdout with a success exit code.
#[derive(Debug)]
pub struct Version;

impl Version {
    const USAGE: Usage = Usage::flag(
        "--version",
        "Print the version of recur.",
        r#"
Print the version of recur.
"#,
    );
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let semver = option_env!("CARGO_PKG_VERSION").unwrap_or("N/A");
        match option_env!("RECUR_BUILD_GIT_HASH") {
            None => write!(f, "recur {semver}"),
            Some(hash) => write!(f, "recur {semver} (rev {hash})"),
        }
    }
}

impl std::error::Error for Version {}
