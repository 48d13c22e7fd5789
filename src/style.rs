use std::{
    fmt::Display,
    io::IsTerminal,
    sync::{Arc, LazyLock},
};

use anstyle::{AnsiColor, Style};

/// A theme that indicates how output should be styled.
///
/// The styles returned may be completely unstyled, for example, when the
/// stream isn't a tty or when `NO_COLOR` is set.
#[derive(Clone, Debug)]
pub struct Theme {
    inner: Option<Arc<ThemeInner>>,
}

impl Theme {
    /// Returns a theme for stdout.
    pub fn stdout() -> &'static Theme {
        static THEME: LazyLock<Theme> =
            LazyLock::new(|| Theme::new(std::io::stdout().is_terminal()));
        &*THEME
    }

    /// Returns a theme for stderr.
    pub fn stderr() -> &'static Theme {
        static THEME: LazyLock<Theme> =
            LazyLock::new(|| Theme::new(std::io::stderr().is_terminal()));
        &*THEME
    }

    fn new(tty: bool) -> Theme {
        if !tty || !can_use_colors() {
            return Theme { inner: None };
        }
        Theme { inner: Some(Arc::new(ThemeInner::default())) }
    }

    /// Used for the timestamps in log messages.
    pub fn highlight<T: Display>(&self, data: T) -> Styled<'_, T> {
        let style = self.inner.as_deref().map(|inner| &inner.highlight);
        Styled { data, style }
    }

    /// Used for placeholder text, like when there is nothing to preview.
    pub fn note<T: Display>(&self, data: T) -> Styled<'_, T> {
        let style = self.inner.as_deref().map(|inner| &inner.note);
        Styled { data, style }
    }
}

#[derive(Debug)]
struct ThemeInner {
    highlight: Style,
    note: Style,
}

impl Default for ThemeInner {
    fn default() -> ThemeInner {
        ThemeInner {
            highlight: Style::new()
                .bold()
                .fg_color(Some(AnsiColor::Magenta.into())),
            note: Style::new()
                .italic()
                .fg_color(Some(AnsiColor::BrightBlack.into())),
        }
    }
}

/// A possibly unstyled piece of renderable data.
#[derive(Clone, Debug)]
pub struct Styled<'s, T> {
    data: T,
    style: Option<&'s Style>,
}

impl<'s, T: Display> Display for Styled<'s, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let Some(style) = self.style else {
            return self.data.fmt(f);
        };
        write!(f, "{style}{}{style:#}", self.data)
    }
}

/// Whether colors have been globally disabled or not.
fn can_use_colors() -> bool {
    static YES: LazyLock<bool> = LazyLock::new(|| {
        if std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
            return false;
        }
        std::env::var_os("TERM").map_or(true, |v| v != "dumb")
    });
    *YES
}
