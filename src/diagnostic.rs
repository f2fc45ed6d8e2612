use crate::Error;
use anstyle::{AnsiColor, Style};
use std::io::{IsTerminal, Write};

/// Write a one-line description of `error` to standard error
pub fn report(error: &Error) {
    let stderr = std::io::stderr();
    let style = if stderr.is_terminal() {
        Style::new().bold().fg_color(Some(AnsiColor::Red.into()))
    } else {
        Style::new()
    };
    // Nothing more can be done if `stderr` is gone; the exit code still reports the failure.
    writeln!(stderr.lock(), "{}", render(error, style)).unwrap_or_default();
}

fn render(error: &Error, style: Style) -> String {
    format!("{}error{}: {error}", style.render(), style.render_reset())
}
