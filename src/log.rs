//! Colored terminal logging.
//!
//! Every message is prefixed with its level, styled only when the stream
//! supports colors. `trace!` output is opt-in through `GAVIN_TRACE`.

/// Environment variable that turns on `trace!` output.
pub const TRACE_VAR: &str = "GAVIN_TRACE";

#[must_use]
pub fn trace_enabled() -> bool {
    std::env::var_os(TRACE_VAR).is_some()
}

#[doc(hidden)]
#[macro_export]
macro_rules! __styled {
    ($stream:ident, $text:expr, $style:expr) => {{
        use owo_colors::OwoColorize;

        $text.if_supports_color(owo_colors::Stream::$stream, |s| s.style($style))
    }};
}

#[macro_export]
macro_rules! error {
    ($single:ident) => {
        eprintln!(
            "{}: {}",
            $crate::__styled!(Stderr, "error", owo_colors::Style::new().bold().red()),
            format_args!("{}", $single)
        )
    };
    ($($arg:tt)+) => {
        eprintln!(
            "{}: {}",
            $crate::__styled!(Stderr, "error", owo_colors::Style::new().bold().red()),
            format_args!($($arg)*)
        )
    };
}

#[macro_export]
macro_rules! warn {
    ($single:ident) => {
        println!(
            "{}: {}",
            $crate::__styled!(Stdout, "warning", owo_colors::Style::new().bold().yellow()),
            format_args!("{}", $single)
        )
    };
    ($($arg:tt)+) => {
        println!(
            "{}: {}",
            $crate::__styled!(Stdout, "warning", owo_colors::Style::new().bold().yellow()),
            format_args!($($arg)*)
        )
    };
}

#[macro_export]
macro_rules! trace {
    ($($arg:tt)+) => {
        if $crate::log::trace_enabled() {
            eprintln!(
                "{}: {}",
                $crate::__styled!(Stderr, "trace", owo_colors::Style::new().bold()),
                format_args!($($arg)*)
            );
        }
    };
}
