use std::fmt;

/// Emits a `log::trace!` record when the `log` feature is enabled, and
/// nothing otherwise.
#[cfg(feature = "log")]
macro_rules! trace {
    ($($arg:tt)+) => { log::trace!(target: "keyed_slotmap", $($arg)+) };
}

#[cfg(not(feature = "log"))]
macro_rules! trace {
    ($($arg:tt)+) => {
        if false {
            let _ = format_args!($($arg)+);
        }
    };
}

/// Debug format a slot map as `{key: value, ...}` in slot order.
pub fn debug_fmt_entries<I, K, V>(entries: I, f: &mut fmt::Formatter) -> fmt::Result
where
    I: IntoIterator<Item = (K, V)>,
    K: fmt::Debug,
    V: fmt::Debug,
{
    f.debug_map().entries(entries).finish()
}
