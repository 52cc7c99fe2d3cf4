// Logging shims. With `feature = "tracing"` these forward to `tracing` under the
// `virtual_scroll` target; without it they expand to an empty statement.

macro_rules! vtrace {
    ($($tt:tt)*) => {
        #[cfg(feature = "tracing")]
        {
            tracing::trace!(target: "virtual_scroll", $($tt)*);
        }
    };
}

macro_rules! vdebug {
    ($($tt:tt)*) => {
        #[cfg(feature = "tracing")]
        {
            tracing::debug!(target: "virtual_scroll", $($tt)*);
        }
    };
}

macro_rules! vwarn {
    ($($tt:tt)*) => {
        #[cfg(feature = "tracing")]
        {
            tracing::warn!(target: "virtual_scroll", $($tt)*);
        }
    };
}
