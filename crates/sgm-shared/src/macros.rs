/// Builds the text shown for a failure that should never happen and logs it
/// with the location it was raised at
#[macro_export]
macro_rules! internal_error {
    ($arg: expr) => {{
        let internal_error_msg = format!("Error interno: {} ({}:{})", $arg, file!(), line!());
        tracing::error!(%internal_error_msg);
        internal_error_msg
    }};
}

/// Logs the error of a result that may fail under normal operation and
/// carries on
#[macro_export]
macro_rules! log_err_as_warn {
    ($arg: expr, $what: literal) => {
        if let Err(err) = $arg {
            tracing::warn!(?err, $what);
        }
    };
}
