/// Creates a root [`Error`](crate::Error) from a message.
///
/// When invoked with a literal as the first argument, the arguments are
/// interpreted the same way as [`format!()`]. A plain literal without
/// placeholders avoids the formatting machinery entirely.
///
/// [`format!()`]: std::format
///
/// # Examples
///
/// ```
/// use errkit::error;
///
/// let plain = error!("connection refused");
/// assert_eq!(plain.to_string(), "connection refused");
///
/// let port = 5432;
/// let formatted = error!("connection refused on port {port}");
/// assert_eq!(formatted.to_string(), "connection refused on port 5432");
/// ```
#[macro_export]
macro_rules! error {
    ($msg:literal $(,)?) => {
        $crate::__private::format_error($crate::__private::format_args!($msg))
    };
    ($msg:expr $(,)?) => {
        $crate::Error::new($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::__private::format_error($crate::__private::format_args!($fmt, $($arg)*))
    };
}

/// Returns early with a root error.
///
/// Constructs a new error using the same arguments as the [`error!`] macro
/// and returns it wrapped in `Err`. Equivalent to
/// `return Err(error!(...).into())`.
///
/// # Examples
///
/// ```
/// use errkit::bail;
///
/// fn guard(value: i32) -> errkit::Result<i32> {
///     if value < 0 {
///         bail!("value must be non-negative, got {}", value);
///     }
///     Ok(value)
/// }
///
/// assert!(guard(-1).is_err());
/// assert_eq!(guard(3).unwrap(), 3);
/// ```
#[macro_export]
macro_rules! bail {
    ($($args:tt)*) => {
        return $crate::__private::Err($crate::error!($($args)*).into())
    };
}

/// Returns early with a root error unless a condition holds.
///
/// With a single argument the error message names the failed condition;
/// additional arguments are formatted like [`error!`].
///
/// # Examples
///
/// ```
/// use errkit::ensure;
///
/// fn checked_div(a: u32, b: u32) -> errkit::Result<u32> {
///     ensure!(b != 0, "division by zero: {a}/{b}");
///     Ok(a / b)
/// }
///
/// assert_eq!(checked_div(6, 3).unwrap(), 2);
/// assert!(checked_div(1, 0).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr $(,)?) => {
        if !$cond {
            $crate::bail!(concat!("condition failed: `", stringify!($cond), "`"));
        }
    };
    ($cond:expr, $($args:tt)*) => {
        if !$cond {
            $crate::bail!($($args)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::Error;

    #[test]
    fn error_macro_accepts_expressions() {
        let message = String::from("owned message");
        let err = error!(message);
        assert_eq!(err.to_string(), "owned message");
    }

    #[test]
    fn ensure_names_the_condition() {
        fn check(flag: bool) -> crate::Result<()> {
            ensure!(flag);
            Ok(())
        }
        let err: Error = check(false).unwrap_err();
        assert_eq!(err.to_string(), "condition failed: `flag`");
        assert!(check(true).is_ok());
    }
}
