/// Early-return guard for fallible constructors and validators
///
/// Works like `assert!` but returns `Err($err)` from the enclosing function instead of
/// panicking. Equivalent to `if !$cond { return Err($err); }`, without converting the error,
/// so `$err` must already have the function's error type.
///
/// ```
/// # use ensure_macro::ensure;
/// #[derive(Debug, PartialEq)]
/// enum AmountError {
///     NegativeFee,
/// }
///
/// fn fee(inputs: u64, outputs: u64) -> Result<u64, AmountError> {
///     ensure!(inputs >= outputs, AmountError::NegativeFee);
///     Ok(inputs - outputs)
/// }
///
/// assert_eq!(fee(10, 7), Ok(3));
/// assert_eq!(fee(7, 10), Err(AmountError::NegativeFee));
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
}
