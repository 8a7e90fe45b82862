use std::error::Error;

/// Turns the `try_` half of a method pair into its panicking half.
pub(crate) trait ResultExtension<T, E: Error> {
    /// Unwraps the value, or panics with the error's own message, reported at the location of the
    /// public method that was misused (such as dereferencing a stale position).
    ///
    /// # Panics
    /// Panics if the [`Result`] is an [`Err`].
    fn throw(self) -> T;
}

impl<T, E: Error> ResultExtension<T, E> for Result<T, E> {
    #[track_caller]
    fn throw(self) -> T {
        match self {
            Ok(value) => value,
            Err(error) => panic!("{error}"),
        }
    }
}
