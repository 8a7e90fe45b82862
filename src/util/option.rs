pub(crate) trait OptionExtension<T> {
    fn unreachable(self) -> T;
}

impl<T> OptionExtension<T> for Option<T> {
    /// Acts like [`Option::unwrap`], but states that the `None` branch is a broken internal
    /// invariant of the tree rather than a caller mistake. Unlike a release-mode
    /// `unreachable_unchecked`, this always panics, because a corrupted link must never turn into
    /// an out of bounds slot access.
    #[track_caller]
    fn unreachable(self) -> T {
        match self {
            Some(val) => val,
            None => unreachable!("tree link invariant violated"),
        }
    }
}
