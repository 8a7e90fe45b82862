use std::fmt::{self, Debug, Formatter};

/// Writes the contained string verbatim when debug formatted, which allows pre-rendered
/// structures (such as a drawn tree) to be used as a field in [`Formatter::debug_struct`].
pub struct DebugRaw(pub String);

impl Debug for DebugRaw {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
