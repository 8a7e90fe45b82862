#![cfg(test)]

use std::cell::Cell;
use std::rc::Rc;

/// A value which counts how many times it (or any of its clones) has been dropped, for checking
/// that a collection releases every entry exactly once.
#[derive(Debug, Clone)]
pub struct CountedDrop(pub Rc<Cell<usize>>);

impl CountedDrop {
    pub fn new() -> CountedDrop {
        CountedDrop(Rc::new(Cell::new(0)))
    }

    /// Returns the number of drops recorded so far and resets the counter.
    pub fn take(&self) -> usize {
        self.0.replace(0)
    }
}

impl Drop for CountedDrop {
    fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}
