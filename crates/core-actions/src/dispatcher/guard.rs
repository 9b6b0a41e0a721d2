use std::cell::Cell;
use std::rc::Rc;

/// Shared flag that keeps replayed chords away from the remappers.
///
/// Cloning hands out another handle to the same flag. Engaging returns a
/// token; dropping the token restores whatever state the flag had before,
/// so nested engagements unwind correctly.
#[derive(Debug, Clone, Default)]
pub struct RemapGuard(Rc<Cell<bool>>);

impl RemapGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_engaged(&self) -> bool {
        self.0.get()
    }

    #[must_use = "the guard is released as soon as the token is dropped"]
    pub fn engage(&self) -> GuardToken {
        let previous = self.0.replace(true);
        GuardToken {
            flag: Rc::clone(&self.0),
            previous,
        }
    }
}

#[derive(Debug)]
pub struct GuardToken {
    flag: Rc<Cell<bool>>,
    previous: bool,
}

impl Drop for GuardToken {
    fn drop(&mut self) {
        self.flag.set(self.previous);
    }
}
