/// Single-slot undo buffer: holds the payload of the last destructive transition.
///
/// A new `stash` supersedes whatever was held; `take` consumes it exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoSlot<T> {
    slot: Option<T>,
}

impl<T> Default for UndoSlot<T> {
    fn default() -> Self {
        UndoSlot { slot: None }
    }
}

impl<T> UndoSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_option(slot: Option<T>) -> Self {
        UndoSlot { slot }
    }

    /// Returns the superseded payload, if any.
    pub fn stash(&mut self, value: T) -> Option<T> {
        self.slot.replace(value)
    }

    pub fn take(&mut self) -> Option<T> {
        self.slot.take()
    }

    pub fn peek(&self) -> Option<&T> {
        self.slot.as_ref()
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_consumes_once() {
        let mut slot = UndoSlot::new();
        slot.stash(1);
        assert_eq!(slot.take(), Some(1));
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn stash_supersedes() {
        let mut slot = UndoSlot::new();
        assert_eq!(slot.stash("a"), None);
        assert_eq!(slot.stash("b"), Some("a"));
        assert_eq!(slot.peek(), Some(&"b"));
    }

    #[test]
    fn clear_discards() {
        let mut slot = UndoSlot::from_option(Some(3));
        assert!(!slot.is_empty());
        slot.clear();
        assert!(slot.is_empty());
        assert_eq!(slot.take(), None);
    }
}
