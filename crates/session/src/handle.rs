use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use folio_common::Anchor;

use crate::overlay::Overlay;

pub(crate) const STILL_LOADING: &str = "[INFO] The world is still loading, try again in a moment";

/// Anchor requests queued by external menus, applied at the next frame.
#[derive(Debug, Default)]
pub(crate) struct AnchorQueue {
    pub(crate) pending: VecDeque<Anchor>,
    /// Whether the active scene currently has anchors.
    pub(crate) supported: bool,
}

/// Named jump functions for external menu buttons.
///
/// Weak: once the session unmounts every call returns `false`.
#[derive(Debug, Clone)]
pub struct AnchorHandle {
    queue: Weak<RefCell<AnchorQueue>>,
}

impl AnchorHandle {
    pub(crate) fn new(queue: &Rc<RefCell<AnchorQueue>>) -> Self {
        Self {
            queue: Rc::downgrade(queue),
        }
    }

    pub fn is_live(&self) -> bool {
        self.queue.strong_count() > 0
    }

    /// Capability check for enabling menu affordances.
    pub fn supports_anchors(&self) -> bool {
        self.queue
            .upgrade()
            .is_some_and(|q| q.borrow().supported)
    }

    /// Queue a jump. Returns `false` when the session is gone or the active
    /// scene has no anchors.
    pub fn request(&self, anchor: Anchor) -> bool {
        let Some(queue) = self.queue.upgrade() else {
            return false;
        };
        let mut queue = queue.borrow_mut();
        if !queue.supported {
            return false;
        }
        queue.pending.push_back(anchor);
        true
    }

    pub fn go_intro(&self) -> bool {
        self.request(Anchor::Intro)
    }

    pub fn go_projects(&self) -> bool {
        self.request(Anchor::Projects)
    }

    pub fn go_career(&self) -> bool {
        self.request(Anchor::Career)
    }

    pub fn go_ai(&self) -> bool {
        self.request(Anchor::Ai)
    }
}

/// Menu-side guard: with no live handle yet, tell the user and return
/// `false` instead of failing.
pub fn request_anchor(handle: Option<&AnchorHandle>, anchor: Anchor, overlay: &mut Overlay) -> bool {
    match handle {
        Some(h) if h.is_live() => h.request(anchor),
        _ => {
            tracing::debug!(%anchor, "anchor requested before the world was ready");
            overlay.push_bubble(STILL_LOADING);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_handle_pushes_notice() {
        let mut overlay = Overlay::new(5);
        assert!(!request_anchor(None, Anchor::Career, &mut overlay));
        assert_eq!(overlay.bubbles().iter().next(), Some(STILL_LOADING));
    }

    #[test]
    fn handle_queues_only_when_supported() {
        let queue = Rc::new(RefCell::new(AnchorQueue::default()));
        let handle = AnchorHandle::new(&queue);
        assert!(!handle.go_projects());
        queue.borrow_mut().supported = true;
        assert!(handle.go_projects());
        assert!(handle.go_intro());
        assert_eq!(
            queue.borrow().pending.iter().copied().collect::<Vec<_>>(),
            [Anchor::Projects, Anchor::Intro]
        );
    }

    #[test]
    fn dead_handle_is_inert_and_guarded() {
        let queue = Rc::new(RefCell::new(AnchorQueue {
            supported: true,
            ..AnchorQueue::default()
        }));
        let handle = AnchorHandle::new(&queue);
        drop(queue);
        assert!(!handle.is_live());
        assert!(!handle.go_career());

        let mut overlay = Overlay::new(5);
        assert!(!request_anchor(Some(&handle), Anchor::Career, &mut overlay));
        assert_eq!(overlay.bubbles().len(), 1);
    }
}
