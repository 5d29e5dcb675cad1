use std::collections::VecDeque;

/// Bounded newest-first notification list.
#[derive(Debug, Clone)]
pub struct BubbleFeed {
    capacity: usize,
    items: VecDeque<String>,
}

impl BubbleFeed {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "bubble capacity must be positive");
        Self {
            capacity,
            items: VecDeque::with_capacity(capacity),
        }
    }

    /// Add a message; the oldest is dropped once over capacity.
    pub fn push(&mut self, text: impl Into<String>) {
        self.items.push_front(text.into());
        self.items.truncate(self.capacity);
    }

    /// Messages, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Display opacity for the message at `index` (0 is newest).
    pub fn opacity(index: usize) -> f32 {
        (0.94 - 0.12 * index as f32).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    /// Career proof panel.
    Career,
    Contact,
}

/// Channels the session writes and the host UI reads: HUD text, bubbles
/// and panel flags.
#[derive(Debug, Clone)]
pub struct Overlay {
    hud: String,
    bubbles: BubbleFeed,
    career_open: bool,
    contact_open: bool,
}

impl Overlay {
    pub fn new(bubble_capacity: usize) -> Self {
        Self {
            hud: String::new(),
            bubbles: BubbleFeed::new(bubble_capacity),
            career_open: false,
            contact_open: false,
        }
    }

    pub fn hud(&self) -> &str {
        &self.hud
    }

    /// Replace the HUD text wholesale.
    pub fn set_hud(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.hud {
            tracing::debug!(hud = %text, "hud changed");
            self.hud = text;
        }
    }

    pub fn push_bubble(&mut self, text: impl Into<String>) {
        self.bubbles.push(text);
    }

    pub fn bubbles(&self) -> &BubbleFeed {
        &self.bubbles
    }

    pub fn is_open(&self, panel: Panel) -> bool {
        match panel {
            Panel::Career => self.career_open,
            Panel::Contact => self.contact_open,
        }
    }

    pub fn raise(&mut self, panel: Panel) {
        self.set_panel(panel, true);
    }

    /// Called by the panel itself when the user closes it.
    pub fn clear(&mut self, panel: Panel) {
        self.set_panel(panel, false);
    }

    fn set_panel(&mut self, panel: Panel, open: bool) {
        match panel {
            Panel::Career => self.career_open = open,
            Panel::Contact => self.contact_open = open,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seven_pushes_keep_newest_five() {
        let mut feed = BubbleFeed::new(5);
        for i in 1..=7 {
            feed.push(format!("m{i}"));
        }
        let items: Vec<_> = feed.iter().collect();
        assert_eq!(items, ["m7", "m6", "m5", "m4", "m3"]);
    }

    #[test]
    fn opacity_fades_with_age() {
        assert!((BubbleFeed::opacity(0) - 0.94).abs() < 1e-6);
        assert!((BubbleFeed::opacity(4) - 0.46).abs() < 1e-6);
        assert_eq!(BubbleFeed::opacity(20), 0.0);
    }

    #[test]
    fn panels_raise_and_clear_independently() {
        let mut overlay = Overlay::new(5);
        overlay.raise(Panel::Career);
        assert!(overlay.is_open(Panel::Career));
        assert!(!overlay.is_open(Panel::Contact));
        overlay.clear(Panel::Career);
        assert!(!overlay.is_open(Panel::Career));
    }

    #[test]
    fn hud_is_replaced_wholesale() {
        let mut overlay = Overlay::new(5);
        overlay.set_hud("first");
        overlay.set_hud("second");
        assert_eq!(overlay.hud(), "second");
    }
}
