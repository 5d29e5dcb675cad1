use std::collections::BTreeMap;

/// Errors raised while building render resources.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("no 2D drawing context available for label {label:?}")]
    DrawingContextUnavailable { label: String },
}

/// Handle to a label surface owned by a [`LabelCanvas`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelId(pub u32);

/// Allocates text surfaces for in-world signage.
///
/// Scenes allocate while they are built and release everything they
/// allocated when disposed.
pub trait LabelCanvas {
    fn create_label(&mut self, text: &str) -> Result<LabelId, RenderError>;
    fn release(&mut self, id: LabelId);
    /// Surfaces allocated and not yet released.
    fn live(&self) -> usize;
}

/// Keeps label text in memory for hosts that paint text themselves
/// (egui overlays, the debug renderer).
#[derive(Debug, Default)]
pub struct MemoryCanvas {
    next: u32,
    labels: BTreeMap<LabelId, String>,
}

impl MemoryCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self, id: LabelId) -> Option<&str> {
        self.labels.get(&id).map(String::as_str)
    }
}

impl LabelCanvas for MemoryCanvas {
    fn create_label(&mut self, text: &str) -> Result<LabelId, RenderError> {
        let id = LabelId(self.next);
        self.next += 1;
        self.labels.insert(id, text.to_string());
        Ok(id)
    }

    fn release(&mut self, id: LabelId) {
        if self.labels.remove(&id).is_none() {
            tracing::warn!(?id, "released unknown label surface");
        }
    }

    fn live(&self) -> usize {
        self.labels.len()
    }
}

/// A runtime with no drawing context. Every allocation fails.
#[derive(Debug, Default)]
pub struct DisabledCanvas;

impl LabelCanvas for DisabledCanvas {
    fn create_label(&mut self, text: &str) -> Result<LabelId, RenderError> {
        Err(RenderError::DrawingContextUnavailable {
            label: text.to_string(),
        })
    }

    fn release(&mut self, _id: LabelId) {}

    fn live(&self) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_canvas_tracks_live_surfaces() {
        let mut canvas = MemoryCanvas::new();
        let a = canvas.create_label("Projekt 1").unwrap();
        let b = canvas.create_label("Heute Coaching").unwrap();
        assert_ne!(a, b);
        assert_eq!(canvas.live(), 2);
        assert_eq!(canvas.text(b), Some("Heute Coaching"));
        canvas.release(a);
        assert_eq!(canvas.live(), 1);
        assert_eq!(canvas.text(a), None);
    }

    #[test]
    fn disabled_canvas_is_a_hard_error() {
        let err = DisabledCanvas.create_label("Sign").unwrap_err();
        assert!(matches!(err, RenderError::DrawingContextUnavailable { .. }));
        assert!(err.to_string().contains("Sign"));
    }
}
