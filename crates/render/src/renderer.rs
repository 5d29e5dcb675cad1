use std::fmt::Write;

use folio_common::SceneKey;
use glam::Vec3;

use crate::camera::CameraPose;
use crate::label::LabelId;

/// One box-shaped piece of scene content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prop {
    pub position: Vec3,
    pub scale: Vec3,
    pub yaw: f32,
    pub color: [f32; 3],
    /// Added brightness; 0 is unlit, 1 fully self-lit.
    pub emissive: f32,
}

impl Prop {
    pub fn new(position: Vec3, scale: Vec3, color: [f32; 3]) -> Self {
        Self {
            position,
            scale,
            yaw: 0.0,
            color,
            emissive: 0.0,
        }
    }

    pub fn with_yaw(mut self, yaw: f32) -> Self {
        self.yaw = yaw;
        self
    }

    pub fn with_emissive(mut self, emissive: f32) -> Self {
        self.emissive = emissive;
        self
    }
}

/// A text label anchored in world space.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelView {
    pub surface: LabelId,
    pub position: Vec3,
    pub text: String,
    pub opacity: f32,
}

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameView {
    pub scene: SceneKey,
    pub camera: CameraPose,
    pub fov_degrees: f32,
    pub sky: [f32; 3],
    pub props: Vec<Prop>,
    pub labels: Vec<LabelView>,
    /// Teleport overlay opacity in `[0, 1]`.
    pub fade: f32,
}

impl FrameView {
    pub fn new(scene: SceneKey, camera: CameraPose, fov_degrees: f32) -> Self {
        Self {
            scene,
            camera,
            fov_degrees,
            sky: [0.55, 0.75, 0.95],
            props: Vec::new(),
            labels: Vec::new(),
            fade: 0.0,
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads a frame description and produces output. It never
/// mutates the simulation.
pub trait Renderer {
    type Output;

    fn render(&self, frame: &FrameView) -> Self::Output;
}

/// Text renderer for headless hosts and tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    /// Also list every prop, not just the count.
    pub verbose: bool,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verbose() -> Self {
        Self { verbose: true }
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, frame: &FrameView) -> String {
        let mut out = String::new();
        let e = frame.camera.eye;
        let t = frame.camera.target;
        // Writing to a String cannot fail.
        let _ = writeln!(out, "=== Frame (scene={}, fade={:.2}) ===", frame.scene, frame.fade);
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}",
            e.x, e.y, e.z, t.x, t.y, t.z, frame.fov_degrees
        );
        let _ = writeln!(out, "Props: {}", frame.props.len());
        if self.verbose {
            for p in &frame.props {
                let _ = writeln!(
                    out,
                    "  prop pos=({:.2}, {:.2}, {:.2}) emissive={:.2}",
                    p.position.x, p.position.y, p.position.z, p.emissive
                );
            }
        }
        for label in &frame.labels {
            let _ = writeln!(out, "  label {:?} opacity={:.2}", label.text, label.opacity);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> FrameView {
        FrameView::new(
            SceneKey::Hub,
            CameraPose::new(Vec3::new(0.0, 10.0, 10.0), Vec3::ZERO),
            55.0,
        )
    }

    #[test]
    fn empty_frame() {
        let out = DebugTextRenderer::new().render(&frame());
        assert!(out.contains("scene=hub"));
        assert!(out.contains("Props: 0"));
        assert!(out.contains("fov=55"));
    }

    #[test]
    fn props_and_labels() {
        let mut f = frame();
        f.fade = 0.5;
        f.props.push(Prop::new(Vec3::ONE, Vec3::ONE, [1.0, 0.0, 0.0]).with_emissive(0.8));
        f.labels.push(LabelView {
            surface: LabelId(0),
            position: Vec3::Y,
            text: "Projekt 1".into(),
            opacity: 0.75,
        });
        let out = DebugTextRenderer::verbose().render(&f);
        assert!(out.contains("fade=0.50"));
        assert!(out.contains("Props: 1"));
        assert!(out.contains("emissive=0.80"));
        assert!(out.contains("\"Projekt 1\" opacity=0.75"));
    }
}
