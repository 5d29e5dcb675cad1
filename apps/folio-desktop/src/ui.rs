use std::collections::BTreeMap;

use egui::{Align2, Color32, FontId, RichText};
use folio_common::Anchor;
use folio_input::InputHandle;
use folio_input::keys::{KEY_A, KEY_D, KEY_S, KEY_W};
use folio_render::FrameView;
use folio_render_wgpu::project_to_screen;
use folio_session::{AnchorHandle, BubbleFeed, Overlay, Panel, Session, request_anchor};
use folio_tools::SessionInspector;
use glam::Mat4;

const MENU: [(&str, Anchor); 4] = [
    ("Start", Anchor::Intro),
    ("Projects", Anchor::Projects),
    ("Career", Anchor::Career),
    ("AI gate", Anchor::Ai),
];

/// On-screen W/A/S/D buttons feeding virtual keys while held.
#[derive(Debug, Default)]
pub struct TouchPad {
    held: BTreeMap<&'static str, bool>,
}

impl TouchPad {
    fn button(&mut self, ui: &mut egui::Ui, label: &str, code: &'static str, input: Option<&InputHandle>) {
        let response = ui.add(egui::Button::new(label).min_size(egui::vec2(44.0, 44.0)));
        let down = response.is_pointer_button_down_on();
        let was = self.held.insert(code, down).unwrap_or(false);
        if down != was {
            if let Some(input) = input {
                input.set_virtual(code, down);
            }
        }
    }

    fn show(&mut self, ctx: &egui::Context, input: Option<&InputHandle>) {
        egui::Area::new(egui::Id::new("touch_pad"))
            .anchor(Align2::LEFT_BOTTOM, [16.0, -16.0])
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.add_space(48.0);
                    self.button(ui, "W", KEY_W, input);
                });
                ui.horizontal(|ui| {
                    self.button(ui, "A", KEY_A, input);
                    self.button(ui, "S", KEY_S, input);
                    self.button(ui, "D", KEY_D, input);
                });
            });
    }
}

/// Everything the overlay draws besides the 3D frame.
pub struct OverlayUi<'a> {
    pub overlay: &'a mut Overlay,
    pub session: Option<&'a mut Session>,
    pub anchors: Option<&'a AnchorHandle>,
    pub frame: Option<&'a FrameView>,
    pub view_proj: Mat4,
    pub size_px: [u32; 2],
}

impl OverlayUi<'_> {
    pub fn draw(self, ctx: &egui::Context, touch: &mut TouchPad) {
        let OverlayUi {
            overlay,
            mut session,
            anchors,
            frame,
            view_proj,
            size_px,
        } = self;

        if let Some(frame) = frame {
            draw_labels(ctx, frame, view_proj, size_px);
        }

        egui::TopBottomPanel::top("hud").show(ctx, |ui| {
            ui.horizontal(|ui| {
                for (label, anchor) in MENU {
                    let enabled = anchors.is_none_or(AnchorHandle::supports_anchors);
                    if ui.add_enabled(enabled, egui::Button::new(label)).clicked() {
                        request_anchor(anchors, anchor, overlay);
                    }
                }
                ui.separator();
                if ui.button("Contact").clicked() {
                    overlay.raise(Panel::Contact);
                }
                if let Some(session) = session.as_deref_mut() {
                    let audio = session.audio_mut();
                    let label = if audio.is_muted() { "Sound on" } else { "Sound off" };
                    if ui.button(label).clicked() {
                        let muted = audio.is_muted();
                        audio.set_muted(!muted);
                    }
                }
            });
            ui.label(RichText::new(overlay.hud()).strong());
        });

        egui::Area::new(egui::Id::new("bubbles"))
            .anchor(Align2::RIGHT_TOP, [-16.0, 72.0])
            .show(ctx, |ui| {
                for (i, text) in overlay.bubbles().iter().enumerate() {
                    let alpha = (BubbleFeed::opacity(i) * 255.0) as u8;
                    egui::Frame::popup(ui.style())
                        .fill(Color32::from_black_alpha(alpha / 2))
                        .show(ui, |ui| {
                            ui.label(RichText::new(text).color(Color32::from_white_alpha(alpha)));
                        });
                }
            });

        let mut career = overlay.is_open(Panel::Career);
        egui::Window::new("Career proof")
            .open(&mut career)
            .show(ctx, |ui| {
                ui.label("Roles, references and certificates from 2015 to today.");
            });
        if !career {
            overlay.clear(Panel::Career);
        }

        let mut contact = overlay.is_open(Panel::Contact);
        egui::Window::new("Contact")
            .open(&mut contact)
            .show(ctx, |ui| {
                ui.label("Write a message and I will get back to you.");
            });
        if !contact {
            overlay.clear(Panel::Contact);
        }

        let input = session.as_deref().map(Session::input_handle);
        touch.show(ctx, input.as_ref());
    }
}

/// Debug window. Must not run while the overlay is borrowed.
pub fn draw_inspector(ctx: &egui::Context, session: &Session) {
    egui::Window::new("Inspector")
        .default_pos([16.0, 120.0])
        .show(ctx, |ui| {
            ui.label(SessionInspector::summary(session).to_string());
            ui.label(SessionInspector::player(session).to_string());
        });
}

fn draw_labels(ctx: &egui::Context, frame: &FrameView, view_proj: Mat4, size_px: [u32; 2]) {
    let painter = ctx.layer_painter(egui::LayerId::background());
    let ppp = ctx.pixels_per_point();
    let visibility = 1.0 - frame.fade;
    for label in &frame.labels {
        let Some(px) = project_to_screen(view_proj, label.position, size_px[0], size_px[1]) else {
            continue;
        };
        let alpha = (label.opacity * visibility * 255.0).clamp(0.0, 255.0) as u8;
        painter.text(
            egui::pos2(px.x / ppp, px.y / ppp),
            Align2::CENTER_CENTER,
            &label.text,
            FontId::proportional(15.0),
            Color32::from_white_alpha(alpha),
        );
    }
}
