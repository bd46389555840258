//! The drawing surface: consumes overlay notifications and captures strokes
//! from pointer input. It keeps its own canvas, so strokes survive any number
//! of hide/show cycles of the window.

pub mod history;
pub mod model;
pub mod render;

use crate::command::Rgb;
use crate::overlay::messages::{SurfaceMessage, SurfaceRequest};
use crate::overlay::window::{PointerEvent, PointerSample};
use history::DrawHistory;
use model::{CanvasModel, Stroke, StrokeStyle};
use std::sync::mpsc::{Receiver, Sender, TryRecvError};

const MIN_POINT_DIST_SQ: i64 = 9;

/// What the window bitmap is missing since the last render.
#[derive(Debug, Clone, PartialEq)]
enum Damage {
    Clean,
    Full,
    /// Pieces of the stroke in progress, drawn over the existing bitmap.
    Fragments(Vec<Stroke>),
}

impl Damage {
    fn add(&mut self, fragment: Stroke) {
        match self {
            Damage::Clean => *self = Damage::Fragments(vec![fragment]),
            Damage::Fragments(fragments) => fragments.push(fragment),
            Damage::Full => {}
        }
    }
}

pub struct DrawingSurface {
    message_rx: Receiver<SurfaceMessage>,
    request_tx: Sender<SurfaceRequest>,
    style: StrokeStyle,
    click_through: bool,
    active: Option<Stroke>,
    history: DrawHistory,
    damage: Damage,
}

impl DrawingSurface {
    pub fn new(
        message_rx: Receiver<SurfaceMessage>,
        request_tx: Sender<SurfaceRequest>,
        style: StrokeStyle,
        max_undo: usize,
    ) -> Self {
        Self {
            message_rx,
            request_tx,
            style,
            click_through: false,
            active: None,
            history: DrawHistory::with_max_depth(max_undo),
            damage: Damage::Full,
        }
    }

    pub fn style(&self) -> StrokeStyle {
        self.style
    }

    pub fn is_click_through(&self) -> bool {
        self.click_through
    }

    pub fn history(&self) -> &DrawHistory {
        &self.history
    }

    pub fn canvas(&self) -> &CanvasModel {
        self.history.canvas()
    }

    /// Handles every queued message in arrival order.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        loop {
            match self.message_rx.try_recv() {
                Ok(message) => {
                    self.handle(message);
                    handled += 1;
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        handled
    }

    pub fn handle(&mut self, message: SurfaceMessage) {
        tracing::debug!(%message, "drawing surface message");
        match message {
            SurfaceMessage::ClearCanvas => {
                let dropped = self.active.take().is_some();
                if self.history.clear() || dropped {
                    self.damage = Damage::Full;
                }
            }
            SurfaceMessage::SetColor(hex) => match Rgb::from_hex(&hex) {
                Some(color) => self.style.color = color,
                None => tracing::warn!(%hex, "ignoring malformed pen colour"),
            },
            SurfaceMessage::SetSize(px) => {
                if px == 0 {
                    tracing::warn!("ignoring zero brush size");
                } else {
                    self.style.width = px;
                }
            }
            // The resulting mode follows in `SetClickThrough`.
            SurfaceMessage::ToggleClickThrough => {}
            SurfaceMessage::SetClickThrough(on) => {
                self.click_through = on;
                if on && self.active.take().is_some() {
                    self.damage = Damage::Full;
                }
            }
            SurfaceMessage::Undo => {
                if self.history.undo() {
                    self.damage = Damage::Full;
                }
            }
            SurfaceMessage::Redo => {
                if self.history.redo() {
                    self.damage = Damage::Full;
                }
            }
        }
    }

    /// UI-initiated click-through change, independent of the global hotkey.
    /// The local mode changes once the controller answers with `SetClickThrough`.
    pub fn request_click_through(&mut self, enable: bool) {
        if self
            .request_tx
            .send(SurfaceRequest::SetClickThrough(enable))
            .is_err()
        {
            tracing::debug!("overlay request channel closed");
        }
    }

    /// Feeds one pointer sample. Ignored entirely while in click-through mode.
    pub fn pointer(&mut self, sample: PointerSample) {
        if self.click_through {
            return;
        }
        match sample.event {
            PointerEvent::Down => {
                if self.active.is_some() {
                    self.damage = Damage::Full;
                }
                let stroke = Stroke {
                    style: self.style,
                    points: vec![sample.point],
                };
                self.damage.add(stroke.clone());
                self.active = Some(stroke);
            }
            PointerEvent::Move => {
                if let Some(stroke) = self.active.as_mut() {
                    let last = stroke.points.last().copied();
                    if should_append_point(last, sample.point) {
                        stroke.points.push(sample.point);
                        self.damage.add(segment(stroke.style, last, sample.point));
                    }
                }
            }
            PointerEvent::Up => {
                if let Some(mut stroke) = self.active.take() {
                    let last = stroke.points.last().copied();
                    if last != Some(sample.point) {
                        stroke.points.push(sample.point);
                        self.damage.add(segment(stroke.style, last, sample.point));
                    }
                    self.history.commit(stroke);
                }
            }
        }
    }

    /// Whether the window bitmap is behind the canvas.
    pub fn has_damage(&self) -> bool {
        self.damage != Damage::Clean
    }

    /// Brings a bitmap last written by this surface up to date. Only the new
    /// pieces of the stroke in progress are drawn unless something was removed.
    pub fn render_damage(&mut self, pixels: &mut [u8], width: u32, height: u32) {
        match std::mem::replace(&mut self.damage, Damage::Clean) {
            Damage::Clean => {}
            Damage::Full => self.render_into(pixels, width, height),
            Damage::Fragments(fragments) => {
                for fragment in &fragments {
                    render::draw_stroke(fragment, pixels, width, height);
                }
            }
        }
    }

    /// Committed strokes plus the stroke in progress.
    pub fn render_into(&self, pixels: &mut [u8], width: u32, height: u32) {
        render::render_canvas_to_bgra(self.history.canvas(), pixels, width, height);
        if let Some(active) = &self.active {
            render::draw_stroke(active, pixels, width, height);
        }
    }
}

fn segment(style: StrokeStyle, from: Option<(i32, i32)>, to: (i32, i32)) -> Stroke {
    Stroke {
        style,
        points: from.into_iter().chain([to]).collect(),
    }
}

fn should_append_point(last: Option<(i32, i32)>, point: (i32, i32)) -> bool {
    let Some((last_x, last_y)) = last else {
        return true;
    };

    let dx = point.0 as i64 - last_x as i64;
    let dy = point.1 as i64 - last_y as i64;
    dx * dx + dy * dy >= MIN_POINT_DIST_SQ
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::messages::surface_channels;

    fn surface() -> (DrawingSurface, Sender<SurfaceMessage>, Receiver<SurfaceRequest>) {
        let channels = surface_channels();
        let surface = DrawingSurface::new(
            channels.message_rx,
            channels.request_tx,
            StrokeStyle::default(),
            history::DEFAULT_MAX_UNDO,
        );
        (surface, channels.message_tx, channels.request_rx)
    }

    fn sample(point: (i32, i32), event: PointerEvent) -> PointerSample {
        PointerSample { point, event }
    }

    fn draw_line(surface: &mut DrawingSurface, from: (i32, i32), to: (i32, i32)) {
        surface.pointer(sample(from, PointerEvent::Down));
        surface.pointer(sample(to, PointerEvent::Move));
        surface.pointer(sample(to, PointerEvent::Up));
    }

    #[test]
    fn pointer_sequence_commits_one_stroke_with_current_style() {
        let (mut surface, tx, _rx) = surface();
        tx.send(SurfaceMessage::SetColor("#0000ff".into())).unwrap();
        tx.send(SurfaceMessage::SetSize(16)).unwrap();
        assert_eq!(surface.pump(), 2);

        draw_line(&mut surface, (10, 10), (40, 40));
        let strokes = &surface.canvas().strokes;
        assert_eq!(strokes.len(), 1);
        assert_eq!(strokes[0].style.color, Rgb::BLUE);
        assert_eq!(strokes[0].style.width, 16);
        assert_eq!(strokes[0].points, vec![(10, 10), (40, 40)]);
    }

    #[test]
    fn nearby_moves_are_decimated() {
        let (mut surface, _tx, _rx) = surface();
        surface.pointer(sample((0, 0), PointerEvent::Down));
        surface.pointer(sample((1, 1), PointerEvent::Move));
        surface.pointer(sample((2, 2), PointerEvent::Move));
        surface.pointer(sample((5, 5), PointerEvent::Move));
        surface.pointer(sample((6, 5), PointerEvent::Move));
        surface.pointer(sample((5, 5), PointerEvent::Up));
        assert_eq!(surface.canvas().strokes[0].points, vec![(0, 0), (5, 5)]);
    }

    #[test]
    fn click_through_ignores_pointer_and_drops_stroke_in_progress() {
        let (mut surface, tx, _rx) = surface();
        surface.pointer(sample((0, 0), PointerEvent::Down));
        tx.send(SurfaceMessage::ToggleClickThrough).unwrap();
        surface.pump();
        assert!(!surface.is_click_through());
        tx.send(SurfaceMessage::SetClickThrough(true)).unwrap();
        surface.pump();
        assert!(surface.is_click_through());

        surface.pointer(sample((50, 50), PointerEvent::Up));
        draw_line(&mut surface, (1, 1), (30, 30));
        assert!(surface.canvas().is_empty());
    }

    #[test]
    fn undo_redo_and_clear_follow_message_order() {
        let (mut surface, tx, _rx) = surface();
        draw_line(&mut surface, (0, 0), (10, 10));
        draw_line(&mut surface, (20, 20), (30, 30));

        tx.send(SurfaceMessage::Undo).unwrap();
        tx.send(SurfaceMessage::ClearCanvas).unwrap();
        tx.send(SurfaceMessage::Undo).unwrap();
        tx.send(SurfaceMessage::Redo).unwrap();
        tx.send(SurfaceMessage::Undo).unwrap();
        surface.pump();

        assert_eq!(surface.canvas().strokes.len(), 1);
        assert_eq!(surface.canvas().strokes[0].points, vec![(0, 0), (10, 10)]);
    }

    #[test]
    fn malformed_color_and_zero_size_are_ignored() {
        let (mut surface, tx, _rx) = surface();
        tx.send(SurfaceMessage::SetColor("red".into())).unwrap();
        tx.send(SurfaceMessage::SetSize(0)).unwrap();
        surface.pump();
        assert_eq!(surface.style(), StrokeStyle::default());
    }

    #[test]
    fn ui_click_through_request_waits_for_the_controller() {
        let (mut surface, tx, rx) = surface();
        surface.request_click_through(true);
        assert_eq!(rx.try_recv().unwrap(), SurfaceRequest::SetClickThrough(true));
        assert!(!surface.is_click_through());

        tx.send(SurfaceMessage::SetClickThrough(true)).unwrap();
        surface.pump();
        assert!(surface.is_click_through());
    }

    const W: u32 = 64;
    const H: u32 = 64;

    fn pixel(pixels: &[u8], x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * W + x) * 4) as usize;
        [pixels[idx], pixels[idx + 1], pixels[idx + 2], pixels[idx + 3]]
    }

    #[test]
    fn damage_is_consumed_by_rendering() {
        let (mut surface, _tx, _rx) = surface();
        let mut pixels = vec![0u8; (W * H * 4) as usize];
        assert!(surface.has_damage());
        surface.render_damage(&mut pixels, W, H);
        assert!(!surface.has_damage());
        assert_eq!(pixel(&pixels, 0, 0), [255, 0, 255, 255]);

        draw_line(&mut surface, (0, 0), (10, 10));
        assert!(surface.has_damage());
        surface.render_damage(&mut pixels, W, H);
        assert!(!surface.has_damage());
    }

    #[test]
    fn stroke_in_progress_is_drawn_over_the_existing_bitmap() {
        let (mut surface, _tx, _rx) = surface();
        let mut pixels = vec![0u8; (W * H * 4) as usize];
        surface.render_damage(&mut pixels, W, H);
        let marker = [1, 2, 3, 255];
        let idx = ((60 * W + 60) * 4) as usize;
        pixels[idx..idx + 4].copy_from_slice(&marker);

        surface.pointer(sample((10, 10), PointerEvent::Down));
        surface.pointer(sample((30, 10), PointerEvent::Move));
        surface.render_damage(&mut pixels, W, H);
        assert_eq!(pixel(&pixels, 20, 10), [0, 0, 255, 255]);
        assert_eq!(pixel(&pixels, 60, 60), marker);

        surface.pointer(sample((30, 30), PointerEvent::Up));
        surface.render_damage(&mut pixels, W, H);
        assert_eq!(pixel(&pixels, 30, 20), [0, 0, 255, 255]);
        assert_eq!(pixel(&pixels, 60, 60), marker);
    }

    #[test]
    fn removing_strokes_repaints_the_whole_bitmap() {
        let (mut surface, tx, _rx) = surface();
        let mut pixels = vec![0u8; (W * H * 4) as usize];
        draw_line(&mut surface, (10, 10), (30, 10));
        surface.render_damage(&mut pixels, W, H);
        assert_eq!(pixel(&pixels, 20, 10), [0, 0, 255, 255]);

        tx.send(SurfaceMessage::Undo).unwrap();
        surface.pump();
        surface.render_damage(&mut pixels, W, H);
        assert_eq!(pixel(&pixels, 20, 10), [255, 0, 255, 255]);
    }

    #[test]
    fn incremental_and_full_renders_agree() {
        let (mut surface, _tx, _rx) = surface();
        let mut incremental = vec![0u8; (W * H * 4) as usize];
        surface.render_damage(&mut incremental, W, H);
        surface.pointer(sample((5, 5), PointerEvent::Down));
        for point in [(12, 9), (20, 30), (40, 31)] {
            surface.pointer(sample(point, PointerEvent::Move));
            surface.render_damage(&mut incremental, W, H);
        }
        surface.pointer(sample((50, 50), PointerEvent::Up));
        surface.render_damage(&mut incremental, W, H);

        let mut full = vec![0u8; (W * H * 4) as usize];
        surface.render_into(&mut full, W, H);
        assert_eq!(incremental, full);
    }
}
