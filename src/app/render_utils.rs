use collab_graph::encoding::kind_color;
use collab_graph::network::NodeKind;
use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

/// Maps layout coordinates onto the canvas. `origin` is the layout point
/// shown at the middle of `rect` before panning.
#[derive(Clone, Copy)]
pub(super) struct Viewport {
    pub(super) rect: Rect,
    pub(super) pan: Vec2,
    pub(super) zoom: f32,
    pub(super) origin: Vec2,
}

impl Viewport {
    pub(super) fn to_screen(self, world: Vec2) -> Pos2 {
        self.rect.center() + self.pan + (world - self.origin) * self.zoom
    }

    pub(super) fn to_world(self, screen: Pos2) -> Vec2 {
        (screen - self.rect.center() - self.pan) / self.zoom + self.origin
    }
}

pub(super) fn node_color(kind: NodeKind) -> Color32 {
    let [r, g, b] = kind_color(kind);
    Color32::from_rgb(r, g, b)
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let mix = |from: u8, to: u8| (from as f32 + (to as f32 - from as f32) * amount) as u8;

    Color32::from_rgba_unmultiplied(
        mix(base.r(), overlay.r()),
        mix(base.g(), overlay.g()),
        mix(base.b(), overlay.b()),
        mix(base.a(), overlay.a()),
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + factor * 0.55)) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, viewport: Viewport) {
    let rect = viewport.rect;
    painter.rect_filled(rect, 0.0, Color32::from_rgb(248, 250, 252));

    let step = (48.0 * viewport.zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = viewport.to_screen(Vec2::ZERO);
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(148, 163, 184, 40));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

/// Cheap bounding-box test; a segment crossing a corner may be kept.
pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let min_x = start.x.min(end.x) - padding;
    let max_x = start.x.max(end.x) + padding;
    let min_y = start.y.min(end.y) - padding;
    let max_y = start.y.max(end.y) + padding;

    !(max_x < rect.left() || min_x > rect.right() || max_y < rect.top() || min_y > rect.bottom())
}
