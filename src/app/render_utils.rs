use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

/// Group palette; ids past the end wrap around. Purely cosmetic.
const GROUP_PALETTE: [Color32; 10] = [
    Color32::from_rgb(102, 166, 215),
    Color32::from_rgb(235, 146, 94),
    Color32::from_rgb(124, 197, 118),
    Color32::from_rgb(214, 123, 196),
    Color32::from_rgb(230, 196, 92),
    Color32::from_rgb(108, 203, 196),
    Color32::from_rgb(196, 134, 240),
    Color32::from_rgb(162, 191, 89),
    Color32::from_rgb(240, 120, 130),
    Color32::from_rgb(142, 158, 220),
];

pub(super) fn group_color(group: usize) -> Color32 {
    GROUP_PALETTE[group % GROUP_PALETTE.len()]
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;
    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(20, 23, 30));
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

fn normalize_log(value: u64, min: u64, max: u64) -> f32 {
    let min = min.max(1) as f64;
    let max = (max as f64).max(min);
    let value = (value.max(1) as f64).clamp(min, max);

    let denominator = max.ln() - min.ln();
    if denominator.abs() < f64::EPSILON {
        return 0.5;
    }
    ((value.ln() - min.ln()) / denominator).clamp(0.0, 1.0) as f32
}

pub(super) fn node_radius(importance: u64, min: u64, max: u64) -> f32 {
    6.0 + (normalize_log(importance, min, max) * 22.0)
}

pub(super) fn node_charge(importance: u64, min: u64, max: u64) -> f32 {
    1.0 + (normalize_log(importance, min, max) * 2.5)
}

/// Samples a cubic bezier whose inner control points are the two region
/// centers, so every edge between the same pair of regions shares a spine.
pub(super) fn bundled_curve(
    start: Pos2,
    control_a: Pos2,
    control_b: Pos2,
    end: Pos2,
    segments: usize,
) -> Vec<Pos2> {
    let segments = segments.max(2);
    (0..=segments)
        .map(|step| {
            let t = step as f32 / segments as f32;
            let u = 1.0 - t;
            let w0 = u * u * u;
            let w1 = 3.0 * u * u * t;
            let w2 = 3.0 * u * t * t;
            let w3 = t * t * t;
            Pos2::new(
                w0 * start.x + w1 * control_a.x + w2 * control_b.x + w3 * end.x,
                w0 * start.y + w1 * control_a.y + w2 * control_b.y + w3 * end.y,
            )
        })
        .collect()
}

pub(super) fn draw_polyline(painter: &Painter, points: &[Pos2], stroke: Stroke) {
    for pair in points.windows(2) {
        painter.line_segment([pair[0], pair[1]], stroke);
    }
}

pub(super) fn distance_sq_to_segment(point: Pos2, start: Pos2, end: Pos2) -> f32 {
    let segment = end - start;
    let length_sq = segment.length_sq();
    if length_sq <= f32::EPSILON {
        return (point - start).length_sq();
    }
    let t = ((point - start).dot(segment) / length_sq).clamp(0.0, 1.0);
    let closest = start + segment * t;
    (point - closest).length_sq()
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::{pos2, vec2};

    #[test]
    fn transforms_round_trip() {
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0));
        let pan = vec2(40.0, -12.0);
        let zoom = 1.7;
        let world = vec2(120.0, -60.0);

        let screen = world_to_screen(rect, pan, zoom, world);
        let back = screen_to_world(rect, pan, zoom, screen);
        assert!((back - world).length() < 0.001);
    }

    #[test]
    fn palette_wraps_instead_of_panicking() {
        assert_eq!(group_color(3), group_color(3 + GROUP_PALETTE.len()));
    }

    #[test]
    fn bundled_curve_hits_its_endpoints() {
        let points = bundled_curve(
            pos2(0.0, 0.0),
            pos2(50.0, 100.0),
            pos2(150.0, 100.0),
            pos2(200.0, 0.0),
            16,
        );
        assert_eq!(points.first().copied(), Some(pos2(0.0, 0.0)));
        assert_eq!(points.last().copied(), Some(pos2(200.0, 0.0)));
        // The spine pulls the midpoint toward the controls.
        assert!(points[8].y > 40.0);
    }

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let start = pos2(0.0, 0.0);
        let end = pos2(10.0, 0.0);
        assert!(distance_sq_to_segment(pos2(5.0, 3.0), start, end) - 9.0 < 0.001);
        assert!(distance_sq_to_segment(pos2(-4.0, 0.0), start, end) - 16.0 < 0.001);
    }
}
