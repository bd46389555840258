use crate::surface::model::{CanvasModel, Color, Stroke};

/// Background colour the layered window keys out as fully transparent.
pub const TRANSPARENCY_COLORKEY: Color = Color::rgba(255, 0, 255, 255);

/// Rasterises `canvas` into a top-down BGRA bitmap, keying the background out.
pub fn render_canvas_to_bgra(canvas: &CanvasModel, pixels: &mut [u8], width: u32, height: u32) {
    clear_bgra(pixels, TRANSPARENCY_COLORKEY);
    for stroke in &canvas.strokes {
        draw_stroke(stroke, pixels, width, height);
    }
}

fn clear_bgra(pixels: &mut [u8], color: Color) {
    for px in pixels.chunks_exact_mut(4) {
        px[0] = color.b;
        px[1] = color.g;
        px[2] = color.r;
        px[3] = color.a;
    }
}

pub fn draw_stroke(stroke: &Stroke, pixels: &mut [u8], width: u32, height: u32) {
    let color = Color::from(stroke.style.color);
    let stroke_width = stroke.style.width.max(1);
    match stroke.points.as_slice() {
        [] => {}
        [single] => draw_brush(*single, color, stroke_width, pixels, width, height),
        points => {
            for segment in points.windows(2) {
                draw_segment(segment[0], segment[1], color, stroke_width, pixels, width, height);
            }
        }
    }
}

/// Stamps the round brush along the segment at one-pixel steps.
fn draw_segment(
    start: (i32, i32),
    end: (i32, i32),
    color: Color,
    stroke_width: u32,
    pixels: &mut [u8],
    width: u32,
    height: u32,
) {
    let dx = end.0 - start.0;
    let dy = end.1 - start.1;
    let steps = dx.abs().max(dy.abs()).max(1);
    for step in 0..=steps {
        let t = step as f32 / steps as f32;
        let x = start.0 as f32 + dx as f32 * t;
        let y = start.1 as f32 + dy as f32 * t;
        draw_brush(
            (x.round() as i32, y.round() as i32),
            color,
            stroke_width,
            pixels,
            width,
            height,
        );
    }
}

/// Stamps a disc exactly `stroke_width` pixels across. Odd widths centre on
/// the pixel; even widths centre on its top-left corner.
fn draw_brush(
    center: (i32, i32),
    color: Color,
    stroke_width: u32,
    pixels: &mut [u8],
    width: u32,
    height: u32,
) {
    let diameter = stroke_width.max(1) as i32;
    let parity = (diameter + 1) % 2;
    let limit = diameter * diameter;
    for dy in -(diameter / 2)..=(diameter - 1) / 2 {
        for dx in -(diameter / 2)..=(diameter - 1) / 2 {
            // Offsets doubled so even widths measure from the pixel corner.
            let ex = 2 * dx + parity;
            let ey = 2 * dy + parity;
            if ex * ex + ey * ey <= limit {
                set_pixel_bgra(pixels, width, height, center.0 + dx, center.1 + dy, color);
            }
        }
    }
}

fn set_pixel_bgra(pixels: &mut [u8], width: u32, height: u32, x: i32, y: i32, color: Color) {
    if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
        return;
    }
    let idx = ((y as usize) * (width as usize) + x as usize) * 4;
    if idx + 3 >= pixels.len() {
        return;
    }
    pixels[idx] = color.b;
    pixels[idx + 1] = color.g;
    pixels[idx + 2] = color.r;
    pixels[idx + 3] = color.a;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Rgb;
    use crate::surface::model::StrokeStyle;

    fn pixel(pixels: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * width + x) * 4) as usize;
        [pixels[idx], pixels[idx + 1], pixels[idx + 2], pixels[idx + 3]]
    }

    #[test]
    fn empty_canvas_is_entirely_colorkey() {
        let mut pixels = vec![0u8; 4 * 4 * 4];
        render_canvas_to_bgra(&CanvasModel::default(), &mut pixels, 4, 4);
        for px in pixels.chunks_exact(4) {
            assert_eq!(px, [255, 0, 255, 255]);
        }
    }

    #[test]
    fn stroke_pixels_are_written_in_bgra_order() {
        let canvas = CanvasModel {
            strokes: vec![Stroke {
                style: StrokeStyle {
                    width: 1,
                    color: Rgb::BLUE,
                },
                points: vec![(0, 1), (7, 1)],
            }],
        };
        let mut pixels = vec![0u8; 8 * 3 * 4];
        render_canvas_to_bgra(&canvas, &mut pixels, 8, 3);

        for x in 0..8 {
            assert_eq!(pixel(&pixels, 8, x, 1), [255, 0, 0, 255]);
        }
        assert_eq!(pixel(&pixels, 8, 3, 0), [255, 0, 255, 255]);
    }

    #[test]
    fn wide_brush_covers_a_disc_and_clips_at_edges() {
        let canvas = CanvasModel {
            strokes: vec![Stroke {
                style: StrokeStyle {
                    width: 5,
                    color: Rgb::GREEN,
                },
                points: vec![(0, 0)],
            }],
        };
        let mut pixels = vec![0u8; 6 * 6 * 4];
        render_canvas_to_bgra(&canvas, &mut pixels, 6, 6);

        assert_eq!(pixel(&pixels, 6, 0, 0), [0, 255, 0, 255]);
        assert_eq!(pixel(&pixels, 6, 2, 0), [0, 255, 0, 255]);
        assert_eq!(pixel(&pixels, 6, 2, 2), [255, 0, 255, 255]);
    }

    fn painted_run(width: u32, brush: u32, center: (i32, i32)) -> (usize, usize) {
        let canvas = CanvasModel {
            strokes: vec![Stroke {
                style: StrokeStyle {
                    width: brush,
                    color: Rgb::WHITE,
                },
                points: vec![center],
            }],
        };
        let mut pixels = vec![0u8; (width * width * 4) as usize];
        render_canvas_to_bgra(&canvas, &mut pixels, width, width);
        let white = [255, 255, 255, 255];
        let across = (0..width)
            .filter(|&x| pixel(&pixels, width, x, center.1 as u32) == white)
            .count();
        let down = (0..width)
            .filter(|&y| pixel(&pixels, width, center.0 as u32, y) == white)
            .count();
        (across, down)
    }

    #[test]
    fn brush_footprint_matches_the_requested_width() {
        for brush in 1..=17 {
            let (across, down) = painted_run(48, brush, (24, 24));
            assert_eq!(across, brush as usize, "width {brush} across");
            assert_eq!(down, brush as usize, "width {brush} down");
        }
    }

    #[test]
    fn small_and_large_presets_paint_their_full_diameter() {
        use crate::command::{LARGE_BRUSH, SMALL_BRUSH};
        assert_eq!(painted_run(32, SMALL_BRUSH, (10, 10)), (4, 4));
        assert_eq!(painted_run(40, LARGE_BRUSH, (20, 20)), (16, 16));
    }
}
