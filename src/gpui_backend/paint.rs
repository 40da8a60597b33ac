use gpui::{
    App, BorderStyle, Bounds, Corners, Edges, PathBuilder, Pixels, Point, TextRun, Window, font,
    point, px, quad,
};

use crate::geom::{ScreenPoint, ScreenRect};
use crate::render::RenderCommand;
use crate::style::Color;
use crate::text::Texture;

use super::window::FrameSnapshot;

pub(crate) fn paint_frame(
    frame: &FrameSnapshot,
    bounds: Bounds<Pixels>,
    window: &mut Window,
    cx: &mut App,
) {
    let origin = bounds.origin;
    if let Some(color) = frame.background {
        fill(window, bounds, color);
    }
    for command in frame.commands.commands() {
        match command {
            RenderCommand::Clear(color) => fill(window, bounds, *color),
            RenderCommand::FillRect { rect, color } => {
                fill(window, to_bounds(*rect, origin), *color);
            }
            RenderCommand::Polyline { points, color } => {
                paint_polyline(window, points, origin, *color);
            }
            RenderCommand::Texture { texture, dest } => {
                paint_label(window, cx, texture, *dest, origin);
            }
        }
    }
}

fn fill(window: &mut Window, bounds: Bounds<Pixels>, color: Color) {
    window.paint_quad(quad(
        bounds,
        Corners::all(px(0.0)),
        to_rgba(color),
        Edges::all(px(0.0)),
        to_rgba(color),
        BorderStyle::default(),
    ));
}

fn paint_polyline(
    window: &mut Window,
    points: &[ScreenPoint],
    origin: Point<Pixels>,
    color: Color,
) {
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    let mut builder = PathBuilder::stroke(px(1.0));
    builder.move_to(to_point(*first, origin));
    for pt in rest {
        builder.line_to(to_point(*pt, origin));
    }
    if let Ok(path) = builder.build() {
        window.paint_path(path, to_rgba(color));
    }
}

// Labels are shaped with GPUI's own text system from the texture's source
// text, at the size the caption font was rasterized at.
fn paint_label(
    window: &mut Window,
    cx: &mut App,
    texture: &Texture,
    dest: ScreenRect,
    origin: Point<Pixels>,
) {
    let text = texture.text();
    if text.is_empty() {
        return;
    }
    let color = texture.color().with_alpha(0xFF);
    let run = TextRun {
        len: text.len(),
        font: font(".SystemUIFont"),
        color: gpui::Hsla::from(to_rgba(color)),
        background_color: None,
        underline: None,
        strikethrough: None,
    };
    let shaped = window.text_system().shape_line(
        text.to_string().into(),
        px(texture.font_size() as f32),
        &[run],
        None,
    );
    let line_height = shaped.ascent + shaped.descent;
    let _ = shaped.paint(to_point(dest.min, origin), line_height, window, cx);
}

// Draws replace pixels rather than blend, so role alphas are not applied.
fn to_rgba(color: Color) -> gpui::Rgba {
    gpui::Rgba {
        r: f32::from(color.r) / 255.0,
        g: f32::from(color.g) / 255.0,
        b: f32::from(color.b) / 255.0,
        a: 1.0,
    }
}

fn to_point(pt: ScreenPoint, origin: Point<Pixels>) -> Point<Pixels> {
    point(origin.x + px(pt.x), origin.y + px(pt.y))
}

fn to_bounds(rect: ScreenRect, origin: Point<Pixels>) -> Bounds<Pixels> {
    Bounds::from_corners(to_point(rect.min, origin), to_point(rect.max, origin))
}
