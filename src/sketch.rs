//! Drawing section state: the selected tool and colour live here as plain
//! fields, together with the display list of committed shapes.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    pub fn parse_hex(raw: &str) -> Option<Self> {
        let hex = raw.trim().strip_prefix('#')?;
        let expand = |c: u8| c * 16 + c;
        let digit = |idx: usize| u8::from_str_radix(hex.get(idx..idx + 1)?, 16).ok();
        let pair = |idx: usize| u8::from_str_radix(hex.get(idx..idx + 2)?, 16).ok();
        match hex.len() {
            3 => Some(Rgb(expand(digit(0)?), expand(digit(1)?), expand(digit(2)?))),
            6 => Some(Rgb(pair(0)?, pair(2)?, pair(4)?)),
            _ => None,
        }
    }

    /// Inverse of [`Rgb::to_unit`]; components are clamped to `0.0..=1.0`.
    pub fn from_unit(r: f64, g: f64, b: f64) -> Self {
        let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Rgb(channel(r), channel(g), channel(b))
    }

    pub fn to_unit(self) -> (f64, f64, f64) {
        (
            self.0 as f64 / 255.0,
            self.1 as f64 / 255.0,
            self.2 as f64 / 255.0,
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Brush,
    Eraser,
    Rectangle,
    Circle,
    Triangle,
}

impl Tool {
    pub const ALL: [Tool; 5] = [
        Tool::Brush,
        Tool::Eraser,
        Tool::Rectangle,
        Tool::Circle,
        Tool::Triangle,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Tool::Brush => "brush",
            Tool::Eraser => "eraser",
            Tool::Rectangle => "rectangle",
            Tool::Circle => "circle",
            Tool::Triangle => "triangle",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    Polyline(Vec<Point>),
    /// Origin may sit at any corner; width and height can be negative.
    Rect { origin: Point, width: f64, height: f64 },
    Circle { center: Point, radius: f64 },
    Triangle([Point; 3]),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
    pub geometry: Geometry,
    pub color: Rgb,
    pub width: f64,
    pub filled: bool,
}

/// Shape for a drag from `anchor` to `pointer` with one of the shape tools.
pub fn shape_geometry(tool: Tool, anchor: Point, pointer: Point) -> Option<Geometry> {
    match tool {
        Tool::Brush | Tool::Eraser => None,
        Tool::Rectangle => Some(Geometry::Rect {
            origin: pointer,
            width: anchor.x - pointer.x,
            height: anchor.y - pointer.y,
        }),
        Tool::Circle => Some(Geometry::Circle {
            center: anchor,
            radius: anchor.distance(pointer),
        }),
        Tool::Triangle => Some(Geometry::Triangle([
            anchor,
            pointer,
            Point::new(anchor.x * 2.0 - pointer.x, pointer.y),
        ])),
    }
}

struct Drag {
    anchor: Point,
    points: Vec<Point>,
}

pub struct SketchPad {
    pub tool: Tool,
    pub color: Rgb,
    pub brush_width: f64,
    pub fill: bool,
    pub background: Rgb,
    width: u32,
    height: u32,
    shapes: Vec<Shape>,
    drag: Option<Drag>,
}

impl Default for SketchPad {
    fn default() -> Self {
        SketchPad {
            tool: Tool::Brush,
            color: Rgb::BLACK,
            brush_width: 5.0,
            fill: false,
            background: Rgb::WHITE,
            width: 0,
            height: 0,
            shapes: Vec::new(),
            drag: None,
        }
    }
}

impl SketchPad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Matches the canvas to its widget and starts from a blank background.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.clear();
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
        self.drag = None;
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn is_drawing(&self) -> bool {
        self.drag.is_some()
    }

    pub fn begin(&mut self, at: Point) {
        self.drag = Some(Drag {
            anchor: at,
            points: vec![at],
        });
    }

    pub fn extend(&mut self, to: Point) {
        if let Some(drag) = &mut self.drag {
            drag.points.push(to);
        }
    }

    /// Commits the current drag, if any, and returns the committed shape.
    pub fn finish(&mut self) -> Option<&Shape> {
        let drag = self.drag.take()?;
        let shape = self.shape_for(&drag)?;
        self.shapes.push(shape);
        self.shapes.last()
    }

    /// Drops the drag in progress without committing it.
    pub fn abort(&mut self) {
        self.drag = None;
    }

    /// What the drag in progress would commit right now.
    pub fn preview(&self) -> Option<Shape> {
        self.drag.as_ref().and_then(|drag| self.shape_for(drag))
    }

    fn shape_for(&self, drag: &Drag) -> Option<Shape> {
        let pointer = *drag.points.last()?;
        let (geometry, color, filled) = match self.tool {
            Tool::Brush => (Geometry::Polyline(drag.points.clone()), self.color, false),
            Tool::Eraser => (Geometry::Polyline(drag.points.clone()), self.background, false),
            tool => (shape_geometry(tool, drag.anchor, pointer)?, self.color, self.fill),
        };
        Some(Shape {
            geometry,
            color,
            width: self.brush_width,
            filled,
        })
    }
}

/// File name offered when saving a drawing, stamped with milliseconds since
/// the Unix epoch.
pub fn export_file_name(now: SystemTime) -> String {
    let millis = now
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("drawing-{millis}.png")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_radius_is_drag_length() {
        let geometry = shape_geometry(Tool::Circle, Point::new(10.0, 10.0), Point::new(13.0, 14.0));
        assert_eq!(
            geometry,
            Some(Geometry::Circle {
                center: Point::new(10.0, 10.0),
                radius: 5.0
            })
        );
    }

    #[test]
    fn triangle_mirrors_pointer_around_anchor() {
        let Some(Geometry::Triangle(points)) =
            shape_geometry(Tool::Triangle, Point::new(50.0, 10.0), Point::new(30.0, 40.0))
        else {
            panic!("expected a triangle");
        };
        assert_eq!(points[2], Point::new(70.0, 40.0));
    }

    #[test]
    fn rectangle_spans_anchor_to_pointer() {
        let geometry = shape_geometry(Tool::Rectangle, Point::new(20.0, 20.0), Point::new(5.0, 30.0));
        assert_eq!(
            geometry,
            Some(Geometry::Rect {
                origin: Point::new(5.0, 30.0),
                width: 15.0,
                height: -10.0
            })
        );
    }

    #[test]
    fn eraser_paints_background() {
        let mut pad = SketchPad::new();
        pad.resize(200, 100);
        pad.tool = Tool::Eraser;
        pad.color = Rgb(200, 0, 0);
        pad.begin(Point::new(1.0, 1.0));
        pad.extend(Point::new(2.0, 2.0));
        let shape = pad.finish().cloned().unwrap();
        assert_eq!(shape.color, Rgb::WHITE);
        assert!(!pad.is_drawing());
    }

    #[test]
    fn filled_shapes_follow_fill_flag() {
        let mut pad = SketchPad::new();
        pad.tool = Tool::Rectangle;
        pad.fill = true;
        pad.begin(Point::new(0.0, 0.0));
        pad.extend(Point::new(4.0, 4.0));
        assert!(pad.preview().unwrap().filled);
        pad.finish();
        assert_eq!(pad.shapes().len(), 1);

        pad.begin(Point::new(0.0, 0.0));
        pad.abort();
        assert_eq!(pad.finish(), None);
        assert_eq!(pad.shapes().len(), 1);
    }

    #[test]
    fn hex_colors() {
        assert_eq!(Rgb::parse_hex("#fff"), Some(Rgb::WHITE));
        assert_eq!(Rgb::parse_hex("#4A98F7"), Some(Rgb(0x4a, 0x98, 0xf7)));
        assert_eq!(Rgb::parse_hex("4A98F7"), None);
        assert_eq!(Rgb::parse_hex("#12"), None);
    }

    #[test]
    fn unit_colors_round_trip_through_the_picker_range() {
        assert_eq!(Rgb::from_unit(1.0, 0.0, 0.5), Rgb(255, 0, 128));
        assert_eq!(Rgb::from_unit(-0.2, 1.7, 0.0), Rgb(0, 255, 0));
        let (r, g, b) = Rgb(0x4a, 0x98, 0xf7).to_unit();
        assert_eq!(Rgb::from_unit(r, g, b), Rgb(0x4a, 0x98, 0xf7));
    }

    #[test]
    fn export_name_is_timestamped_png() {
        use std::time::Duration;

        let at = UNIX_EPOCH + Duration::from_millis(1_700_000_000_123);
        assert_eq!(export_file_name(at), "drawing-1700000000123.png");
        assert_eq!(export_file_name(UNIX_EPOCH), "drawing-0.png");
    }
}
