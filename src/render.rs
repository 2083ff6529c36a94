//! Overlay renderer: keypoints, skeleton connectors, and bounding boxes.
//!
//! Drawing goes through the [`Surface`] trait, the seam to the external 2D
//! drawing collaborator. [`ImageSurface`] is the production implementation
//! over an RGBA buffer; tests substitute a recording double.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::PathBuf;

use ab_glyph::{FontArc, PxScale};
use image::RgbaImage;
use imageproc::drawing::{
    draw_filled_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut, draw_text_mut,
};
use imageproc::rect::Rect;

use crate::geometry::Transform;
use crate::keypoint::{bounding_box, Keypoint, Pose};
use crate::skeleton::SKELETON;
use crate::visualizer::Color;

/// Radius in pixels of a keypoint marker.
pub const MARKER_RADIUS: i32 = 3;

/// Label text height in pixels.
const LABEL_SCALE: f32 = 16.0;

/// URL of the label font, fetched once and cached in the config directory.
const FONT_URL: &str = "https://fonts.gstatic.com/s/roboto/v30/KFOmCnqEu92Fr1Me5Q.ttf";

/// Cached font file name.
const FONT_FILE: &str = "Roboto-Regular.ttf";

/// Which overlay elements to draw for each pose.
#[derive(Debug, Clone, Copy)]
pub struct OverlaySettings {
    /// Draw a marker per qualifying keypoint.
    pub show_keypoints: bool,
    /// Draw skeleton connectors between qualifying keypoints.
    pub show_skeleton: bool,
    /// Draw an axis-aligned bounding box around qualifying keypoints.
    pub show_bounding_box: bool,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            show_keypoints: true,
            show_skeleton: true,
            show_bounding_box: false,
        }
    }
}

/// Primitive drawing operations consumed by the renderer.
///
/// Implementations own the destination surface; drawing is a pure side effect
/// on it. The renderer never mutates the poses it is given.
pub trait Surface {
    /// Draw a filled circular marker.
    fn draw_marker(&mut self, center: (f32, f32), radius: i32, color: Color);
    /// Draw a line segment.
    fn draw_segment(&mut self, start: (f32, f32), end: (f32, f32), color: Color);
    /// Draw a hollow axis-aligned rectangle.
    fn draw_rect(&mut self, top_left: (f32, f32), size: (f32, f32), color: Color);
    /// Draw a short text label anchored at a point.
    fn draw_label(&mut self, text: &str, anchor: (f32, f32), color: Color);
}

/// Draw a marker for every keypoint whose score meets `min_confidence`.
///
/// Keypoints below the threshold are silently skipped.
pub fn draw_keypoints(
    keypoints: &[Keypoint],
    min_confidence: f32,
    color: Color,
    surface: &mut dyn Surface,
) {
    for kp in keypoints.iter().filter(|kp| kp.qualifies(min_confidence)) {
        surface.draw_marker(kp.position(), MARKER_RADIUS, color);
    }
}

/// Draw a segment for every skeleton edge whose both endpoints qualify.
///
/// Precondition: `keypoints` is in part-index order (the pose invariant).
pub fn draw_skeleton(
    keypoints: &[Keypoint],
    min_confidence: f32,
    color: Color,
    surface: &mut dyn Surface,
) {
    for (a, b) in SKELETON {
        let from = &keypoints[a as usize];
        let to = &keypoints[b as usize];
        if from.qualifies(min_confidence) && to.qualifies(min_confidence) {
            surface.draw_segment(from.position(), to.position(), color);
        }
    }
}

/// Draw the axis-aligned bounding box enclosing all qualifying keypoints.
///
/// Draws nothing when no keypoint qualifies.
pub fn draw_bounding_box(
    keypoints: &[Keypoint],
    min_confidence: f32,
    color: Color,
    surface: &mut dyn Surface,
) {
    if let Some((min_x, min_y, max_x, max_y)) = bounding_box(keypoints, min_confidence) {
        surface.draw_rect((min_x, min_y), (max_x - min_x, max_y - min_y), color);
    }
}

/// Draw one pose according to the overlay settings.
///
/// The bounding box, when enabled, is labeled with the pose score.
pub fn draw_pose(
    pose: &Pose,
    min_part_confidence: f32,
    settings: &OverlaySettings,
    color: Color,
    surface: &mut dyn Surface,
) {
    if settings.show_keypoints {
        draw_keypoints(&pose.keypoints, min_part_confidence, color, surface);
    }
    if settings.show_skeleton {
        draw_skeleton(&pose.keypoints, min_part_confidence, color, surface);
    }
    if settings.show_bounding_box {
        if let Some((min_x, min_y, max_x, max_y)) = bounding_box(&pose.keypoints, min_part_confidence)
        {
            surface.draw_rect((min_x, min_y), (max_x - min_x, max_y - min_y), Color::BOX);
            let label = format!("pose {:.2}", pose.score);
            surface.draw_label(&label, (min_x, (min_y - 20.0).max(0.0)), Color::BOX);
        }
    }
}

/// Draw every pose of a detection whose overall score meets
/// `min_pose_confidence`, delegating to [`draw_pose`] with
/// `min_part_confidence`.
///
/// Poses below the pose-level threshold produce zero draw calls.
pub fn draw_detection(
    poses: &[Pose],
    min_pose_confidence: f32,
    min_part_confidence: f32,
    settings: &OverlaySettings,
    surface: &mut dyn Surface,
) {
    for (i, pose) in poses.iter().enumerate() {
        if pose.score >= min_pose_confidence {
            let color = Color::from_pose_index(i);
            draw_pose(pose, min_part_confidence, settings, color, surface);
        }
    }
}

/// Pre-render an instructor pose onto its own transparent layer.
///
/// The pose is scaled by `scale` from instructor-canvas space into a layer of
/// the given size; the layer is later composited at a fixed offset by the
/// pipeline. Keypoints below `min_confidence` are skipped like everywhere
/// else.
#[must_use]
pub fn render_instructor(
    pose: &Pose,
    min_confidence: f32,
    size: (u32, u32),
    scale: f32,
) -> RgbaImage {
    let mut surface = ImageSurface::new(size.0, size.1);
    let scaled = Transform::new(scale, (0.0, 0.0)).apply_pose(pose);
    draw_keypoints(&scaled.keypoints, min_confidence, Color::INSTRUCTOR, &mut surface);
    draw_skeleton(&scaled.keypoints, min_confidence, Color::INSTRUCTOR, &mut surface);
    surface.into_image()
}

/// Production [`Surface`] drawing onto an RGBA pixel buffer.
pub struct ImageSurface {
    image: RgbaImage,
    font: Option<FontArc>,
}

impl ImageSurface {
    /// Create a transparent surface of the given size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_image(RgbaImage::from_pixel(
            width,
            height,
            image::Rgba([0, 0, 0, 0]),
        ))
    }

    /// Wrap an existing image buffer.
    #[must_use]
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image, font: None }
    }

    /// Attach the label font, fetching it into the cache directory if needed.
    ///
    /// Label drawing is silently skipped when no font is available.
    #[must_use]
    pub fn with_font(mut self) -> Self {
        self.font = load_font();
        self
    }

    /// Borrow the underlying image.
    #[must_use]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Mutably borrow the underlying image, for compositing whole layers.
    pub fn image_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }

    /// Consume the surface and return the image.
    #[must_use]
    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

impl Surface for ImageSurface {
    fn draw_marker(&mut self, center: (f32, f32), radius: i32, color: Color) {
        let center = (center.0.round() as i32, center.1.round() as i32);
        draw_filled_circle_mut(&mut self.image, center, radius, color.to_rgba());
    }

    fn draw_segment(&mut self, start: (f32, f32), end: (f32, f32), color: Color) {
        draw_line_segment_mut(&mut self.image, start, end, color.to_rgba());
    }

    fn draw_rect(&mut self, top_left: (f32, f32), size: (f32, f32), color: Color) {
        let w = size.0.round() as i64;
        let h = size.1.round() as i64;
        if w < 1 || h < 1 {
            return;
        }
        let rect = Rect::at(top_left.0.round() as i32, top_left.1.round() as i32)
            .of_size(w as u32, h as u32);
        draw_hollow_rect_mut(&mut self.image, rect, color.to_rgba());
    }

    fn draw_label(&mut self, text: &str, anchor: (f32, f32), color: Color) {
        if let Some(ref font) = self.font {
            let (width, height) = self.image.dimensions();
            let x = anchor.0.round() as i32;
            let y = anchor.1.round() as i32;
            if x >= 0 && y >= 0 && x < width as i32 && y < height as i32 {
                draw_text_mut(
                    &mut self.image,
                    color.to_rgba(),
                    x,
                    y,
                    PxScale::from(LABEL_SCALE),
                    font,
                    text,
                );
            }
        }
    }
}

/// Find the label font locally, downloading it on first use.
fn check_font() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?.join("pose-compare");
    let font_path = config_dir.join(FONT_FILE);

    if font_path.exists() {
        return Some(font_path);
    }

    if let Err(e) = fs::create_dir_all(&config_dir) {
        eprintln!("Failed to create config directory: {e}");
        return None;
    }

    match ureq::get(FONT_URL).call() {
        Ok(response) => {
            let mut file = match File::create(&font_path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Failed to create font file: {e}");
                    return None;
                }
            };

            let mut reader = response.into_body().into_reader();
            if let Err(e) = io::copy(&mut reader, &mut file) {
                eprintln!("Failed to download font: {e}");
                let _ = fs::remove_file(&font_path);
                return None;
            }

            Some(font_path)
        }
        Err(e) => {
            eprintln!("Failed to download font from {FONT_URL}: {e}");
            None
        }
    }
}

fn load_font() -> Option<FontArc> {
    let path = check_font()?;
    let mut file = File::open(path).ok()?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer).ok()?;
    FontArc::try_from_vec(buffer).ok()
}
