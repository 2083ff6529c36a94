/// Color type for visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    /// Red color.
    pub const RED: Color = Color(255, 0, 0);
    /// Green color.
    pub const GREEN: Color = Color(0, 255, 0);
    /// Aqua color, the classic keypoint/skeleton overlay color.
    pub const AQUA: Color = Color(0, 255, 255);
    /// White color.
    pub const WHITE: Color = Color(255, 255, 255);
    /// Black color.
    pub const BLACK: Color = Color(0, 0, 0);

    /// Color used for the instructor reference overlay.
    pub const INSTRUCTOR: Color = Color(255, 128, 0);
    /// Color used for bounding boxes.
    pub const BOX: Color = Color::RED;

    /// Create a new color from RGB values.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self(r, g, b)
    }

    /// Get a color from the pose palette by index (wraps around).
    #[must_use]
    pub fn from_pose_index(index: usize) -> Self {
        let color = POSE_COLORS[index % POSE_COLORS.len()];
        Self(color[0], color[1], color[2])
    }

    /// Convert to an RGBA pixel with full opacity.
    #[must_use]
    pub const fn to_rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.0, self.1, self.2, 255])
    }
}

/// Palette for differentiating multiple detected poses on one surface.
pub const POSE_COLORS: [[u8; 3]; 10] = [
    [0, 255, 255],   // #00ffff
    [51, 153, 255],  // #3399ff
    [255, 51, 255],  // #ff33ff
    [255, 153, 51],  // #ff9933
    [153, 255, 153], // #99ff99
    [255, 102, 102], // #ff6666
    [102, 178, 255], // #66b2ff
    [230, 230, 0],   // #e6e600
    [255, 153, 255], // #ff99ff
    [51, 255, 51],   // #33ff33
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_wraps() {
        assert_eq!(Color::from_pose_index(0), Color::from_pose_index(POSE_COLORS.len()));
    }

    #[test]
    fn test_to_rgba_opaque() {
        assert_eq!(Color::AQUA.to_rgba(), image::Rgba([0, 255, 255, 255]));
    }
}
