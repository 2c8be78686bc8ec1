use std::time::Instant;

/// One captured image, tightly packed RGB8.
#[derive(Clone, Debug)]
pub struct Frame {
    pub rgb: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub timestamp: Instant,
}

impl Frame {
    /// A frame that carries only its resolution, used when landmarks come from a recording.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            rgb: Vec::new(),
            width,
            height,
            timestamp: Instant::now(),
        }
    }

    pub fn size(&self) -> FrameSize {
        FrameSize::new(self.width as f32, self.height as f32)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameSize {
    pub width: f32,
    pub height: f32,
}

impl FrameSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// A detector landmark: its index in the 21-point hand topology and its
/// position normalized to the image, x and y in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Landmark {
    pub id: usize,
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub const fn new(id: usize, x: f32, y: f32) -> Self {
        Self { id, x, y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PixelPoint {
    pub x: f32,
    pub y: f32,
}

impl PixelPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: PixelPoint) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}
