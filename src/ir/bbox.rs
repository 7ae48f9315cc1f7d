//! Bounding boxes in top-left XYWH form, tagged with their coordinate space.

use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

/// Marker for absolute pixel coordinates, origin at the image's top-left.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pixel {}

/// Marker for coordinates expressed as fractions of the image size.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Normalized {}

impl fmt::Debug for Pixel {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

impl fmt::Debug for Normalized {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

/// An axis-aligned box as (x, y, width, height) with (x, y) the top-left corner.
///
/// This is the COCO `bbox` shape and the shape of a per-image CSV row. The
/// constructor does not clamp or reorder anything: boxes decoded from
/// malformed labels keep their out-of-image or negative values.
#[derive(Clone, Copy, PartialEq)]
pub struct BBoxXYWH<TSpace> {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    _space: PhantomData<TSpace>,
}

impl<TSpace> BBoxXYWH<TSpace> {
    #[inline]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            _space: PhantomData,
        }
    }

    /// Builds a box from its center point and size.
    #[inline]
    pub fn from_cxcywh(cx: f64, cy: f64, width: f64, height: f64) -> Self {
        Self::new(cx - width / 2.0, cy - height / 2.0, width, height)
    }

    /// Returns (center_x, center_y, width, height).
    #[inline]
    pub fn to_cxcywh(&self) -> (f64, f64, f64, f64) {
        (
            self.x + self.width / 2.0,
            self.y + self.height / 2.0,
            self.width,
            self.height,
        )
    }

    /// Returns `[x, y, width, height]`, the COCO array order.
    #[inline]
    pub fn to_array(&self) -> [f64; 4] {
        [self.x, self.y, self.width, self.height]
    }

    /// Width times height. Negative if exactly one side is negative.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }
}

impl BBoxXYWH<Normalized> {
    /// Scales a normalized box to pixels of a `image_width` x `image_height` image.
    pub fn to_pixel(&self, image_width: f64, image_height: f64) -> BBoxXYWH<Pixel> {
        let (cx, cy, w, h) = self.to_cxcywh();
        BBoxXYWH::from_cxcywh(
            cx * image_width,
            cy * image_height,
            w * image_width,
            h * image_height,
        )
    }
}

impl BBoxXYWH<Pixel> {
    /// Divides a pixel box by the image dimensions.
    pub fn to_normalized(&self, image_width: f64, image_height: f64) -> BBoxXYWH<Normalized> {
        BBoxXYWH::new(
            self.x / image_width,
            self.y / image_height,
            self.width / image_width,
            self.height / image_height,
        )
    }

    /// Rounds every component to `decimals` places, as written to CSV.
    pub fn rounded(&self, decimals: i32) -> Self {
        let scale = 10f64.powi(decimals);
        let round = |v: f64| (v * scale).round() / scale;
        Self::new(
            round(self.x),
            round(self.y),
            round(self.width),
            round(self.height),
        )
    }
}

impl<TSpace> fmt::Debug for BBoxXYWH<TSpace> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BBoxXYWH")
            .field("x", &self.x)
            .field("y", &self.y)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl<TSpace> Default for BBoxXYWH<TSpace> {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}

// Serialized as the bare `[x, y, w, h]` array; avoids TSpace: Serialize bounds.
impl<TSpace> Serialize for BBoxXYWH<TSpace> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_array().serialize(serializer)
    }
}

impl<'de, TSpace> Deserialize<'de> for BBoxXYWH<TSpace> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let [x, y, w, h] = <[f64; 4]>::deserialize(deserializer)?;
        Ok(BBoxXYWH::new(x, y, w, h))
    }
}
