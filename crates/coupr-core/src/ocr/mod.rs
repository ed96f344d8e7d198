//! OCR input contract.
//!
//! Text recognition runs on the device; this crate only consumes its output:
//! a flat text blob plus optional positioned blocks whose bounding boxes are
//! normalized to the image dimensions.

use serde::{Deserialize, Serialize};

use crate::coupon::normalize::normalize_line;
use crate::error::InputError;

/// Axis-aligned bounding box in normalized image coordinates (0.0 - 1.0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub w: f32,
    /// Height.
    pub h: f32,
}

impl BBox {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Get the center point of the box.
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    fn check(&self) -> Result<(), String> {
        let fields = [("x", self.x), ("y", self.y), ("w", self.w), ("h", self.h)];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(format!("{} is not finite", name));
            }
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} = {} is outside [0, 1]", name, value));
            }
        }
        Ok(())
    }
}

/// A recognized text block as emitted by the OCR collaborator.
///
/// Block text may span several lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrBlock {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BBox>,
}

impl OcrBlock {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bbox: None,
        }
    }

    pub fn with_bbox(mut self, bbox: BBox) -> Self {
        self.bbox = Some(bbox);
        self
    }
}

/// A single normalized line, inheriting its parent block's bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrLine {
    pub text: String,
    pub bbox: Option<BBox>,
}

impl OcrLine {
    pub fn new(text: impl Into<String>, bbox: Option<BBox>) -> Self {
        Self {
            text: text.into(),
            bbox,
        }
    }

    /// Vertical position used for reading order; unpositioned lines sort last.
    pub fn top(&self) -> f32 {
        self.bbox.map(|b| b.y).unwrap_or(f32::INFINITY)
    }
}

/// Split blocks into normalized lines, dropping lines that end up empty.
pub fn flatten_blocks(blocks: &[OcrBlock]) -> Vec<OcrLine> {
    blocks
        .iter()
        .flat_map(|block| {
            block
                .text
                .split('\n')
                .map(normalize_line)
                .filter(|line| !line.is_empty())
                .map(move |line| OcrLine::new(line, block.bbox))
        })
        .collect()
}

/// Validate block geometry at the input boundary.
pub fn validate_blocks(blocks: &[OcrBlock]) -> Result<(), InputError> {
    for (index, block) in blocks.iter().enumerate() {
        if let Some(bbox) = &block.bbox {
            bbox.check()
                .map_err(|reason| InputError::BoundingBox { index, reason })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_splits_multiline_blocks() {
        let bbox = BBox::new(0.1, 0.05, 0.8, 0.1);
        let blocks = vec![
            OcrBlock::new("THE MELTING\n  POT \n\n").with_bbox(bbox),
            OcrBlock::new("123 Main St"),
        ];

        let lines = flatten_blocks(&blocks);

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], OcrLine::new("THE MELTING", Some(bbox)));
        assert_eq!(lines[1], OcrLine::new("POT", Some(bbox)));
        assert_eq!(lines[2], OcrLine::new("123 Main St", None));
    }

    #[test]
    fn test_validate_blocks_rejects_out_of_range() {
        let blocks = vec![
            OcrBlock::new("ok").with_bbox(BBox::new(0.0, 0.0, 1.0, 1.0)),
            OcrBlock::new("bad").with_bbox(BBox::new(0.2, 1.4, 0.1, 0.1)),
        ];

        let err = validate_blocks(&blocks).unwrap_err();
        assert!(matches!(err, InputError::BoundingBox { index: 1, .. }));
    }

    #[test]
    fn test_validate_blocks_rejects_nan() {
        let blocks = vec![OcrBlock::new("nan").with_bbox(BBox::new(f32::NAN, 0.0, 0.1, 0.1))];
        assert!(validate_blocks(&blocks).is_err());
    }

    #[test]
    fn test_unpositioned_line_sorts_last() {
        let placed = OcrLine::new("a", Some(BBox::new(0.0, 0.9, 0.1, 0.1)));
        let floating = OcrLine::new("b", None);
        assert!(placed.top() < floating.top());
    }
}
