// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe definitions and property-value interpolation.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::easing::Easing;

/// Times closer than this are treated as the same instant.
///
/// Governs replace-on-insert for keyframes, degenerate-span detection, and
/// exact-boundary evaluation.
pub const TIME_EPSILON: f64 = 1e-9;

/// Unique identifier for a keyframe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyframeId(pub Uuid);

impl KeyframeId {
    /// Create a new random keyframe ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for KeyframeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Interpolation mode for the segment leaving a keyframe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InterpolationMode {
    /// Interpolate toward the next keyframe
    #[default]
    Linear,
    /// Interpolate toward the next keyframe (shaping comes from the easing)
    Smooth,
    /// Hold this keyframe's values until the next keyframe
    Hold,
    /// Bezier-shaped segment; the easing descriptor carries the curve
    Bezier,
}

/// Value of an animated property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    /// Scalar value
    Number(f64),
    /// 2D point (x, y)
    Point([f64; 2]),
    /// RGBA color, components nominally in [0, 1]
    Color([f64; 4]),
    /// Text; never interpolated, always held
    Text(String),
}

impl PropertyValue {
    /// Interpolate toward `other` at eased progress `t`.
    ///
    /// `Hold` returns this value unchanged, as does `Text`. Mismatched
    /// variants return `None`; the caller holds the earlier value.
    pub fn interpolate(&self, other: &PropertyValue, t: f64, mode: InterpolationMode) -> Option<PropertyValue> {
        if mode == InterpolationMode::Hold {
            return Some(self.clone());
        }
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => Some(Self::Number(lerp(*a, *b, t))),
            (Self::Point(a), Self::Point(b)) => {
                Some(Self::Point([lerp(a[0], b[0], t), lerp(a[1], b[1], t)]))
            }
            (Self::Color(a), Self::Color(b)) => Some(Self::Color([
                lerp(a[0], b[0], t),
                lerp(a[1], b[1], t),
                lerp(a[2], b[2], t),
                lerp(a[3], b[3], t),
            ])),
            (Self::Text(a), Self::Text(_)) => Some(Self::Text(a.clone())),
            _ => None,
        }
    }

    /// Get as scalar if possible
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as point if possible
    pub fn as_point(&self) -> Option<[f64; 2]> {
        match self {
            Self::Point(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as color if possible
    pub fn as_color(&self) -> Option<[f64; 4]> {
        match self {
            Self::Color(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as text if possible
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }
}

/// Property name → value mapping carried by a keyframe
pub type PropertyMap = IndexMap<String, PropertyValue>;

/// A keyframe anchoring a bundle of property values at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Unique keyframe ID
    pub id: KeyframeId,
    /// Time in seconds
    pub time: f64,
    /// Property values at this keyframe
    pub properties: PropertyMap,
    /// Easing applied across the segment leaving this keyframe
    pub easing: Easing,
    /// Interpolation mode for the segment leaving this keyframe
    pub interpolation: InterpolationMode,
}

impl Keyframe {
    /// Create a new keyframe
    pub fn new(time: f64, properties: PropertyMap) -> Self {
        Self {
            id: KeyframeId::new(),
            time,
            properties,
            easing: Easing::linear(),
            interpolation: InterpolationMode::Linear,
        }
    }

    /// Create a keyframe holding a single property
    pub fn single(time: f64, name: impl Into<String>, value: PropertyValue) -> Self {
        let mut properties = PropertyMap::new();
        properties.insert(name.into(), value);
        Self::new(time, properties)
    }

    /// Set the easing
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Set the interpolation mode
    pub fn with_interpolation(mut self, mode: InterpolationMode) -> Self {
        self.interpolation = mode;
        self
    }
}

/// Partial keyframe update merged by `AnimationTrack::update_keyframe`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeyframeUpdate {
    /// New time, if changing (triggers a re-sort)
    pub time: Option<f64>,
    /// Replacement property map, if changing
    pub properties: Option<PropertyMap>,
    /// New easing, if changing
    pub easing: Option<Easing>,
    /// New interpolation mode, if changing
    pub interpolation: Option<InterpolationMode>,
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
