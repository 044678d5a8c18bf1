// SPDX-License-Identifier: MIT OR Apache-2.0
//! Track binding to target elements and clock domains.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of a canvas element owned by the host application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(pub Uuid);

/// Which clock a track samples when the session is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeDomain {
    /// Speed-remapped source time (follows slow/fast-motion)
    #[default]
    Source,
    /// Raw project clock, unaffected by speed controls
    Global,
}

/// Binding of a track to its target and clock domain
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackBinding {
    /// Target element, if the track animates one
    pub element: Option<ElementId>,
    /// Clock domain sampled at evaluation time
    pub time_domain: TimeDomain,
}

impl TrackBinding {
    /// Bind to an element on the source (remapped) clock
    pub fn element(element: ElementId) -> Self {
        Self {
            element: Some(element),
            time_domain: TimeDomain::Source,
        }
    }

    /// Bind to the raw project clock (e.g. overlay tracks that must ignore
    /// speed ramps)
    pub fn global_time(self) -> Self {
        Self {
            time_domain: TimeDomain::Global,
            ..self
        }
    }
}
