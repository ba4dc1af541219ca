//! Events passed through event-aware leaves, and the stored handler type.

use crate::geometry::{Point, Rectangle};
use crate::id::EventName;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// An event delivered to, or emitted by, an event handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    PointerDown { position: Point },
    PointerUp { position: Point },
    PointerMove { position: Point },
    Click { position: Point },
    KeyDown { code: u32 },
    KeyUp { code: u32 },
    Custom(EventName),
}

impl Event {
    /// Screen position for pointer events.
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::PointerDown { position }
            | Self::PointerUp { position }
            | Self::PointerMove { position }
            | Self::Click { position } => Some(*position),
            Self::KeyDown { .. } | Self::KeyUp { .. } | Self::Custom(_) => None,
        }
    }
}

type HandlerFn = dyn Fn(Rectangle, &Event) -> Vec<Event> + Send + Sync;

/// A pure function from `(bounds, event)` to zero or more outgoing events.
///
/// Handlers are shared, not copied, when a node is rebuilt through a
/// `with`-style operation.
#[derive(Clone)]
pub struct EventHandlerFn(Arc<HandlerFn>);

impl EventHandlerFn {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Rectangle, &Event) -> Vec<Event> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// A handler that ignores every event.
    pub fn none() -> Self {
        Self::new(|_, _| Vec::new())
    }

    pub fn call(&self, bounds: Rectangle, event: &Event) -> Vec<Event> {
        (self.0)(bounds, event)
    }
}

impl Default for EventHandlerFn {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Debug for EventHandlerFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EventHandlerFn(..)")
    }
}
