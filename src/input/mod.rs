//! Pointer gestures and scroll tracking, independent of the terminal backend.

pub mod gesture;
pub mod scroll;

pub use gesture::{GestureRecognizer, SwipeDirection, SwipeHandler, Thresholds};
pub use scroll::{ScrollDirection, ScrollState, ScrollTracker};
