//! Viewport anchoring around in-place edits.

/// Keeps the editor's scroll position stable across a re-render.
///
/// The store calls [`capture`](Self::capture) right before it swaps the tree
/// and [`restore`](Self::restore) right after, with whatever capture
/// returned. Implementations that render asynchronously should defer the
/// restore to their next frame.
pub trait ViewportAnchor: Send + Sync {
    /// Returns the current scroll offset, or `None` if there is nothing to keep.
    fn capture(&self) -> Option<f64>;

    /// Scrolls back to `offset`.
    fn restore(&self, offset: f64);
}
