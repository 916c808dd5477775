/// Geometry reported by a scroll or resize event
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    /// Vertical scroll offset of the window
    pub scroll_top: f64,
    pub window_height: f64,
    pub inner_height: f64,
    pub body_height: f64,
    pub document_height: f64,
}

impl Viewport {
    /// Height of the scrollable document, whichever measurement is largest
    pub fn real_height(&self) -> f64 {
        self.inner_height
            .max(self.body_height)
            .max(self.document_height)
    }

    pub fn at_bottom(&self) -> bool {
        self.scroll_top + self.window_height >= self.real_height()
    }
}
