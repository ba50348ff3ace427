//! Screen rectangles and the exposure overlap test

/// An axis-aligned rectangle in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn left(&self) -> i64 {
        self.x as i64
    }

    /// Right edge, inclusive
    pub fn right(&self) -> i64 {
        self.x as i64 + self.w as i64
    }

    pub fn top(&self) -> i64 {
        self.y as i64
    }

    /// Bottom edge, inclusive
    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.h as i64
    }

    /// Whether two rectangles intersect, treating both axes as closed
    /// intervals so that rectangles sharing an edge count as overlapping.
    ///
    /// # Examples
    ///
    /// ```
    /// use overlay_clock::Rect;
    ///
    /// let painted = Rect::new(0, 0, 10, 10);
    /// assert!(painted.overlaps(&Rect::new(10, 0, 5, 5)));
    /// assert!(!painted.overlaps(&Rect::new(20, 20, 5, 5)));
    /// ```
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(other.left() > self.right()
            || other.right() < self.left()
            || other.top() > self.bottom()
            || other.bottom() < self.top())
    }
}
