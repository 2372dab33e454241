//! Image resize overlay geometry and drag state.
//!
//! The browser layer measures rectangles and forwards pointer positions;
//! everything here is plain arithmetic so it can be tested off the page.

/// An axis-aligned rectangle in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Scroll position of the container the overlay is placed in.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollOffset {
    pub left: f64,
    pub top: f64,
}

/// Where to draw the frame over `image`, in the coordinate space of its
/// scrolled `container`. Both rectangles are viewport-relative.
pub fn overlay_rect(image: Rect, container: Rect, scroll: ScrollOffset) -> Rect {
    Rect {
        x: image.x - container.x + scroll.left,
        y: image.y - container.y + scroll.top,
        width: image.width,
        height: image.height,
    }
}

/// Corner handles of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 4] = [
        ResizeHandle::NorthWest,
        ResizeHandle::NorthEast,
        ResizeHandle::SouthWest,
        ResizeHandle::SouthEast,
    ];

    pub fn from_dir(dir: &str) -> Option<Self> {
        match dir {
            "nw" => Some(ResizeHandle::NorthWest),
            "ne" => Some(ResizeHandle::NorthEast),
            "sw" => Some(ResizeHandle::SouthWest),
            "se" => Some(ResizeHandle::SouthEast),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResizeHandle::NorthWest => "nw",
            ResizeHandle::NorthEast => "ne",
            ResizeHandle::SouthWest => "sw",
            ResizeHandle::SouthEast => "se",
        }
    }

    /// East handles grow the image as the pointer moves right.
    pub fn is_east(self) -> bool {
        matches!(self, ResizeHandle::NorthEast | ResizeHandle::SouthEast)
    }
}

/// An in-progress drag of one handle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeDrag {
    pub handle: ResizeHandle,
    pub start_x: f64,
    pub start_width: f64,
    pub min_width: f64,
}

impl ResizeDrag {
    /// Width for a pointer at `x`, or `None` if it would fall below the floor.
    pub fn width_at(&self, x: f64) -> Option<f64> {
        let dx = x - self.start_x;
        let width = if self.handle.is_east() {
            self.start_width + dx
        } else {
            self.start_width - dx
        };
        (width >= self.min_width).then_some(width)
    }
}

/// The image currently carrying the frame, and the drag on it if any.
///
/// Generic over the image handle so the browser can store its element.
#[derive(Debug)]
pub struct ResizeSession<I> {
    image: Option<I>,
    drag: Option<ResizeDrag>,
    width: Option<f64>,
    min_width: f64,
}

impl<I> ResizeSession<I> {
    pub fn new(min_width: f64) -> Self {
        Self {
            image: None,
            drag: None,
            width: None,
            min_width,
        }
    }

    pub fn image(&self) -> Option<&I> {
        self.image.as_ref()
    }

    pub fn drag(&self) -> Option<&ResizeDrag> {
        self.drag.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Put the frame on `image`, ending any drag on a previous one.
    pub fn attach(&mut self, image: I) -> Option<I> {
        self.drag = None;
        self.width = None;
        self.image.replace(image)
    }

    /// Remove the frame. Returns the image it was on.
    pub fn detach(&mut self) -> Option<I> {
        self.drag = None;
        self.width = None;
        self.image.take()
    }

    /// Start dragging `handle` at pointer `x` over an image `width` wide.
    pub fn begin_drag(&mut self, handle: ResizeHandle, x: f64, width: f64) -> bool {
        if self.image.is_none() {
            return false;
        }
        tracing::debug!(target: "quire::resize", handle = handle.as_str(), width, "resize start");
        self.drag = Some(ResizeDrag {
            handle,
            start_x: x,
            start_width: width,
            min_width: self.min_width,
        });
        self.width = Some(width);
        true
    }

    /// Pointer moved to `x`. Returns the width to apply, if it changed.
    ///
    /// Below the floor the image keeps its last accepted width.
    pub fn drag_to(&mut self, x: f64) -> Option<f64> {
        let width = self.drag?.width_at(x)?;
        self.width = Some(width);
        Some(width)
    }

    /// Width the image was last given during this drag.
    pub fn current_width(&self) -> Option<f64> {
        self.width
    }

    /// End the drag. Returns the image if a drag was in progress.
    pub fn end_drag(&mut self) -> Option<&I> {
        let drag = self.drag.take()?;
        tracing::debug!(
            target: "quire::resize",
            handle = drag.handle.as_str(),
            width = self.width,
            "resize end"
        );
        self.image.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_rect_accounts_for_scroll() {
        let image = Rect::new(150.0, 420.0, 200.0, 100.0);
        let container = Rect::new(100.0, 300.0, 600.0, 400.0);
        let rect = overlay_rect(image, container, ScrollOffset { left: 0.0, top: 80.0 });
        assert_eq!(rect, Rect::new(50.0, 200.0, 200.0, 100.0));
    }

    #[test]
    fn test_handle_directions() {
        for handle in ResizeHandle::ALL {
            assert_eq!(ResizeHandle::from_dir(handle.as_str()), Some(handle));
        }
        assert_eq!(ResizeHandle::from_dir("n"), None);
        assert!(ResizeHandle::SouthEast.is_east());
        assert!(!ResizeHandle::SouthWest.is_east());
    }

    #[test]
    fn test_width_at() {
        let east = ResizeDrag {
            handle: ResizeHandle::NorthEast,
            start_x: 100.0,
            start_width: 200.0,
            min_width: 30.0,
        };
        assert_eq!(east.width_at(150.0), Some(250.0));
        assert_eq!(east.width_at(-70.0), Some(30.0));
        assert_eq!(east.width_at(-71.0), None);

        let west = ResizeDrag {
            handle: ResizeHandle::SouthWest,
            ..east
        };
        assert_eq!(west.width_at(150.0), Some(150.0));
        assert_eq!(west.width_at(50.0), Some(250.0));
    }

    #[test]
    fn test_floor_keeps_last_width() {
        let mut session = ResizeSession::new(30.0);
        session.attach("img");
        assert!(session.begin_drag(ResizeHandle::SouthEast, 0.0, 100.0));

        assert_eq!(session.drag_to(-60.0), Some(40.0));
        assert_eq!(session.drag_to(-90.0), None);
        assert_eq!(session.current_width(), Some(40.0));
        assert_eq!(session.drag_to(-75.0), None);
        assert_eq!(session.current_width(), Some(40.0));

        assert_eq!(session.end_drag(), Some(&"img"));
        assert!(!session.is_dragging());
        assert_eq!(session.drag_to(10.0), None);
    }

    #[test]
    fn test_single_active_image() {
        let mut session = ResizeSession::new(30.0);
        assert!(!session.begin_drag(ResizeHandle::NorthWest, 0.0, 50.0));

        assert_eq!(session.attach(1), None);
        session.begin_drag(ResizeHandle::NorthWest, 0.0, 50.0);
        assert_eq!(session.attach(2), Some(1));
        assert!(!session.is_dragging());
        assert_eq!(session.detach(), Some(2));
        assert_eq!(session.image(), None);
    }
}
