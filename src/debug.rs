use crate::math::Point2d;
use crate::util::Rect;
#[cfg(feature = "debug")]
use serde_json::json;

#[cfg(feature = "debug")]
thread_local!(
    static DEBUG_FRAME: std::cell::RefCell<Vec<serde_json::Value>> = Default::default();
);

/// Records a sensor ray or other segment in the current debug frame.
#[allow(unused)]
pub fn debug_line(name: &str, p1: Point2d, p2: Point2d) {
    #[cfg(feature = "debug")]
    DEBUG_FRAME.with(|frame| {
        frame.borrow_mut().push(json!({
            "type": "line",
            "name": name,
            "p1": [p1.x, p1.y],
            "p2": [p2.x, p2.y],
        }))
    })
}

/// Records an axis-aligned box, such as a checkpoint or the vehicle's
/// bounding box, in the current debug frame.
#[allow(unused)]
pub fn debug_rect(name: &str, rect: &Rect) {
    #[cfg(feature = "debug")]
    DEBUG_FRAME.with(|frame| {
        frame.borrow_mut().push(json!({
            "type": "rect",
            "name": name,
            "min": [rect.x.min, rect.y.min],
            "max": [rect.x.max, rect.y.max],
        }))
    })
}

/// Takes everything recorded since the last call, leaving the frame empty.
#[cfg(feature = "debug")]
pub fn take_debug_frame() -> serde_json::Value {
    json!(DEBUG_FRAME.with(|frame| frame.take()))
}

#[cfg(all(test, feature = "debug"))]
mod test {
    use super::*;

    #[test]
    fn frame_is_cleared_when_taken() {
        take_debug_frame();
        debug_line("ray", Point2d::new(0.0, 0.0), Point2d::new(10.0, 0.0));
        debug_rect("checkpoint", &Rect::square(Point2d::new(5.0, 5.0), 2.0));
        let frame = take_debug_frame();
        assert_eq!(frame.as_array().map(Vec::len), Some(2));
        assert_eq!(frame[0]["p2"][0], 10.0);
        assert_eq!(frame[1]["min"][0], 4.0);
        assert_eq!(take_debug_frame().as_array().map(Vec::len), Some(0));
    }
}
