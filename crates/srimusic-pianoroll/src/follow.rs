/// Distance from a viewport edge at which the playhead triggers a rescroll.
pub const DEFAULT_FOLLOW_MARGIN: f32 = 50.0;

/// Returns the horizontal scroll offset that keeps the playhead in view.
///
/// Nothing changes while the playhead sits more than `margin` pixels inside
/// the visible span `[scroll, scroll + viewport)`. Once it gets closer to an
/// edge the view is recentred on it, clamped to `[0, content - viewport]`.
/// Returns `None` when no scroll is needed or possible.
pub fn follow_scroll(
    playhead_x: f32,
    scroll: f32,
    viewport: f32,
    content: f32,
    margin: f32,
) -> Option<f32> {
    if !playhead_x.is_finite() || viewport <= 0.0 {
        return None;
    }
    let max_scroll = content - viewport;
    if max_scroll <= 0.0 {
        return None;
    }
    let margin = margin.clamp(0.0, viewport * 0.5);
    let left = scroll;
    let right = scroll + viewport;
    let near_edge = playhead_x > right - margin || playhead_x < left + margin;
    if !near_edge {
        return None;
    }
    let target = (playhead_x - viewport * 0.5).clamp(0.0, max_scroll);
    if (target - scroll).abs() < 0.5 {
        return None;
    }
    Some(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playhead_near_right_edge_rescrolls() {
        let scroll = follow_scroll(1900.0, 0.0, 400.0, 2000.0, 50.0);
        assert_eq!(scroll, Some(1600.0));
    }

    #[test]
    fn playhead_inside_view_keeps_scroll() {
        assert_eq!(follow_scroll(200.0, 0.0, 400.0, 2000.0, 50.0), None);
    }

    #[test]
    fn entering_right_margin_centres_playhead() {
        assert_eq!(follow_scroll(360.0, 0.0, 400.0, 2000.0, 50.0), Some(160.0));
        assert_eq!(follow_scroll(349.0, 0.0, 400.0, 2000.0, 50.0), None);
    }

    #[test]
    fn playhead_behind_view_scrolls_back() {
        assert_eq!(follow_scroll(100.0, 800.0, 400.0, 2000.0, 50.0), Some(0.0));
        assert_eq!(follow_scroll(900.0, 800.0, 400.0, 2000.0, 50.0), None);
    }

    #[test]
    fn no_scroll_when_content_fits_viewport() {
        assert_eq!(follow_scroll(390.0, 0.0, 400.0, 400.0, 50.0), None);
        assert_eq!(follow_scroll(390.0, 0.0, 400.0, 300.0, 50.0), None);
    }

    #[test]
    fn unsized_viewport_is_ignored() {
        assert_eq!(follow_scroll(390.0, 0.0, 0.0, 2000.0, 50.0), None);
        assert_eq!(follow_scroll(f32::NAN, 0.0, 400.0, 2000.0, 50.0), None);
    }

    #[test]
    fn steady_ticks_do_not_jitter() {
        let mut scroll = 0.0;
        let mut rescrolls = 0;
        let mut x = 0.0;
        while x < 2000.0 {
            if let Some(next) = follow_scroll(x, scroll, 400.0, 2000.0, 50.0) {
                scroll = next;
                rescrolls += 1;
            }
            x += 4.0;
        }
        // Each rescroll buys roughly 150px of travel.
        assert!(rescrolls <= 12, "rescrolled {rescrolls} times");
    }
}
