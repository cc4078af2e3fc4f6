use proptest::prelude::*;
use srimusic_pianoroll::follow_scroll;

fn geometry() -> impl Strategy<Value = (f32, f32, f32, f32, f32)> {
    (1.0f32..2000.0, 1.0f32..8000.0, 0.0f32..1.0, 0.0f32..1.0, 0.0f32..200.0).prop_map(
        |(viewport, extra, scroll_frac, playhead_frac, margin)| {
            let content = viewport + extra;
            let scroll = (content - viewport) * scroll_frac;
            let playhead = content * playhead_frac;
            (playhead, scroll, viewport, content, margin)
        },
    )
}

proptest! {
    #[test]
    fn rescroll_stays_in_range_and_shows_playhead(
        (playhead, scroll, viewport, content, margin) in geometry()
    ) {
        if let Some(next) = follow_scroll(playhead, scroll, viewport, content, margin) {
            prop_assert!(next >= 0.0);
            prop_assert!(next <= content - viewport + 1e-3);
            prop_assert!(playhead >= next - 1e-3);
            prop_assert!(playhead <= next + viewport + 1e-3);
        }
    }

    #[test]
    fn fitting_content_never_scrolls(
        viewport in 1.0f32..2000.0,
        shrink in 0.0f32..1.0,
        playhead in 0.0f32..2000.0,
        margin in 0.0f32..200.0,
    ) {
        let content = viewport * shrink;
        prop_assert_eq!(follow_scroll(playhead, 0.0, viewport, content, margin), None);
    }
}
