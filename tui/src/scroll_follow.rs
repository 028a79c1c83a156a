//! Follow-mode policy for the transcript viewport.
//!
//! The controller never scrolls anything itself. It keeps `at_bottom` up to date from the metrics
//! it is shown and answers with [`ScrollEffect`]s for the viewport to apply. Units are whatever the
//! viewport measures in (rows for the terminal front end).

/// Distance from the bottom under which the viewport counts as "at the bottom".
pub const DEFAULT_NEAR_BOTTOM_THRESHOLD: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_height: f32,
    pub scroll_top: f32,
    pub client_height: f32,
}

impl ScrollMetrics {
    pub fn distance_from_bottom(&self) -> f32 {
        self.scroll_height - self.scroll_top - self.client_height
    }
}

pub fn is_near_bottom(metrics: ScrollMetrics, threshold: f32) -> bool {
    metrics.distance_from_bottom() < threshold
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentChange {
    /// A new message was added to the transcript.
    Appended,
    /// An existing message got longer (streaming).
    Grew,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollEffect {
    ScrollToBottom { smooth: bool },
}

#[derive(Debug, Clone)]
pub struct ScrollFollowController {
    threshold: f32,
    at_bottom: bool,
}

impl ScrollFollowController {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            at_bottom: true,
        }
    }

    pub fn at_bottom(&self) -> bool {
        self.at_bottom
    }

    /// The "jump to latest" affordance is visible exactly when not at the bottom.
    pub fn show_jump_to_latest(&self) -> bool {
        !self.at_bottom
    }

    pub fn on_scroll(&mut self, metrics: ScrollMetrics) {
        self.at_bottom = is_near_bottom(metrics, self.threshold);
    }

    /// Reacts to a content-size change. `metrics` describe the viewport after the content changed
    /// and before any effect returned here is applied.
    pub fn on_content_change(
        &mut self,
        change: ContentChange,
        metrics: ScrollMetrics,
    ) -> Vec<ScrollEffect> {
        let was_at_bottom = self.at_bottom;
        match change {
            ContentChange::Appended if was_at_bottom => vec![self.scroll_to_bottom()],
            ContentChange::Grew if was_at_bottom => {
                self.on_scroll(metrics);
                if self.at_bottom {
                    vec![ScrollEffect::ScrollToBottom { smooth: false }]
                } else {
                    tracing::trace!(
                        distance = metrics.distance_from_bottom(),
                        "content outgrew follow threshold"
                    );
                    Vec::new()
                }
            }
            ContentChange::Appended | ContentChange::Grew => {
                self.on_scroll(metrics);
                Vec::new()
            }
        }
    }

    /// Manual "jump to latest" (also used for automatic follow on append).
    pub fn scroll_to_bottom(&mut self) -> ScrollEffect {
        self.at_bottom = true;
        ScrollEffect::ScrollToBottom { smooth: true }
    }

    /// Back to following, used when the transcript is cleared.
    pub fn reset(&mut self) {
        self.at_bottom = true;
    }
}

impl Default for ScrollFollowController {
    fn default() -> Self {
        Self::new(DEFAULT_NEAR_BOTTOM_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn metrics(scroll_height: f32, scroll_top: f32, client_height: f32) -> ScrollMetrics {
        ScrollMetrics {
            scroll_height,
            scroll_top,
            client_height,
        }
    }

    #[test]
    fn threshold_is_strict() {
        let mut controller = ScrollFollowController::default();
        controller.on_scroll(metrics(1000.0, 405.0, 500.0));
        assert!(controller.at_bottom());

        controller.on_scroll(metrics(1000.0, 395.0, 500.0));
        assert!(!controller.at_bottom());
        assert!(controller.show_jump_to_latest());

        controller.on_scroll(metrics(1000.0, 400.0, 500.0));
        assert!(!controller.at_bottom());
    }

    #[test]
    fn append_while_at_bottom_follows() {
        let mut controller = ScrollFollowController::default();
        let effects = controller.on_content_change(ContentChange::Appended, metrics(2000.0, 0.0, 500.0));
        assert_eq!(effects, vec![ScrollEffect::ScrollToBottom { smooth: true }]);
        assert!(controller.at_bottom());
    }

    #[test]
    fn append_while_scrolled_up_shows_jump_hint() {
        let mut controller = ScrollFollowController::default();
        controller.on_scroll(metrics(1000.0, 100.0, 500.0));

        let effects =
            controller.on_content_change(ContentChange::Appended, metrics(1200.0, 100.0, 500.0));
        assert!(effects.is_empty());
        assert!(controller.show_jump_to_latest());

        assert_eq!(
            controller.scroll_to_bottom(),
            ScrollEffect::ScrollToBottom { smooth: true }
        );
        assert!(!controller.show_jump_to_latest());
    }

    #[test]
    fn streaming_growth_never_snaps_back_a_scrolled_up_reader() {
        let mut controller = ScrollFollowController::new(3.0);
        controller.on_scroll(metrics(40.0, 10.0, 20.0));
        assert!(!controller.at_bottom());

        for height in 41..60 {
            let effects =
                controller.on_content_change(ContentChange::Grew, metrics(height as f32, 10.0, 20.0));
            assert!(effects.is_empty());
        }
        assert!(!controller.at_bottom());
    }

    #[test]
    fn streaming_growth_keeps_following_near_bottom() {
        let mut controller = ScrollFollowController::new(3.0);
        controller.on_scroll(metrics(40.0, 20.0, 20.0));

        let effects = controller.on_content_change(ContentChange::Grew, metrics(42.0, 20.0, 20.0));
        assert_eq!(effects, vec![ScrollEffect::ScrollToBottom { smooth: false }]);

        let effects = controller.on_content_change(ContentChange::Grew, metrics(50.0, 22.0, 20.0));
        assert!(effects.is_empty());
        assert!(!controller.at_bottom());
    }
}
