use std::time::Duration;

pub const DEFAULT_CURRENT_USER: &str = "You";
/// Distance from the bottom, in logical points, that still counts as "at the bottom".
pub const DEFAULT_SCROLL_THRESHOLD: f32 = 100.0;
pub const DEFAULT_ECHO_MATCH_WINDOW: Duration = Duration::from_secs(30);

/// Transient UI state of the conversation view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub draft_text: String,
    pub is_sending: bool,
    pub should_auto_scroll: bool,
    pub send_error: Option<String>,
}

/// Geometry of the message viewport as of the last frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_height: f32,
    pub scroll_top: f32,
    pub client_height: f32,
}

impl ScrollMetrics {
    pub fn is_near_bottom(&self, threshold: f32) -> bool {
        self.scroll_height - self.scroll_top <= self.client_height + threshold
    }

    pub fn max_scroll_top(&self) -> f32 {
        (self.scroll_height - self.client_height).max(0.0)
    }
}

#[derive(Debug, Clone)]
pub struct ViewSettings {
    pub current_user: String,
    pub scroll_threshold: f32,
    /// Show sent messages immediately instead of waiting for the next poll.
    pub local_echo: bool,
    pub echo_match_window: Duration,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            current_user: DEFAULT_CURRENT_USER.to_string(),
            scroll_threshold: DEFAULT_SCROLL_THRESHOLD,
            local_echo: false,
            echo_match_window: DEFAULT_ECHO_MATCH_WINDOW,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn near_bottom_includes_the_threshold_boundary() {
        let at_boundary = ScrollMetrics {
            scroll_height: 1000.0,
            scroll_top: 600.0,
            client_height: 300.0,
        };
        assert!(at_boundary.is_near_bottom(100.0));
        assert!(!at_boundary.is_near_bottom(99.0));
    }

    #[test]
    fn max_scroll_top_is_never_negative() {
        let short = ScrollMetrics {
            scroll_height: 120.0,
            scroll_top: 0.0,
            client_height: 400.0,
        };
        assert_eq!(short.max_scroll_top(), 0.0);
        assert!(short.is_near_bottom(0.0));
    }
}
