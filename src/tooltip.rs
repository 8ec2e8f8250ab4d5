//! Hover tooltips: a two-state machine per marker plus a tracker that turns
//! pointer positions into enter/leave events.

/// Tooltip visibility for one marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HoverState {
    #[default]
    Hidden,
    Shown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Enter,
    Leave,
}

impl HoverState {
    pub fn on(self, event: PointerEvent) -> HoverState {
        match event {
            PointerEvent::Enter => HoverState::Shown,
            PointerEvent::Leave => HoverState::Hidden,
        }
    }

    pub fn is_shown(self) -> bool {
        self == HoverState::Shown
    }
}

/// Tooltip body for a district
pub fn tooltip_lines(district: &str, doctors: u32) -> [String; 2] {
    [district.to_string(), format!("Doctors: {}", doctors)]
}

/// Remembers which marker the pointer is over
#[derive(Debug, Clone, Default)]
pub struct HoverTracker {
    hovered: Option<usize>,
}

impl HoverTracker {
    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    /// Feed the marker now under the pointer (if any); returns the
    /// transitions to apply, leave before enter.
    pub fn update(&mut self, hit: Option<usize>) -> Vec<(usize, PointerEvent)> {
        if hit == self.hovered {
            return Vec::new();
        }
        let mut events = Vec::with_capacity(2);
        if let Some(prev) = self.hovered {
            events.push((prev, PointerEvent::Leave));
        }
        if let Some(next) = hit {
            events.push((next, PointerEvent::Enter));
        }
        self.hovered = hit;
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_by_default() {
        assert_eq!(HoverState::default(), HoverState::Hidden);
    }

    #[test]
    fn test_transitions() {
        let s = HoverState::Hidden.on(PointerEvent::Enter);
        assert!(s.is_shown());
        assert_eq!(s.on(PointerEvent::Enter), HoverState::Shown);
        assert_eq!(s.on(PointerEvent::Leave), HoverState::Hidden);
        assert_eq!(HoverState::Hidden.on(PointerEvent::Leave), HoverState::Hidden);
    }

    #[test]
    fn test_tooltip_text() {
        assert_eq!(tooltip_lines("Quetta", 14), ["Quetta".to_string(), "Doctors: 14".to_string()]);
    }

    #[test]
    fn test_tracker_sequence() {
        let mut tracker = HoverTracker::default();
        assert!(tracker.update(None).is_empty());
        assert_eq!(tracker.update(Some(2)), vec![(2, PointerEvent::Enter)]);
        assert!(tracker.update(Some(2)).is_empty());
        assert_eq!(
            tracker.update(Some(4)),
            vec![(2, PointerEvent::Leave), (4, PointerEvent::Enter)]
        );
        assert_eq!(tracker.update(None), vec![(4, PointerEvent::Leave)]);
        assert_eq!(tracker.hovered(), None);
    }
}
