#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    Shown,
}

impl Visibility {
    pub fn is_shown(self) -> bool {
        matches!(self, Self::Shown)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// The overlay receives pointer input for drawing.
    #[default]
    Paint,
    /// Pointer input passes through to whatever is beneath the overlay.
    ClickThrough,
}

impl InputMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Paint => Self::ClickThrough,
            Self::ClickThrough => Self::Paint,
        }
    }

    pub fn ignores_mouse(self) -> bool {
        matches!(self, Self::ClickThrough)
    }

    pub fn from_ignore_mouse(ignore: bool) -> Self {
        if ignore {
            Self::ClickThrough
        } else {
            Self::Paint
        }
    }
}

/// Gate between window creation and the first reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    NotReady,
    Ready,
    Failed,
}

pub fn can_transition(from: Readiness, to: Readiness) -> bool {
    matches!(
        (from, to),
        (Readiness::NotReady, Readiness::Ready) | (Readiness::NotReady, Readiness::Failed)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_mode_toggle_is_an_involution() {
        for mode in [InputMode::Paint, InputMode::ClickThrough] {
            assert_ne!(mode.toggled(), mode);
            assert_eq!(mode.toggled().toggled(), mode);
        }
        assert_eq!(InputMode::default(), InputMode::Paint);
    }

    #[test]
    fn readiness_only_leaves_not_ready_once() {
        assert!(can_transition(Readiness::NotReady, Readiness::Ready));
        assert!(can_transition(Readiness::NotReady, Readiness::Failed));
        assert!(!can_transition(Readiness::Ready, Readiness::Ready));
        assert!(!can_transition(Readiness::Ready, Readiness::NotReady));
        assert!(!can_transition(Readiness::Failed, Readiness::Ready));
    }
}
