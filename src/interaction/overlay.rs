use crate::scene::BodyId;

/// Information panel for a clicked body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InfoOverlay {
    /// Nothing shown.
    #[default]
    Hidden,
    /// Showing the description of a body.
    Showing(BodyId),
}

impl InfoOverlay {
    /// Show `body`'s panel, replacing any other. Returns `true` if the
    /// overlay changed.
    pub fn show(&mut self, body: BodyId) -> bool {
        let changed = *self != Self::Showing(body);
        *self = Self::Showing(body);
        changed
    }

    /// Hide the panel. Returns `true` if it was showing.
    pub fn dismiss(&mut self) -> bool {
        let was_showing = self.is_visible();
        *self = Self::Hidden;
        was_showing
    }

    /// Whether a panel is shown.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        matches!(self, Self::Showing(_))
    }

    /// Body whose panel is shown.
    #[must_use]
    pub fn body(&self) -> Option<BodyId> {
        match self {
            Self::Hidden => None,
            Self::Showing(id) => Some(*id),
        }
    }
}
