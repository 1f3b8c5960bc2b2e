use form_core::model::{Block, BlockKind};
use services::ResponseSession;

/// Keys that take part in block navigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavKey {
    ArrowUp,
    ArrowDown,
    Enter,
}

/// A key press with the modifier state the policy cares about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyPress {
    pub key: NavKey,
    pub shift: bool,
    /// Cmd on macOS, Ctrl elsewhere.
    pub command: bool,
    /// Focus is inside a multi-line text area.
    pub in_textarea: bool,
}

impl KeyPress {
    #[must_use]
    pub const fn plain(key: NavKey) -> Self {
        Self {
            key,
            shift: false,
            command: false,
            in_textarea: false,
        }
    }

    #[must_use]
    pub const fn with_command(mut self) -> Self {
        self.command = true;
        self
    }

    #[must_use]
    pub const fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    #[must_use]
    pub const fn in_textarea(mut self) -> Self {
        self.in_textarea = true;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavIntent {
    Next,
    Previous,
}

/// Kinds whose input consumes a plain Enter, so advancing needs Cmd/Ctrl.
pub(crate) const fn needs_command_enter(kind: BlockKind) -> bool {
    matches!(
        kind,
        BlockKind::LongText | BlockKind::Dropdown | BlockKind::Phone | BlockKind::FileUpload
    )
}

/// Kinds whose input uses the arrow keys itself.
const fn owns_arrow_down(kind: BlockKind) -> bool {
    matches!(
        kind,
        BlockKind::LongText | BlockKind::Number | BlockKind::Phone
    )
}

/// Map a key press on `block` to a navigation intent.
#[must_use]
pub fn intent_for_key(block: &Block, press: KeyPress) -> Option<NavIntent> {
    intent_for_kind(block.kind(), block.is_thank_you(), press)
}

/// Same policy as [`intent_for_key`] for callers holding only the kind.
#[must_use]
pub fn intent_for_kind(kind: BlockKind, is_thank_you: bool, press: KeyPress) -> Option<NavIntent> {
    if is_thank_you {
        return None;
    }
    match press.key {
        NavKey::ArrowUp => Some(NavIntent::Previous),
        NavKey::ArrowDown if owns_arrow_down(kind) => None,
        NavKey::ArrowDown => Some(NavIntent::Next),
        NavKey::Enter if press.shift => None,
        NavKey::Enter if press.command => Some(NavIntent::Next),
        NavKey::Enter if press.in_textarea || needs_command_enter(kind) => None,
        NavKey::Enter => Some(NavIntent::Next),
    }
}

/// Apply an intent to the session. Returns true if the position changed.
pub fn apply_intent(session: &mut ResponseSession, intent: NavIntent) -> bool {
    match intent {
        NavIntent::Next => {
            session.validate_current_block();
            session.go_to_next()
        }
        NavIntent::Previous => session.go_to_previous(),
    }
}
