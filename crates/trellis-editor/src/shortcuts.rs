//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to `EditorCommand`s, which the controller
//! runs through `perform_command`. Bindings that are unavailable in the
//! current state simply do nothing.

use crate::actions::{ControlAction, EditAction};

/// Anything a key binding or menu item can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorCommand {
    Edit(EditAction),
    Control(ControlAction),
    Undo,
    Redo,
}

impl From<EditAction> for EditorCommand {
    fn from(action: EditAction) -> Self {
        Self::Edit(action)
    }
}

impl From<ControlAction> for EditorCommand {
    fn from(action: ControlAction) -> Self {
        Self::Control(action)
    }
}

/// Resolves key events into editor commands.
///
/// `meta` (⌘ on macOS) and `ctrl` both count as the command modifier.
pub struct ShortcutMap;

impl ShortcutMap {
    /// `key` is the key's printed value (`"z"`, `"Delete"`, `"ArrowDown"`).
    /// Returns `None` when the combo has no binding.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> Option<EditorCommand> {
        use ControlAction as C;
        use EditAction as E;

        let cmd = ctrl || meta;

        if cmd && shift {
            return Some(match key {
                "z" | "Z" => EditorCommand::Redo,
                "v" | "V" => E::PasteInto.into(),
                "[" | "{" => E::SendToBack.into(),
                "]" | "}" => E::BringToFront.into(),
                "u" | "U" => E::Unwrap.into(),
                _ => return None,
            });
        }

        if cmd && alt {
            // Grid track editing.
            return Some(match key {
                "ArrowUp" => E::AddRowAbove.into(),
                "ArrowDown" => E::AddRowBelow.into(),
                "ArrowLeft" => E::AddColumnBefore.into(),
                "ArrowRight" => E::AddColumnAfter.into(),
                _ => return None,
            });
        }

        if cmd {
            return Some(match key {
                "z" | "Z" => EditorCommand::Undo,
                "y" | "Y" => EditorCommand::Redo,
                "a" | "A" => C::SelectAll.into(),
                "c" | "C" => C::Copy.into(),
                "x" | "X" => E::Cut.into(),
                "v" | "V" => E::Paste.into(),
                "d" | "D" => E::Duplicate.into(),
                "[" => E::SendBackward.into(),
                "]" => E::BringForward.into(),
                "ArrowUp" => E::MoveRowAbove.into(),
                "ArrowDown" => E::MoveRowBelow.into(),
                "ArrowLeft" => E::MoveColumnBefore.into(),
                "ArrowRight" => E::MoveColumnAfter.into(),
                _ => return None,
            });
        }

        if alt {
            return None;
        }

        if shift {
            return match key {
                "Tab" => Some(C::SelectPrevious.into()),
                _ => None,
            };
        }

        match key {
            "Delete" | "Backspace" => Some(E::Delete.into()),
            "Escape" => Some(C::SelectNone.into()),
            "Tab" => Some(C::SelectNext.into()),
            "ArrowUp" => Some(C::SelectParent.into()),
            _ => None,
        }
    }
}
