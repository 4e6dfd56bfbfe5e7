//! Keyboard shortcut handling.

use egui::{Context as EguiContext, Key};

/// Actions that can be triggered by keyboard shortcuts.
#[derive(Default, Debug, PartialEq)]
pub struct ShortcutActions {
    pub undo: bool,
    pub redo: bool,
    pub delete: bool,
    pub resize_steps: i32,
    pub add: bool,
    pub next_image: bool,
    pub previous_image: bool,
    pub save_all: bool,
}

/// Captures keyboard input and translates it into shortcut actions.
pub fn capture_shortcut_actions(ctx: &EguiContext, wants_text: bool) -> ShortcutActions {
    let mut actions = ShortcutActions::default();

    ctx.input(|input| {
        let command = input.modifiers.command;

        if input.key_pressed(Key::Z) && command {
            if input.modifiers.shift {
                actions.redo = true;
            } else {
                actions.undo = true;
            }
        }
        if input.key_pressed(Key::Y) && command {
            actions.redo = true;
        }
        if input.key_pressed(Key::S) && command && input.modifiers.shift {
            actions.save_all = true;
        }

        // Plain keys would collide with the glyph text field.
        if !command && !wants_text {
            if input.key_pressed(Key::Delete) || input.key_pressed(Key::Backspace) {
                actions.delete = true;
            }
            if input.key_pressed(Key::Plus) || input.key_pressed(Key::Equals) {
                actions.resize_steps += 1;
            }
            if input.key_pressed(Key::Minus) {
                actions.resize_steps -= 1;
            }
            if input.key_pressed(Key::A) {
                actions.add = true;
            }
            if input.key_pressed(Key::ArrowRight) || input.key_pressed(Key::PageDown) {
                actions.next_image = true;
            }
            if input.key_pressed(Key::ArrowLeft) || input.key_pressed(Key::PageUp) {
                actions.previous_image = true;
            }
        }
    });

    actions
}
