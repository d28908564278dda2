//! Input handling - keyboard and gamepad mapped onto engine intents
//!
//! Discrete intents (fire, interact, answer selection) are edge-buffered:
//! a press is held in the resource until the consuming system takes it, so
//! a press landing between fixed ticks is never dropped. Movement is
//! level-triggered and overwritten every frame.

use bevy::prelude::*;

use crate::constants::STICK_DEADZONE;

/// Player intents for the current tick
#[derive(Resource, Default, Debug)]
pub struct PlayerInput {
    /// Normalized movement direction
    pub move_vec: Vec2,
    fire_requested: bool,
    interact_requested: bool,
    answer_selected: Option<usize>,
}

impl PlayerInput {
    pub fn request_fire(&mut self) {
        self.fire_requested = true;
    }

    pub fn request_interact(&mut self) {
        self.interact_requested = true;
    }

    /// Buffer an answer choice (0-based option index). A later press in the
    /// same window replaces an unconsumed earlier one.
    pub fn select_answer(&mut self, index: usize) {
        self.answer_selected = Some(index);
    }

    pub fn take_fire(&mut self) -> bool {
        std::mem::take(&mut self.fire_requested)
    }

    pub fn take_interact(&mut self) -> bool {
        std::mem::take(&mut self.interact_requested)
    }

    pub fn take_answer(&mut self) -> Option<usize> {
        self.answer_selected.take()
    }

    /// Drop any buffered intents, e.g. on room transition or run end.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

const ANSWER_KEYS: [(KeyCode, usize); 8] = [
    (KeyCode::Digit1, 0),
    (KeyCode::Digit2, 1),
    (KeyCode::Digit3, 2),
    (KeyCode::Digit4, 3),
    (KeyCode::Numpad1, 0),
    (KeyCode::Numpad2, 1),
    (KeyCode::Numpad3, 2),
    (KeyCode::Numpad4, 3),
];

/// Map keyboard state onto player intents.
pub fn capture_keyboard_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut input: ResMut<PlayerInput>,
) {
    let mut dir = Vec2::ZERO;
    if keyboard.pressed(KeyCode::KeyA) || keyboard.pressed(KeyCode::ArrowLeft) {
        dir.x -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) || keyboard.pressed(KeyCode::ArrowRight) {
        dir.x += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyS) || keyboard.pressed(KeyCode::ArrowDown) {
        dir.y -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyW) || keyboard.pressed(KeyCode::ArrowUp) {
        dir.y += 1.0;
    }
    input.move_vec = dir.normalize_or_zero();

    if keyboard.just_pressed(KeyCode::Space) {
        input.request_fire();
    }
    if keyboard.just_pressed(KeyCode::KeyE) {
        input.request_interact();
    }
    for (key, index) in ANSWER_KEYS {
        if keyboard.just_pressed(key) {
            input.select_answer(index);
        }
    }
}

/// Map the first connected gamepad onto player intents. Stick movement only
/// overrides the keyboard when deflected.
pub fn capture_gamepad_input(gamepads: Query<&Gamepad>, mut input: ResMut<PlayerInput>) {
    let Some(gamepad) = gamepads.iter().next() else {
        return;
    };

    let stick = gamepad.left_stick();
    if stick.length() > STICK_DEADZONE {
        input.move_vec = stick.normalize_or_zero();
    }

    if gamepad.just_pressed(GamepadButton::South) {
        input.request_fire();
    }
    if gamepad.just_pressed(GamepadButton::West) {
        input.request_interact();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discrete_intents_buffer_until_taken() {
        let mut input = PlayerInput::default();
        input.request_fire();
        input.select_answer(2);

        assert!(input.take_fire());
        assert!(!input.take_fire());
        assert_eq!(input.take_answer(), Some(2));
        assert_eq!(input.take_answer(), None);
    }

    #[test]
    fn later_answer_press_replaces_unconsumed_one() {
        let mut input = PlayerInput::default();
        input.select_answer(0);
        input.select_answer(3);
        assert_eq!(input.take_answer(), Some(3));
    }

    #[test]
    fn clear_drops_everything() {
        let mut input = PlayerInput::default();
        input.move_vec = Vec2::X;
        input.request_interact();
        input.clear();
        assert_eq!(input.move_vec, Vec2::ZERO);
        assert!(!input.take_interact());
    }
}
