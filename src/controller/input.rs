//! Platform-agnostic input handling.
//!
//! The window layer translates its native events into [`InputEvent`]s; the
//! rest of the crate only sees actions, look offsets and scroll amounts.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::config::LookSource;
use crate::model::CameraMovement;

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Key pressed, named like winit's `KeyCode` (`"KeyW"`, `"Space"`).
    KeyDown(String),
    KeyUp(String),
    /// Absolute cursor position in physical pixels, y growing downwards.
    CursorMoved { x: f32, y: f32 },
    /// Relative device motion, y growing downwards.
    MouseMotion { dx: f32, dy: f32 },
    /// Wheel movement, positive away from the user.
    Scroll { dy: f32 },
    FocusLost,
}

/// Things a key can be bound to.
///
/// Serialized as `snake_case` so TOML stays readable:
/// ```toml
/// [keybindings]
/// move_forward = "KeyW"
/// quit = "Escape"
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    MoveForward,
    MoveBackward,
    StrafeLeft,
    StrafeRight,
    Ascend,
    Descend,
    Sprint,
    ToggleCapture,
    LookAtOrigin,
    CycleMaterial,
    ShowFps,
    Quit,
}

impl KeyAction {
    pub fn movement(self) -> Option<CameraMovement> {
        match self {
            KeyAction::MoveForward => Some(CameraMovement::Forward),
            KeyAction::MoveBackward => Some(CameraMovement::Backward),
            KeyAction::StrafeLeft => Some(CameraMovement::Left),
            KeyAction::StrafeRight => Some(CameraMovement::Right),
            KeyAction::Ascend => Some(CameraMovement::Up),
            KeyAction::Descend => Some(CameraMovement::Down),
            _ => None,
        }
    }

    /// Held actions act every frame while down; the rest fire once per press.
    pub fn is_held(self) -> bool {
        self.movement().is_some() || self == KeyAction::Sprint
    }
}

/// Action to key-name map with a reverse lookup.
///
/// A partial `[keybindings]` table only replaces the actions it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<KeyAction, String>", into = "BTreeMap<KeyAction, String>")]
pub struct KeyBindings {
    bindings: BTreeMap<KeyAction, String>,
    key_to_action: HashMap<String, KeyAction>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let bindings = BTreeMap::from([
            (KeyAction::MoveForward, "KeyW".to_string()),
            (KeyAction::MoveBackward, "KeyS".to_string()),
            (KeyAction::StrafeLeft, "KeyA".to_string()),
            (KeyAction::StrafeRight, "KeyD".to_string()),
            (KeyAction::Ascend, "Space".to_string()),
            (KeyAction::Descend, "ShiftLeft".to_string()),
            (KeyAction::Sprint, "ControlLeft".to_string()),
            (KeyAction::ToggleCapture, "KeyC".to_string()),
            (KeyAction::LookAtOrigin, "Backspace".to_string()),
            (KeyAction::CycleMaterial, "KeyM".to_string()),
            (KeyAction::ShowFps, "KeyF".to_string()),
            (KeyAction::Quit, "Escape".to_string()),
        ]);
        Self::from_bindings(bindings)
    }
}

impl From<BTreeMap<KeyAction, String>> for KeyBindings {
    fn from(overrides: BTreeMap<KeyAction, String>) -> Self {
        let mut bindings = KeyBindings::default().bindings;
        bindings.extend(overrides);
        Self::from_bindings(bindings)
    }
}

impl From<KeyBindings> for BTreeMap<KeyAction, String> {
    fn from(kb: KeyBindings) -> Self {
        kb.bindings
    }
}

impl KeyBindings {
    fn from_bindings(bindings: BTreeMap<KeyAction, String>) -> Self {
        let mut kb = Self {
            bindings,
            key_to_action: HashMap::new(),
        };
        kb.rebuild_reverse_map();
        kb
    }

    pub fn rebuild_reverse_map(&mut self) {
        self.key_to_action.clear();
        for (action, key) in &self.bindings {
            if let Some(previous) = self.key_to_action.insert(key.clone(), *action) {
                tracing::warn!(key = %key, ?previous, ?action, "key bound twice, keeping the later action");
            }
        }
    }

    pub fn bind(&mut self, action: KeyAction, key: impl Into<String>) {
        self.bindings.insert(action, key.into());
        self.rebuild_reverse_map();
    }

    pub fn lookup(&self, key: &str) -> Option<KeyAction> {
        self.key_to_action.get(key).copied()
    }

    pub fn key_for(&self, action: KeyAction) -> Option<&str> {
        self.bindings.get(&action).map(String::as_str)
    }
}

/// Turns raw pointer samples into look offsets (x right, y up).
///
/// The first sample after construction or [`MouseLook::reset`] yields
/// `(0, 0)` so warping or re-capturing the cursor never causes a jump.
#[derive(Debug, Clone)]
pub struct MouseLook {
    last_cursor: Option<(f32, f32)>,
    discard_next_motion: bool,
}

impl Default for MouseLook {
    fn default() -> Self {
        Self::new()
    }
}

impl MouseLook {
    pub fn new() -> Self {
        Self {
            last_cursor: None,
            discard_next_motion: true,
        }
    }

    pub fn reset(&mut self) {
        self.last_cursor = None;
        self.discard_next_motion = true;
    }

    pub fn cursor(&mut self, x: f32, y: f32) -> (f32, f32) {
        let offset = match self.last_cursor {
            Some((last_x, last_y)) => (x - last_x, last_y - y),
            None => (0.0, 0.0),
        };
        self.last_cursor = Some((x, y));
        self.discard_next_motion = false;
        offset
    }

    pub fn motion(&mut self, dx: f32, dy: f32) -> (f32, f32) {
        if self.discard_next_motion {
            self.discard_next_motion = false;
            return (0.0, 0.0);
        }
        (dx, -dy)
    }
}

/// Per-frame input accumulator.
#[derive(Debug, Clone)]
pub struct InputState {
    bindings: KeyBindings,
    look_source: LookSource,
    mouse_look: MouseLook,
    held: HashSet<KeyAction>,
    look_delta: (f32, f32),
    scroll_delta: f32,
    triggered: Vec<KeyAction>,
    captured: bool,
}

impl InputState {
    pub fn new(bindings: KeyBindings, look_source: LookSource, captured: bool) -> Self {
        Self {
            bindings,
            look_source,
            mouse_look: MouseLook::new(),
            held: HashSet::new(),
            look_delta: (0.0, 0.0),
            scroll_delta: 0.0,
            triggered: Vec::new(),
            captured,
        }
    }

    pub fn process_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(key) => match self.bindings.lookup(key) {
                Some(action) if action.is_held() => {
                    self.held.insert(action);
                }
                Some(action) => self.triggered.push(action),
                None => {}
            },
            InputEvent::KeyUp(key) => {
                if let Some(action) = self.bindings.lookup(key) {
                    self.held.remove(&action);
                }
            }
            InputEvent::CursorMoved { x, y } => {
                if self.captured && self.look_source == LookSource::Cursor {
                    let (dx, dy) = self.mouse_look.cursor(*x, *y);
                    self.add_look(dx, dy);
                }
            }
            InputEvent::MouseMotion { dx, dy } => {
                if self.captured && self.look_source == LookSource::Raw {
                    let (dx, dy) = self.mouse_look.motion(*dx, *dy);
                    self.add_look(dx, dy);
                }
            }
            InputEvent::Scroll { dy } => {
                if self.captured {
                    self.scroll_delta += dy;
                }
            }
            InputEvent::FocusLost => {
                self.held.clear();
                self.mouse_look.reset();
            }
        }
    }

    fn add_look(&mut self, dx: f32, dy: f32) {
        self.look_delta.0 += dx;
        self.look_delta.1 += dy;
    }

    pub fn is_held(&self, action: KeyAction) -> bool {
        self.held.contains(&action)
    }

    /// Movements whose keys are currently down, in a stable order.
    pub fn held_movements(&self) -> Vec<CameraMovement> {
        let mut actions: Vec<KeyAction> = self.held.iter().copied().collect();
        actions.sort();
        actions.into_iter().filter_map(KeyAction::movement).collect()
    }

    pub fn is_captured(&self) -> bool {
        self.captured
    }

    /// Changing capture drops pending look input and re-arms the first-sample discard.
    pub fn set_captured(&mut self, captured: bool) {
        self.captured = captured;
        self.look_delta = (0.0, 0.0);
        self.mouse_look.reset();
    }

    /// Forget the last pointer sample, e.g. after the camera was re-aimed.
    pub fn rearm_look(&mut self) {
        self.look_delta = (0.0, 0.0);
        self.mouse_look.reset();
    }

    pub fn consume_look(&mut self) -> (f32, f32) {
        std::mem::take(&mut self.look_delta)
    }

    pub fn consume_scroll(&mut self) -> f32 {
        std::mem::take(&mut self.scroll_delta)
    }

    pub fn take_triggered(&mut self) -> Vec<KeyAction> {
        std::mem::take(&mut self.triggered)
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captured_state(source: LookSource) -> InputState {
        InputState::new(KeyBindings::default(), source, true)
    }

    #[test]
    fn first_cursor_sample_is_discarded() {
        let mut look = MouseLook::new();
        assert_eq!(look.cursor(400.0, 300.0), (0.0, 0.0));
        // Moving up the screen is a positive look offset.
        assert_eq!(look.cursor(410.0, 290.0), (10.0, 10.0));
        look.reset();
        assert_eq!(look.cursor(0.0, 0.0), (0.0, 0.0));
    }

    #[test]
    fn raw_motion_flips_y_after_first_sample() {
        let mut look = MouseLook::new();
        assert_eq!(look.motion(5.0, 5.0), (0.0, 0.0));
        assert_eq!(look.motion(3.0, 4.0), (3.0, -4.0));
    }

    #[test]
    fn look_only_accumulates_while_captured() {
        let mut state = InputState::new(KeyBindings::default(), LookSource::Raw, false);
        state.process_event(&InputEvent::MouseMotion { dx: 1.0, dy: 1.0 });
        state.process_event(&InputEvent::MouseMotion { dx: 1.0, dy: 1.0 });
        assert_eq!(state.consume_look(), (0.0, 0.0));

        state.set_captured(true);
        state.process_event(&InputEvent::MouseMotion { dx: 1.0, dy: 1.0 });
        state.process_event(&InputEvent::MouseMotion { dx: 2.0, dy: 1.0 });
        state.process_event(&InputEvent::MouseMotion { dx: 3.0, dy: -4.0 });
        assert_eq!(state.consume_look(), (5.0, 3.0));
        assert_eq!(state.consume_look(), (0.0, 0.0));
    }

    #[test]
    fn events_from_the_other_source_are_ignored() {
        let mut state = captured_state(LookSource::Cursor);
        state.process_event(&InputEvent::MouseMotion { dx: 9.0, dy: 9.0 });
        state.process_event(&InputEvent::CursorMoved { x: 0.0, y: 0.0 });
        state.process_event(&InputEvent::CursorMoved { x: 4.0, y: 0.0 });
        assert_eq!(state.consume_look(), (4.0, 0.0));
    }

    #[test]
    fn held_and_triggered_actions_are_separated() {
        let mut state = captured_state(LookSource::Raw);
        state.process_event(&InputEvent::KeyDown("KeyW".into()));
        state.process_event(&InputEvent::KeyDown("KeyM".into()));
        state.process_event(&InputEvent::KeyDown("KeyZ".into()));
        assert!(state.is_held(KeyAction::MoveForward));
        assert_eq!(state.held_movements(), vec![CameraMovement::Forward]);
        assert_eq!(state.take_triggered(), vec![KeyAction::CycleMaterial]);
        assert!(state.take_triggered().is_empty());

        state.process_event(&InputEvent::KeyUp("KeyW".into()));
        assert!(state.held_movements().is_empty());
    }

    #[test]
    fn focus_loss_releases_everything() {
        let mut state = captured_state(LookSource::Raw);
        state.process_event(&InputEvent::KeyDown("KeyA".into()));
        state.process_event(&InputEvent::KeyDown("ControlLeft".into()));
        state.process_event(&InputEvent::FocusLost);
        assert!(!state.is_held(KeyAction::StrafeLeft));
        assert!(!state.is_held(KeyAction::Sprint));
    }

    #[test]
    fn scroll_accumulates_until_consumed() {
        let mut state = captured_state(LookSource::Raw);
        state.process_event(&InputEvent::Scroll { dy: 1.0 });
        state.process_event(&InputEvent::Scroll { dy: 2.0 });
        assert_eq!(state.consume_scroll(), 3.0);
        assert_eq!(state.consume_scroll(), 0.0);
    }

    #[test]
    fn rebinding_updates_reverse_lookup() {
        let mut kb = KeyBindings::default();
        kb.bind(KeyAction::Quit, "KeyQ");
        assert_eq!(kb.lookup("KeyQ"), Some(KeyAction::Quit));
        assert_eq!(kb.lookup("Escape"), None);
        assert_eq!(kb.key_for(KeyAction::Quit), Some("KeyQ"));
    }
}
