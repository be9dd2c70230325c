//! Component trait: the interface every UI panel implements.
//!
//! - Components own their view state and render themselves.
//! - Components receive `AppState` (read-only) for the listings they display.
//! - Components produce `Vec<Action>`; they never mutate shared state directly.

use ratatui::crossterm::event::{KeyEvent, MouseEvent};
use ratatui::{layout::Rect, Frame};

use crate::action::{Action, ComponentId};
use crate::app_state::AppState;

pub trait Component {
    fn id(&self) -> ComponentId;

    /// Handle a key event. Returns actions to be dispatched.
    /// Only called when this component's workspace is active.
    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action>;

    /// Handle a mouse event inside the last drawn `area`.
    fn handle_mouse(&mut self, _event: MouseEvent, _area: Rect, _state: &AppState) -> Vec<Action> {
        Vec::new()
    }

    /// Receive an action dispatched by the App.
    fn on_action(&mut self, action: &Action, state: &AppState) -> Vec<Action>;

    /// Render the component into `area`.
    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState);
}
