//! WorkspaceManager: Books/Quotes tab switching and shared overlay toggles.

use std::collections::HashSet;

use crate::action::Workspace;

pub struct WorkspaceManager {
    pub workspace: Workspace,
    pub show_help: bool,
    /// Footer keybindings bar.
    pub show_keys_bar: bool,
    /// Workspaces shown at least once; each listing loads on first show.
    mounted: HashSet<Workspace>,
}

impl WorkspaceManager {
    pub fn new() -> Self {
        Self {
            workspace: Workspace::default(),
            show_help: false,
            show_keys_bar: true,
            mounted: HashSet::new(),
        }
    }

    /// Make `ws` active. Returns true the first time `ws` is shown.
    pub fn set_workspace(&mut self, ws: Workspace) -> bool {
        self.workspace = ws;
        self.mounted.insert(ws)
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn toggle_keys_bar(&mut self) {
        self.show_keys_bar = !self.show_keys_bar;
    }
}

impl Default for WorkspaceManager {
    fn default() -> Self {
        Self::new()
    }
}
