/// Interactive control commands accepted by the control loop.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Command {
    Pause,
    Resume,
    Save,
    Quit,
}

impl Command {
    /// Map a key press to a command. `p` toggles, so it maps to `Pause` and
    /// the control loop treats a pause while paused as a resume.
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'p' => Some(Command::Pause),
            'r' => Some(Command::Resume),
            's' => Some(Command::Save),
            'q' => Some(Command::Quit),
            _ => None,
        }
    }
}
