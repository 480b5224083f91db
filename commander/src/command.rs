use keyboard::Key;

pub const KEY_BINDINGS: &[&str] = &[
    "=== DRONE CONTROLS ===",
    "W/S: Forward/Backward",
    "A/D: Left/Right",
    "Space: Increase thrust",
    "Z: Decrease thrust",
    "Q: Emergency stop",
    "E: Exit",
    "======================",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    PitchForward,
    PitchBackward,
    RollLeft,
    RollRight,
    ThrustUp,
    ThrustDown,
    EmergencyStop,
    Exit,
    Interrupt,
}

impl Command {
    /// Letters are case-insensitive. Space is matched literally, or as the word `space`
    /// from line input.
    pub fn from_key(key: &Key) -> Option<Command> {
        match key {
            Key::Char(' ') => Some(Command::ThrustUp),
            Key::Char(c) => match c.to_ascii_lowercase() {
                'w' => Some(Command::PitchForward),
                's' => Some(Command::PitchBackward),
                'a' => Some(Command::RollLeft),
                'd' => Some(Command::RollRight),
                'z' => Some(Command::ThrustDown),
                'q' => Some(Command::EmergencyStop),
                'e' => Some(Command::Exit),
                _ => None,
            },
            Key::Word(word) if word.as_str() == "space" => Some(Command::ThrustUp),
            Key::Word(_) => None,
            Key::Interrupt => Some(Command::Interrupt),
        }
    }
}
