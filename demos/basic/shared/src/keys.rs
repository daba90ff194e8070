/// Held movement keys, in the `[W, A, S, D]` order they travel in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Keys([bool; 4]);

impl Keys {
    pub fn w(&self) -> bool {
        self.0[0]
    }

    pub fn a(&self) -> bool {
        self.0[1]
    }

    pub fn s(&self) -> bool {
        self.0[2]
    }

    pub fn d(&self) -> bool {
        self.0[3]
    }

    /// Presses or releases one key by its letter; other letters are ignored
    pub fn set(&mut self, key: char, pressed: bool) {
        let index = match key.to_ascii_lowercase() {
            'w' => 0,
            'a' => 1,
            's' => 2,
            'd' => 3,
            _ => return,
        };
        self.0[index] = pressed;
    }

    pub fn any(&self) -> bool {
        self.0.iter().any(|held| *held)
    }
}

impl From<[bool; 4]> for Keys {
    fn from(keys: [bool; 4]) -> Self {
        Self(keys)
    }
}

impl From<Keys> for [bool; 4] {
    fn from(keys: Keys) -> Self {
        keys.0
    }
}
