use std::fmt::Display;

/// Operating modes offered by the interactive prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Single,
    Continuous,
    QuickTest,
    ShowLast,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Single, Mode::Continuous, Mode::QuickTest, Mode::ShowLast];

    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(Self::Single),
            "2" => Some(Self::Continuous),
            "3" => Some(Self::QuickTest),
            "4" => Some(Self::ShowLast),
            _ => None,
        }
    }

    /// Mode for a typed choice, with the notice to show when the choice
    /// was not recognized and a single check is used instead.
    pub fn resolve(choice: &str) -> (Self, Option<&'static str>) {
        match Self::from_choice(choice) {
            Some(mode) => (mode, None),
            None => (
                Self::Single,
                Some("⚠️  Invalid option. Falling back to a single check."),
            ),
        }
    }

    fn number(self) -> u8 {
        match self {
            Self::Single => 1,
            Self::Continuous => 2,
            Self::QuickTest => 3,
            Self::ShowLast => 4,
        }
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Single => "✅ Single check (quick)",
            Self::Continuous => "🔄 Continuous monitoring (5 min interval)",
            Self::QuickTest => "🧪 Quick test (3 cycles, 1 min interval)",
            Self::ShowLast => "📊 Show last saved summary",
        };
        write!(f, "{}. {label}", self.number())
    }
}
