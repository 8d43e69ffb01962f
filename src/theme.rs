/// Colour variables injected into every page's style block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub bg: &'static str,
    pub fg: &'static str,
    pub muted: &'static str,
    pub panel: &'static str,
    pub accent: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Gold,
    Cyan,
}

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::Light, Theme::Dark, Theme::Gold, Theme::Cyan];

    /// Unknown names fall back to the default theme.
    pub fn from_name(name: &str) -> Theme {
        Theme::ALL
            .into_iter()
            .find(|theme| theme.name() == name)
            .unwrap_or_default()
    }

    pub fn name(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Gold => "gold",
            Theme::Cyan => "cyan",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Light => "Light",
            Theme::Dark => "Dark",
            Theme::Gold => "Gold",
            Theme::Cyan => "Cyan",
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Light => Palette {
                bg: "#ffffff",
                fg: "#111111",
                muted: "#555555",
                panel: "#f3f3f3",
                accent: "#2b7cff",
            },
            Theme::Dark => Palette {
                bg: "#0f1115",
                fg: "#e8eef8",
                muted: "#9aa6bf",
                panel: "#111418",
                accent: "#4ea1ff",
            },
            Theme::Gold => Palette {
                bg: "#fffaf0",
                fg: "#2b2b2b",
                muted: "#7a5a2a",
                panel: "#fff3d6",
                accent: "#c79b00",
            },
            Theme::Cyan => Palette {
                bg: "#e8fbff",
                fg: "#032a2e",
                muted: "#0f6b73",
                panel: "#dff7f9",
                accent: "#08a6b5",
            },
        }
    }
}
