use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Styles for status output. All status output goes to stderr.
#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub success: Style,
    pub error: Style,
    pub warn: Style,
    pub info: Style,
    pub dim: Style,
    /// Namespace keys, platform names and addresses
    pub accent: Style,
}

impl Theme {
    /// Every style collapses to the empty style when `colored` is false.
    pub fn new(colored: bool) -> Self {
        let pick = |style: Style| if colored { style } else { Style::new() };
        Self {
            header: pick(Style::new().cyan().bold()),
            success: pick(Style::new().green().bold()),
            error: pick(Style::new().red().bold()),
            warn: pick(Style::new().yellow().bold()),
            info: pick(Style::new().magenta()),
            dim: pick(Style::new().dimmed()),
            accent: pick(Style::new().blue()),
        }
    }
}

/// Colour follows stderr, including `CLICOLOR`/`CLICOLOR_FORCE`.
pub fn theme() -> &'static Theme {
    THEME.get_or_init(|| Theme::new(console::colors_enabled_stderr()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use owo_colors::OwoColorize;

    #[test]
    fn test_plain_theme_leaves_text_untouched() {
        let plain = Theme::new(false);
        assert_eq!(format!("{}", "linux".style(plain.accent.clone())), "linux");
        assert_eq!(format!("{}", "ok".style(plain.success.clone())), "ok");

        let colored = Theme::new(true);
        assert_ne!(format!("{}", "linux".style(colored.accent.clone())), "linux");
    }
}
