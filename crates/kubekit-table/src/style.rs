use crossterm::style::{Color, Stylize};

use kubekit_types::PodStatus;

/// Colour used for a pod phase
pub fn status_color(status: &PodStatus) -> Color {
    match status {
        PodStatus::Running => Color::Green,
        PodStatus::Pending => Color::Yellow,
        PodStatus::Failed => Color::Red,
        PodStatus::Succeeded => Color::Cyan,
        PodStatus::Unknown => Color::DarkGrey,
    }
}

/// Pod phase rendered with its colour
pub fn color_status(status: &PodStatus) -> String {
    status.as_str().with(status_color(status)).to_string()
}

/// Check mark or cross for installed tools
pub fn installed_mark(installed: bool) -> &'static str {
    if installed { "✅" } else { "❌" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_colors() {
        assert_eq!(status_color(&PodStatus::Running), Color::Green);
        assert_eq!(status_color(&PodStatus::Pending), Color::Yellow);
        assert_eq!(status_color(&PodStatus::Failed), Color::Red);
        assert_eq!(status_color(&PodStatus::Succeeded), Color::Cyan);
        assert_eq!(status_color(&PodStatus::Unknown), Color::DarkGrey);
    }

    #[test]
    fn test_colored_text_wraps_status() {
        let colored = color_status(&PodStatus::Failed);
        assert!(colored.starts_with("\x1b["));
        assert!(colored.contains("Failed"));
    }
}
