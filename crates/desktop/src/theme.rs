use iced::color;
use iced::theme::Palette;
use iced::Theme;

use crate::settings::Appearance;

pub fn resolve_theme(appearance: Appearance) -> Theme {
    let is_dark = match appearance {
        Appearance::Dark => true,
        Appearance::Light => false,
        Appearance::System => detect_system_dark_mode(),
    };

    if is_dark {
        Theme::custom("FaceOverlay Dark", dark_palette())
    } else {
        Theme::custom("FaceOverlay Light", light_palette())
    }
}

fn dark_palette() -> Palette {
    Palette {
        background: color!(0x12, 0x12, 0x14),
        text: color!(0xd6, 0xd6, 0xd6),
        primary: color!(0x3d, 0x5a, 0xfe),
        success: color!(0x30, 0xd1, 0x58),
        warning: color!(0xff, 0xcc, 0x00),
        danger: color!(0xff, 0x45, 0x3a),
    }
}

fn light_palette() -> Palette {
    Palette {
        background: color!(0xfa, 0xfa, 0xfc),
        text: color!(0x1d, 0x1d, 0x1f),
        primary: color!(0x1a, 0x3c, 0xe0),
        success: color!(0x34, 0xc7, 0x59),
        warning: color!(0xff, 0x9f, 0x0a),
        danger: color!(0xd7, 0x00, 0x15),
    }
}

fn detect_system_dark_mode() -> bool {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("defaults")
            .args(["read", "-g", "AppleInterfaceStyle"])
            .output()
            .map(|o| {
                String::from_utf8_lossy(&o.stdout)
                    .trim()
                    .eq_ignore_ascii_case("dark")
            })
            .unwrap_or(true)
    }
    #[cfg(not(target_os = "macos"))]
    {
        true
    }
}
