//! Named DMC embroidery threads offered as pattern colors.

use serde::Serialize;

use crate::types::{PipelineError, Rgb};

/// A stranded-cotton thread with its DMC catalogue number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThreadColor {
    /// Display name.
    pub name: &'static str,
    /// DMC catalogue number.
    pub dmc: &'static str,
    /// Screen color.
    pub color: Rgb,
}

/// The thread palette, in display order.
pub const DMC_THREADS: [ThreadColor; 6] = [
    ThreadColor {
        name: "Red",
        dmc: "321",
        color: Rgb::new(0xDE, 0x31, 0x3A),
    },
    ThreadColor {
        name: "Bright Orange",
        dmc: "608",
        color: Rgb::new(0xFF, 0x6C, 0x00),
    },
    ThreadColor {
        name: "Dark Lemon",
        dmc: "444",
        color: Rgb::new(0xFF, 0xBF, 0x00),
    },
    ThreadColor {
        name: "Green",
        dmc: "699",
        color: Rgb::new(0x00, 0x88, 0x48),
    },
    ThreadColor {
        name: "Dark Delft Blue",
        dmc: "798",
        color: Rgb::new(0x40, 0x54, 0x8B),
    },
    ThreadColor {
        name: "Black",
        dmc: "310",
        color: Rgb::BLACK,
    },
];

impl ThreadColor {
    /// Find a thread by name (case-insensitive) or DMC number, with or
    /// without a `DMC` prefix (`"310"`, `"DMC 310"`, `"dmc310"`).
    #[must_use]
    pub fn lookup(query: &str) -> Option<Self> {
        let query = query.trim();
        let code = strip_prefix_ignore_case(query, "dmc").map_or(query, str::trim_start);
        DMC_THREADS
            .into_iter()
            .find(|t| t.dmc == code || t.name.eq_ignore_ascii_case(query))
    }

    /// The thread whose color is exactly `color`, if any.
    #[must_use]
    pub fn for_color(color: Rgb) -> Option<Self> {
        DMC_THREADS.into_iter().find(|t| t.color == color)
    }
}

/// Parse a thread color given as a DMC name or number, or as a
/// `#RRGGBB` hex value.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `text` is neither a known
/// thread nor a valid hex color.
pub fn parse_thread_color(text: &str) -> Result<Rgb, PipelineError> {
    if let Some(thread) = ThreadColor::lookup(text) {
        return Ok(thread.color);
    }
    Rgb::from_hex(text.trim()).map_err(|_| {
        PipelineError::InvalidConfig(format!(
            "unknown thread color {text:?}: expected a DMC name or number, or #RRGGBB"
        ))
    })
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_code_and_name() {
        assert_eq!(ThreadColor::lookup("321").unwrap().name, "Red");
        assert_eq!(ThreadColor::lookup("DMC 798").unwrap().name, "Dark Delft Blue");
        assert_eq!(ThreadColor::lookup("dmc608").unwrap().name, "Bright Orange");
        assert_eq!(ThreadColor::lookup("dark lemon").unwrap().dmc, "444");
        assert!(ThreadColor::lookup("Mauve").is_none());
        assert!(ThreadColor::lookup("").is_none());
    }

    #[test]
    fn codes_and_colors_are_unique() {
        for (i, a) in DMC_THREADS.iter().enumerate() {
            for b in &DMC_THREADS[i + 1..] {
                assert_ne!(a.dmc, b.dmc);
                assert_ne!(a.color, b.color);
            }
        }
    }

    #[test]
    fn reverse_lookup() {
        let green = Rgb::new(0x00, 0x88, 0x48);
        assert_eq!(ThreadColor::for_color(green).unwrap().dmc, "699");
        assert!(ThreadColor::for_color(Rgb::new(1, 2, 3)).is_none());
    }

    #[test]
    fn parse_accepts_threads_and_hex() {
        assert_eq!(parse_thread_color("310").unwrap(), Rgb::BLACK);
        assert_eq!(
            parse_thread_color("#40548b").unwrap(),
            Rgb::new(0x40, 0x54, 0x8B)
        );
        assert!(matches!(
            parse_thread_color("chartreuse"),
            Err(PipelineError::InvalidConfig(_))
        ));
    }
}
