//! Transition lookup table.
//!
//! Each transition maps to a human label, a description for pickers, and an
//! `xfade` filter fragment parameterized by duration and offset. `Fade` is
//! the exception: it renders as fade-to-black on each side of the cut rather
//! than a blend, so it uses the plain `fade` filter.

use serde::{Deserialize, Serialize};

/// Symbolic transition between two clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Fade,
    Dissolve,
    WipeLeft,
    WipeRight,
    SlideLeft,
    SlideRight,
    ZoomIn,
    ZoomOut,
}

/// Registry entry for one transition.
#[derive(Debug, Clone, Copy)]
pub struct TransitionInfo {
    /// Human-readable label.
    pub label: &'static str,
    /// Short description for pickers.
    pub description: &'static str,
    /// `xfade` transition name, or `None` for the fade-to-black special case.
    pub xfade_name: Option<&'static str>,
}

impl Transition {
    /// Every transition, in display order.
    pub const ALL: [Transition; 8] = [
        Transition::Fade,
        Transition::Dissolve,
        Transition::WipeLeft,
        Transition::WipeRight,
        Transition::SlideLeft,
        Transition::SlideRight,
        Transition::ZoomIn,
        Transition::ZoomOut,
    ];

    /// The symbolic name this transition is stored under.
    pub fn name(self) -> &'static str {
        match self {
            Transition::Fade => "fade",
            Transition::Dissolve => "dissolve",
            Transition::WipeLeft => "wipe_left",
            Transition::WipeRight => "wipe_right",
            Transition::SlideLeft => "slide_left",
            Transition::SlideRight => "slide_right",
            Transition::ZoomIn => "zoom_in",
            Transition::ZoomOut => "zoom_out",
        }
    }

    /// Look up a transition by its symbolic name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Registry entry for this transition.
    pub fn info(self) -> TransitionInfo {
        match self {
            Transition::Fade => TransitionInfo {
                label: "Fade",
                description: "Fade to/from black",
                xfade_name: None,
            },
            Transition::Dissolve => TransitionInfo {
                label: "Dissolve",
                description: "Cross dissolve between clips",
                xfade_name: Some("fade"),
            },
            Transition::WipeLeft => TransitionInfo {
                label: "Wipe Left",
                description: "Wipe from right to left",
                xfade_name: Some("wipeleft"),
            },
            Transition::WipeRight => TransitionInfo {
                label: "Wipe Right",
                description: "Wipe from left to right",
                xfade_name: Some("wiperight"),
            },
            Transition::SlideLeft => TransitionInfo {
                label: "Slide Left",
                description: "Slide in from right",
                xfade_name: Some("slideleft"),
            },
            Transition::SlideRight => TransitionInfo {
                label: "Slide Right",
                description: "Slide in from left",
                xfade_name: Some("slideright"),
            },
            Transition::ZoomIn => TransitionInfo {
                label: "Zoom In",
                description: "Zoom into next clip",
                xfade_name: Some("zoomin"),
            },
            Transition::ZoomOut => TransitionInfo {
                label: "Zoom Out",
                description: "Zoom out to next clip",
                xfade_name: Some("zoomout"),
            },
        }
    }

    /// Render the `xfade` filter fragment for this transition, if it has
    /// one. `offset` is seconds into the first clip where the blend begins.
    pub fn xfade_filter(self, duration: f64, offset: f64) -> Option<String> {
        self.info()
            .xfade_name
            .map(|name| format!("xfade=transition={name}:duration={duration}:offset={offset}"))
    }

    /// Render the one-sided `fade` filter fragment.
    ///
    /// `fade_out` selects fade-to-black at the end of a clip; otherwise the
    /// fragment fades in from black. `start` is seconds into the clip.
    pub fn fade_filter(fade_out: bool, start: f64, duration: f64) -> String {
        let direction = if fade_out { "out" } else { "in" };
        format!("fade=t={direction}:st={start}:d={duration}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trip() {
        for t in Transition::ALL {
            assert_eq!(Transition::from_name(t.name()), Some(t));
        }
        assert_eq!(Transition::from_name("warp_speed"), None);
    }

    #[test]
    fn test_xfade_filter() {
        let filter = Transition::WipeLeft.xfade_filter(0.5, 4.5).unwrap();
        assert_eq!(filter, "xfade=transition=wipeleft:duration=0.5:offset=4.5");
    }

    #[test]
    fn test_fade_has_no_xfade_form() {
        assert!(Transition::Fade.xfade_filter(0.5, 4.5).is_none());
        assert_eq!(
            Transition::fade_filter(true, 9.0, 1.0),
            "fade=t=out:st=9:d=1"
        );
        assert_eq!(
            Transition::fade_filter(false, 0.0, 1.0),
            "fade=t=in:st=0:d=1"
        );
    }

    #[test]
    fn test_registry_is_complete() {
        for t in Transition::ALL {
            let info = t.info();
            assert!(!info.label.is_empty());
            assert!(!info.description.is_empty());
        }
    }
}
