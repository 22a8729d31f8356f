//! Hover tooltip as a two-state machine.
//!
//! Transitions are pure; `view` derives what the floating panel should show
//! for a state, which both the server and the generated page script consume.

use crate::index::EducationIndex;
use crate::types::{education_attr, EducationRecord};
use serde::Serialize;

pub const VISIBLE_OPACITY: f64 = 0.9;
pub const FADE_IN_MS: u32 = 200;
pub const FADE_OUT_MS: u32 = 500;
pub const OFFSET_X: f64 = 10.0;
pub const OFFSET_Y: f64 = -30.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HoverEvent {
    Enter { fips: u32, cursor: Cursor },
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TooltipState {
    #[default]
    Hidden,
    Visible { fips: u32, cursor: Cursor },
}

impl TooltipState {
    /// Every enter replaces whatever was shown; leave always hides.
    pub fn apply(self, event: HoverEvent) -> Self {
        match event {
            HoverEvent::Enter { fips, cursor } => TooltipState::Visible { fips, cursor },
            HoverEvent::Leave => TooltipState::Hidden,
        }
    }

    pub fn view(&self, index: &EducationIndex) -> TooltipView {
        match *self {
            TooltipState::Hidden => TooltipView {
                visible: false,
                opacity: 0.0,
                transition_ms: FADE_OUT_MS,
                left: None,
                top: None,
                content: None,
                education: None,
            },
            TooltipState::Visible { fips, cursor } => {
                let record = index.get(fips);
                TooltipView {
                    visible: true,
                    opacity: VISIBLE_OPACITY,
                    transition_ms: FADE_IN_MS,
                    left: Some(cursor.x + OFFSET_X),
                    top: Some(cursor.y + OFFSET_Y),
                    content: Some(TooltipContent::for_county(fips, record)),
                    education: Some(education_attr(
                        record.map(|r| r.bachelors_or_higher),
                    )),
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipContent {
    pub headline: String,
    pub detail: String,
}

impl TooltipContent {
    pub fn for_county(fips: u32, record: Option<&EducationRecord>) -> Self {
        match record {
            Some(r) => Self {
                headline: format!("{}, {}", r.area_name, r.state),
                detail: format!("{}% have a bachelor's degree", r.bachelors_or_higher),
            },
            None => Self {
                headline: format!("Unknown county (FIPS {})", fips),
                detail: "No data available".to_string(),
            },
        }
    }
}

/// What the floating panel looks like for a given state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipView {
    pub visible: bool,
    pub opacity: f64,
    pub transition_ms: u32,
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub content: Option<TooltipContent>,
    /// Value for the panel's `data-education` attribute
    pub education: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> EducationIndex {
        EducationIndex::from_records(vec![EducationRecord {
            fips: 1001,
            state: "AL".to_string(),
            area_name: "Autauga County".to_string(),
            bachelors_or_higher: 21.9,
        }])
    }

    fn enter(fips: u32, x: f64, y: f64) -> HoverEvent {
        HoverEvent::Enter {
            fips,
            cursor: Cursor { x, y },
        }
    }

    #[test]
    fn starts_hidden() {
        let view = TooltipState::default().view(&index());
        assert!(!view.visible);
        assert_eq!(view.opacity, 0.0);
        assert!(view.content.is_none());
    }

    #[test]
    fn enter_shows_offset_panel() {
        let state = TooltipState::Hidden.apply(enter(1001, 100.0, 200.0));
        let view = state.view(&index());
        assert!(view.visible);
        assert_eq!(view.opacity, VISIBLE_OPACITY);
        assert_eq!(view.transition_ms, FADE_IN_MS);
        assert_eq!(view.left, Some(110.0));
        assert_eq!(view.top, Some(170.0));
        assert_eq!(view.education.as_deref(), Some("21.9"));

        let content = view.content.unwrap();
        assert_eq!(content.headline, "Autauga County, AL");
        assert!(content.detail.starts_with("21.9%"));
    }

    #[test]
    fn enter_overwrites_and_leave_hides() {
        let state = TooltipState::Hidden
            .apply(enter(1001, 0.0, 0.0))
            .apply(enter(1003, 5.0, 5.0));
        assert_eq!(
            state,
            TooltipState::Visible {
                fips: 1003,
                cursor: Cursor { x: 5.0, y: 5.0 }
            }
        );

        let hidden = state.apply(HoverEvent::Leave);
        assert_eq!(hidden, TooltipState::Hidden);
        assert_eq!(hidden.view(&index()).transition_ms, FADE_OUT_MS);
        assert_eq!(hidden.apply(HoverEvent::Leave), TooltipState::Hidden);
    }

    #[test]
    fn missing_record_gets_fallback_text() {
        let view = TooltipState::Hidden.apply(enter(9999, 1.0, 1.0)).view(&index());
        let content = view.content.unwrap();
        assert_eq!(content.headline, "Unknown county (FIPS 9999)");
        assert_eq!(content.detail, "No data available");
        assert_eq!(view.education.as_deref(), Some("undefined"));
    }
}
