use eframe::egui::Color32;

use crate::atlas::Rgb;
use crate::profile::compare::{Relevance, classify_relevance};

/// Accent for genres only the signed-in listener scores.
const SELF_COLOR: Rgb = Rgb::new(0x1d, 0xb9, 0x54);
/// Accent for genres only the compared listener scores.
const FRIEND_COLOR: Rgb = Rgb::new(0xff, 0x6b, 0x6b);

const BASE_RADIUS: f32 = 6.0;
const SCORED_RADIUS_BASE: f32 = 8.0;
const SCORED_RADIUS_SPAN: f32 = 12.0;
const SEARCH_RADIUS: f32 = 30.0;
const NEITHER_RADIUS: f32 = 4.0;
const SHARED_RADIUS_FACTOR: f32 = 1.3;

/// Resolved appearance of one node for this frame. Radius is in screen
/// pixels and does not scale with zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeStyle {
    pub radius: f32,
    pub fill: Color32,
    pub label: Color32,
    /// Label is drawn regardless of the zoom legibility gate.
    pub always_label: bool,
}

/// Which overlays are active this frame.
#[derive(Debug, Clone, Copy)]
pub struct OverlayState {
    pub has_profile: bool,
    pub comparing: bool,
    pub relevance_threshold: f32,
}

/// Decides how one node looks. Comparison coloring wins over the
/// personal overlay; a search match then overrides size and opacity
/// while keeping the hue the active overlay chose.
pub fn node_style(
    color: Rgb,
    own_score: f32,
    friend_score: f32,
    search_match: bool,
    overlay: &OverlayState,
) -> NodeStyle {
    let (mut radius, mut opacity, hue, label) = if overlay.comparing {
        comparison_appearance(color, own_score, friend_score, overlay.relevance_threshold)
    } else if overlay.has_profile {
        personal_appearance(color, own_score, overlay.relevance_threshold)
    } else {
        (BASE_RADIUS, 0.5, color, dim_white())
    };

    if search_match {
        radius = SEARCH_RADIUS;
        opacity = 1.0;
    }

    NodeStyle {
        radius,
        fill: with_opacity(hue, opacity),
        label,
        always_label: search_match,
    }
}

fn personal_appearance(color: Rgb, score: f32, threshold: f32) -> (f32, f32, Rgb, Color32) {
    if score > threshold {
        let hue = brighten(color, 1.0 + score * 0.5);
        (
            SCORED_RADIUS_BASE + score * SCORED_RADIUS_SPAN,
            0.6 + score * 0.4,
            hue,
            with_opacity(hue, 1.0),
        )
    } else {
        (BASE_RADIUS, 0.35, desaturate(color, 0.6), dim_white())
    }
}

fn comparison_appearance(
    color: Rgb,
    own: f32,
    friend: f32,
    threshold: f32,
) -> (f32, f32, Rgb, Color32) {
    match classify_relevance(own, friend, threshold) {
        Relevance::Shared => {
            let strength = own.max(friend);
            let hue = brighten(blend(SELF_COLOR, FRIEND_COLOR, 0.5), 1.0 + strength * 0.5);
            (
                (SCORED_RADIUS_BASE + strength * SCORED_RADIUS_SPAN) * SHARED_RADIUS_FACTOR,
                (0.6 + strength * 0.4).min(1.0),
                hue,
                with_opacity(hue, 1.0),
            )
        }
        Relevance::SelfOnly => (
            SCORED_RADIUS_BASE + own * SCORED_RADIUS_SPAN,
            0.6 + own * 0.4,
            SELF_COLOR,
            with_opacity(SELF_COLOR, 1.0),
        ),
        Relevance::FriendOnly => (
            SCORED_RADIUS_BASE + friend * SCORED_RADIUS_SPAN,
            0.6 + friend * 0.4,
            FRIEND_COLOR,
            with_opacity(FRIEND_COLOR, 1.0),
        ),
        Relevance::Neither => (NEITHER_RADIUS, 0.25, luma_grey(color), dim_white()),
    }
}

/// Legend colors for the comparison side panel.
pub fn legend_colors() -> (Color32, Color32, Color32) {
    (
        with_opacity(SELF_COLOR, 1.0),
        with_opacity(FRIEND_COLOR, 1.0),
        with_opacity(blend(SELF_COLOR, FRIEND_COLOR, 0.5), 1.0),
    )
}

pub fn with_opacity(color: Rgb, opacity: f32) -> Color32 {
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, alpha)
}

fn dim_white() -> Color32 {
    Color32::from_rgba_unmultiplied(255, 255, 255, 178)
}

/// Scales channels toward white, saturating at 255.
fn brighten(color: Rgb, factor: f32) -> Rgb {
    let scale = |channel: u8| -> u8 { ((f32::from(channel) * factor).round()).min(255.0) as u8 };
    Rgb::new(scale(color.r), scale(color.g), scale(color.b))
}

/// Rec. 601 luma, the perceived brightness of the hue.
fn luma_grey(color: Rgb) -> Rgb {
    let luma = 0.299 * f32::from(color.r) + 0.587 * f32::from(color.g) + 0.114 * f32::from(color.b);
    let level = luma.round().min(255.0) as u8;
    Rgb::new(level, level, level)
}

/// Moves the hue toward its grey by `amount` in 0..1.
fn desaturate(color: Rgb, amount: f32) -> Rgb {
    blend(color, luma_grey(color), amount)
}

fn blend(a: Rgb, b: Rgb, t: f32) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let mix = |from: u8, to: u8| -> u8 {
        (f32::from(from) + (f32::from(to) - f32::from(from)) * t).round() as u8
    };
    Rgb::new(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: OverlayState = OverlayState {
        has_profile: false,
        comparing: false,
        relevance_threshold: 0.1,
    };
    const PERSONAL: OverlayState = OverlayState {
        has_profile: true,
        comparing: false,
        relevance_threshold: 0.1,
    };
    const COMPARING: OverlayState = OverlayState {
        has_profile: true,
        comparing: true,
        relevance_threshold: 0.1,
    };

    #[test]
    fn anonymous_nodes_use_canonical_color_at_half_opacity() {
        let style = node_style(Rgb::new(200, 40, 80), 0.0, 0.0, false, &PLAIN);
        assert_eq!(style.radius, 6.0);
        assert_eq!(style.fill, Color32::from_rgba_unmultiplied(200, 40, 80, 128));
        assert!(!style.always_label);
    }

    #[test]
    fn scored_radius_and_opacity_grow_with_score() {
        let style = node_style(Rgb::new(100, 100, 100), 1.0, 0.0, false, &PERSONAL);
        assert!((style.radius - 20.0).abs() < 1e-6);
        assert_eq!(style.fill.a(), 255);

        let faint = node_style(Rgb::new(100, 100, 100), 0.2, 0.0, false, &PERSONAL);
        assert!((faint.radius - (8.0 + 0.2 * 12.0)).abs() < 1e-6);
    }

    #[test]
    fn below_threshold_scores_render_desaturated() {
        let style = node_style(Rgb::new(200, 40, 80), 0.05, 0.0, false, &PERSONAL);
        assert_eq!(style.radius, 6.0);
        // 0.35 opacity.
        assert_eq!(style.fill.a(), 89);
        // Channels moved toward the shared grey.
        assert!(style.fill.r() < 200);
        assert!(style.fill.g() > 40);
    }

    #[test]
    fn search_match_overrides_size_but_not_hue() {
        let plain = node_style(Rgb::new(10, 200, 30), 0.0, 0.0, false, &PLAIN);
        let matched = node_style(Rgb::new(10, 200, 30), 0.0, 0.0, true, &PLAIN);
        assert_eq!(matched.radius, 30.0);
        assert_eq!(matched.fill.a(), 255);
        assert!(matched.always_label);
        assert_eq!(
            (matched.fill.r(), matched.fill.g(), matched.fill.b()),
            (plain.fill.r(), plain.fill.g(), plain.fill.b())
        );
    }

    #[test]
    fn comparison_classes_pick_their_accents() {
        let own_only = node_style(Rgb::new(1, 2, 3), 0.8, 0.0, false, &COMPARING);
        assert_eq!(
            (own_only.fill.r(), own_only.fill.g(), own_only.fill.b()),
            (0x1d, 0xb9, 0x54)
        );

        let friend_only = node_style(Rgb::new(1, 2, 3), 0.0, 0.8, false, &COMPARING);
        assert_eq!(
            (friend_only.fill.r(), friend_only.fill.g(), friend_only.fill.b()),
            (0xff, 0x6b, 0x6b)
        );

        let shared = node_style(Rgb::new(1, 2, 3), 0.5, 0.9, false, &COMPARING);
        let unshared_radius = 8.0 + 0.9 * 12.0;
        assert!((shared.radius - unshared_radius * 1.3).abs() < 1e-4);

        let neither = node_style(Rgb::new(200, 40, 80), 0.05, 0.0, false, &COMPARING);
        assert_eq!(neither.radius, 4.0);
        assert_eq!(neither.fill.r(), neither.fill.g());
        assert_eq!(neither.fill.g(), neither.fill.b());
        assert_eq!(neither.fill.a(), 64);
    }

    #[test]
    fn comparison_wins_over_personal_overlay() {
        // Same inputs, only the comparing flag differs.
        let personal = node_style(Rgb::new(9, 9, 200), 0.9, 0.9, false, &PERSONAL);
        let comparing = node_style(Rgb::new(9, 9, 200), 0.9, 0.9, false, &COMPARING);
        assert_ne!(personal.fill, comparing.fill);
        assert!(comparing.radius > personal.radius);
    }

    #[test]
    fn brighten_saturates_at_white() {
        let bright = brighten(Rgb::new(200, 250, 10), 1.5);
        assert_eq!(bright, Rgb::new(255, 255, 15));
    }

    #[test]
    fn luma_grey_weighs_green_heaviest() {
        let grey = luma_grey(Rgb::new(0, 255, 0));
        assert_eq!(grey.r, 150);
        let grey = luma_grey(Rgb::new(255, 0, 0));
        assert_eq!(grey.r, 76);
    }
}
