use std::collections::BTreeMap;

use egui::Color32;
use once_cell::sync::Lazy;

use crate::store::graph::RelationKind;

/// Card color scheme: background, border, and text.
#[derive(Copy, Clone, Debug)]
pub struct Palette {
    pub name: &'static str,
    pub bg: Color32,
    pub border: Color32,
    pub text: Color32,
}

pub const PALETTES: &[Palette] = &[
    Palette {
        name: "Parchment",
        bg: Color32::from_rgb(253, 246, 227),
        border: Color32::from_rgb(139, 69, 19),
        text: Color32::from_rgb(46, 32, 16),
    },
    Palette {
        name: "Lion red",
        bg: Color32::from_rgb(116, 0, 1),
        border: Color32::from_rgb(174, 0, 1),
        text: Color32::from_rgb(238, 186, 48),
    },
    Palette {
        name: "Serpent green",
        bg: Color32::from_rgb(26, 71, 42),
        border: Color32::from_rgb(42, 98, 61),
        text: Color32::from_rgb(170, 170, 170),
    },
    Palette {
        name: "Eagle blue",
        bg: Color32::from_rgb(14, 26, 64),
        border: Color32::from_rgb(34, 47, 91),
        text: Color32::from_rgb(148, 107, 45),
    },
    Palette {
        name: "Badger yellow",
        bg: Color32::from_rgb(236, 185, 57),
        border: Color32::from_rgb(240, 199, 94),
        text: Color32::from_rgb(55, 46, 41),
    },
    Palette {
        name: "Dark arts",
        bg: Color32::from_rgb(28, 28, 28),
        border: Color32::BLACK,
        text: Color32::from_rgb(220, 220, 220),
    },
    Palette {
        name: "Ministry purple",
        bg: Color32::from_rgb(75, 0, 130),
        border: Color32::from_rgb(46, 0, 80),
        text: Color32::from_rgb(230, 230, 250),
    },
    Palette {
        name: "Spectral",
        bg: Color32::from_rgb(224, 247, 250),
        border: Color32::from_rgb(178, 235, 242),
        text: Color32::from_rgb(96, 125, 139),
    },
];

/// Out-of-range indices fall back to the first palette.
pub fn palette(idx: usize) -> &'static Palette {
    PALETTES.get(idx).unwrap_or(&PALETTES[0])
}

#[derive(Copy, Clone, Debug)]
pub struct IconDef {
    pub glyph: &'static str,
    pub label: &'static str,
}

pub static ICONS: Lazy<BTreeMap<&'static str, IconDef>> = Lazy::new(|| {
    BTreeMap::from([
        ("wand", IconDef { glyph: "⚡", label: "Wizard" }),
        ("scroll", IconDef { glyph: "📜", label: "Great event" }),
        ("skull", IconDef { glyph: "💀", label: "Villain or death" }),
        ("hat", IconDef { glyph: "🎓", label: "House" }),
        ("potion", IconDef { glyph: "⚗", label: "Potion" }),
        ("crown", IconDef { glyph: "👑", label: "Power" }),
        ("star", IconDef { glyph: "⭐", label: "Destiny" }),
        ("flame", IconDef { glyph: "🔥", label: "Battle" }),
        ("feather", IconDef { glyph: "✒", label: "Messenger" }),
        ("ghost", IconDef { glyph: "👻", label: "Ghost" }),
    ])
});

pub fn icon_glyph(key: &str) -> &'static str {
    ICONS.get(key).map(|i| i.glyph).unwrap_or("⚡")
}

/// Stroke styling for a relation kind. Kind never affects geometry.
#[derive(Copy, Clone, Debug)]
pub struct RelationStyle {
    pub label: &'static str,
    pub color: Color32,
    pub width: f32,
    pub dashed: bool,
}

pub fn relation_style(kind: RelationKind) -> RelationStyle {
    match kind {
        RelationKind::Neutral => RelationStyle {
            label: "Neutral (dashed)",
            color: Color32::from_rgb(92, 64, 51),
            width: 2.0,
            dashed: true,
        },
        RelationKind::Family => RelationStyle {
            label: "Family (solid)",
            color: Color32::from_rgb(46, 32, 16),
            width: 3.0,
            dashed: false,
        },
        RelationKind::Enemy => RelationStyle {
            label: "Enemy (red)",
            color: Color32::from_rgb(139, 0, 0),
            width: 2.0,
            dashed: false,
        },
        RelationKind::Love => RelationStyle {
            label: "Love (pink)",
            color: Color32::from_rgb(216, 27, 96),
            width: 2.0,
            dashed: false,
        },
    }
}

pub const RELATION_CHOICES: &[RelationKind] = &[
    RelationKind::Neutral,
    RelationKind::Family,
    RelationKind::Enemy,
    RelationKind::Love,
];

// Canvas chrome
pub const CANVAS_BG: Color32 = Color32::from_rgb(227, 215, 191);
pub const CANVAS_DOT: Color32 = Color32::from_rgb(211, 196, 169);
pub const SELECTION_RING: Color32 = Color32::from_rgb(212, 175, 55);
pub const EDGE_LABEL: Color32 = Color32::from_rgb(74, 59, 42);
pub const LINK_PREVIEW: Color32 = Color32::from_rgb(139, 69, 19);
