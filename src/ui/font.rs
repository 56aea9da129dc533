use egui::{FontDefinitions, FontFamily, FontId, epaint::text::FontData};
use egui_phosphor::Variant;

pub const PHOSPHOR_REGULAR: &str = "phosphor_regular";
pub const PHOSPHOR_FILL: &str = "phosphor_fill";

/// Default fonts with both phosphor icon variants registered.
/// Regular icons are reachable from the proportional and monospace families,
/// filled icons only through their own named family.
pub fn get_fonts() -> FontDefinitions {
    let mut fonts = FontDefinitions::default();

    for (name, variant) in [
        (PHOSPHOR_REGULAR, Variant::Regular),
        (PHOSPHOR_FILL, Variant::Fill),
    ] {
        fonts
            .font_data
            .insert(name.into(), FontData::from_static(variant.font_bytes()).into());
        fonts
            .families
            .insert(FontFamily::Name(name.into()), vec![name.into()]);
    }
    for family in [FontFamily::Proportional, FontFamily::Monospace] {
        if let Some(font_keys) = fonts.families.get_mut(&family) {
            font_keys.insert(1.min(font_keys.len()), PHOSPHOR_REGULAR.into());
        }
    }

    fonts
}

/// Filled icon font, used for the transport buttons
pub fn icon_fill(size: f32) -> FontId {
    FontId::new(size, FontFamily::Name(PHOSPHOR_FILL.into()))
}
