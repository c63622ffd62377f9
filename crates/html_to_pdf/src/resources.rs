//! Font and colour profile binding

use pdf_engine::{FontResolver, FontSource, FontStyle, PdfRendererBuilder};

use crate::FontMap;

/// Where fonts get registered for rendering
pub trait FontRegistry<'a> {
    fn add_font(
        &mut self,
        source: FontSource<'a>,
        family: &str,
        weight: Option<u16>,
        style: Option<FontStyle>,
        subset: bool,
    );
}

impl<'a> FontRegistry<'a> for FontResolver<'a> {
    fn add_font(
        &mut self,
        source: FontSource<'a>,
        family: &str,
        weight: Option<u16>,
        style: Option<FontStyle>,
        subset: bool,
    ) {
        FontResolver::add_font(self, source, family, weight, style, subset);
    }
}

/// Register every font map entry with default weight and style, unsubset.
/// Bytes are only read when the engine first uses the font.
pub fn bind_fonts<'a, R>(registry: &mut R, font_map: &'a FontMap)
where
    R: FontRegistry<'a> + ?Sized,
{
    for (family, bytes) in font_map {
        registry.add_font(FontSource::from_bytes(bytes), family, None, None, false);
        tracing::debug!("adding font '{}' to font map", family);
    }
}

pub fn bind_colour_profile<'a>(builder: &mut PdfRendererBuilder<'a>, colour_profile: &'a [u8]) {
    builder.use_color_profile(colour_profile);
    tracing::debug!(bytes = colour_profile.len(), "attached colour profile");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        added: Vec<(String, usize, Option<u16>, Option<FontStyle>, bool)>,
    }

    impl<'a> FontRegistry<'a> for Recorder {
        fn add_font(
            &mut self,
            source: FontSource<'a>,
            family: &str,
            weight: Option<u16>,
            style: Option<FontStyle>,
            subset: bool,
        ) {
            let len = source.load().len();
            self.added.push((family.to_string(), len, weight, style, subset));
        }
    }

    #[test]
    fn test_every_font_is_registered_with_defaults() {
        let mut font_map = FontMap::new();
        font_map.insert("courier".to_string(), vec![1, 2, 3]);
        font_map.insert("arial".to_string(), vec![4; 10]);

        let mut recorder = Recorder::default();
        bind_fonts(&mut recorder, &font_map);

        assert_eq!(
            recorder.added,
            vec![
                ("arial".to_string(), 10, None, None, false),
                ("courier".to_string(), 3, None, None, false),
            ]
        );
    }

    #[test]
    fn test_empty_font_map_registers_nothing() {
        let mut recorder = Recorder::default();
        bind_fonts(&mut recorder, &FontMap::new());
        assert!(recorder.added.is_empty());
    }

    #[test]
    fn test_engine_resolver_receives_fonts() {
        let mut font_map = FontMap::new();
        font_map.insert("courier".to_string(), vec![0; 8]);

        let mut resolver = FontResolver::new();
        bind_fonts(&mut resolver, &font_map);
        assert!(resolver.is_registered("courier"));
        assert!(!resolver.is_registered("arial"));
    }
}
