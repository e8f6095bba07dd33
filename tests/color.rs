mod tests {
    use myrtio_strip_engine::color::{
        FALLBACK_COLOR, Gradient, Palette, Rgb, blend_colors, rgb_from_u32,
    };
    use myrtio_strip_engine::config::{default_colors, default_gradients};
    use myrtio_strip_engine::{EntityKind, Error};

    const RED: Rgb = Rgb { r: 255, g: 0, b: 0 };
    const BLUE: Rgb = Rgb { r: 0, g: 0, b: 255 };
    const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
    const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };

    fn palette() -> Palette {
        Palette::from_tables(&default_colors(), &default_gradients())
    }

    #[test]
    fn test_blend_colors() {
        assert_eq!(blend_colors(RED, BLUE, 0), RED);
        assert_eq!(blend_colors(RED, BLUE, 255), BLUE);
        assert_eq!(
            blend_colors(RED, BLUE, 128),
            Rgb {
                r: 127,
                g: 0,
                b: 128
            }
        );

        assert_eq!(
            blend_colors(BLACK, WHITE, 128),
            Rgb {
                r: 128,
                g: 128,
                b: 128
            }
        );
        assert_eq!(blend_colors(WHITE, BLACK, 255), BLACK);
    }

    #[test]
    fn test_rgb_from_u32() {
        assert_eq!(rgb_from_u32(0xFF0000), RED);
        assert_eq!(
            rgb_from_u32(0x12_34_56),
            Rgb {
                r: 0x12,
                g: 0x34,
                b: 0x56
            }
        );
    }

    #[test]
    fn test_gradient_fill_stretches_stops() {
        let gradient = Gradient::new(vec![RED, BLUE]).unwrap();
        let mut leds = [BLACK; 3];
        gradient.fill(&mut leds);
        assert_eq!(leds[0], RED);
        assert_eq!(leds[1], blend_colors(RED, BLUE, 128));
        assert_eq!(leds[2], BLUE);
    }

    #[test]
    fn test_gradient_stop_wraps() {
        let gradient = Gradient::new(vec![RED, WHITE, BLUE]).unwrap();
        assert_eq!(gradient.stop(3), RED);
        assert_eq!(gradient.next_index(2), 0);
        assert!(Gradient::new(Vec::new()).is_none());
    }

    #[test]
    fn test_palette_resolves_known_ids() {
        let palette = palette();
        assert_eq!(palette.resolve_color("red").unwrap(), RED);
        let spectral = palette.resolve_gradient("spectral").unwrap();
        assert_eq!(spectral.stop(0), RED);
        assert!(spectral.len() > 1);
    }

    #[test]
    fn test_palette_unknown_ids_are_not_found() {
        let palette = palette();
        assert!(matches!(
            palette.resolve_color("mauve"),
            Err(Error::NotFound {
                kind: EntityKind::Color,
                ..
            })
        ));
        assert!(matches!(
            palette.resolve_gradient("mauve"),
            Err(Error::NotFound {
                kind: EntityKind::Gradient,
                ..
            })
        ));
    }

    #[test]
    fn test_palette_fallback_is_white() {
        let palette = palette();
        assert_eq!(palette.color_or_fallback("mauve"), FALLBACK_COLOR);
        assert_eq!(FALLBACK_COLOR, WHITE);
        assert_eq!(palette.gradient_or_fallback("mauve").stops(), &[WHITE]);
    }
}
