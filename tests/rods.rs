mod tests {
    use myrtio_strip_engine::color::{Palette, Rgb, rgb_from_u32};
    use myrtio_strip_engine::config::{default_colors, default_effect_settings, default_gradients};
    use myrtio_strip_engine::effect::RodsEffect;
    use myrtio_strip_engine::{Effect, EffectContext, EffectId, Error, Geometry, Settings};

    const RED: Rgb = Rgb { r: 255, g: 0, b: 0 };
    const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    fn palette() -> Palette {
        Palette::from_tables(&default_colors(), &default_gradients())
    }

    fn scenario_settings() -> Settings {
        default_effect_settings(EffectId::Rods)
            .with("color", "red")
            .with("change_color", false)
            .with("speed", 20)
            .with("reverse", false)
            .with("mirror", false)
            .with("rods_length", 2)
            .with("rods_distance", 0)
    }

    fn rods(led_count: usize, led_mid: usize) -> RodsEffect {
        let mut effect = RodsEffect::default();
        effect.initialize(Geometry::new(led_count, led_mid));
        effect
    }

    #[test]
    fn test_frame_width_matches_led_count() {
        let palette = palette();
        for led_count in [0, 1, 3, 10, 57] {
            for speed in [0, 1, 50, 100] {
                for mirror in [false, true] {
                    let settings = default_effect_settings(EffectId::Rods)
                        .with("speed", speed)
                        .with("mirror", mirror);
                    let ctx = EffectContext::new(&settings, &palette);
                    let mut effect = rods(led_count, led_count / 3);
                    for _ in 0..40 {
                        let frame = effect.advance(&ctx).unwrap();
                        assert_eq!(frame.len(), led_count);
                    }
                }
            }
        }
    }

    #[test]
    fn test_two_ticks_paint_first_four_leds() {
        let palette = palette();
        let settings = scenario_settings();
        let ctx = EffectContext::new(&settings, &palette);
        let mut effect = rods(10, 5);

        let first = effect.advance(&ctx).unwrap();
        assert_eq!(&first.pixels()[..2], &[RED; 2]);
        assert_eq!(&first.pixels()[2..], &[BLACK; 8]);

        let second = effect.advance(&ctx).unwrap();
        assert_eq!(&second.pixels()[..4], &[RED; 4]);
        assert_eq!(&second.pixels()[4..], &[BLACK; 6]);
    }

    #[test]
    fn test_reverse_paints_from_the_far_end() {
        let palette = palette();
        let settings = scenario_settings().with("reverse", true);
        let ctx = EffectContext::new(&settings, &palette);
        let mut effect = rods(10, 5);

        effect.advance(&ctx).unwrap();
        let frame = effect.advance(&ctx).unwrap();
        assert_eq!(&frame.pixels()[..6], &[BLACK; 6]);
        assert_eq!(&frame.pixels()[6..], &[RED; 4]);
    }

    #[test]
    fn test_mirror_reflects_around_led_mid() {
        let palette = palette();
        let settings = scenario_settings().with("mirror", true);
        let ctx = EffectContext::new(&settings, &palette);
        let mut effect = rods(10, 5);

        let frame = effect.advance(&ctx).unwrap();
        assert_eq!(&frame.pixels()[..3], &[BLACK; 3]);
        assert_eq!(&frame.pixels()[3..7], &[RED; 4]);
        assert_eq!(&frame.pixels()[7..], &[BLACK; 3]);
    }

    #[test]
    fn test_rods_are_separated_by_distance() {
        let palette = palette();
        let settings = scenario_settings()
            .with("speed", 10)
            .with("rods_length", 1)
            .with("rods_distance", 2);
        let ctx = EffectContext::new(&settings, &palette);
        let mut effect = rods(12, 6);

        let mut frame = effect.advance(&ctx).unwrap();
        for _ in 0..7 {
            frame = effect.advance(&ctx).unwrap();
        }
        // the first rod starts right away, later ones every
        // rods_length + rods_distance + 1 ticks
        let lit: Vec<usize> = frame
            .pixels()
            .iter()
            .enumerate()
            .filter(|(_, pixel)| **pixel == RED)
            .map(|(index, _)| index)
            .collect();
        assert_eq!(lit, vec![0, 3, 4, 7]);
    }

    #[test]
    fn test_change_color_cycles_through_gradient() {
        let palette = palette();
        let settings = scenario_settings()
            .with("change_color", true)
            .with("gradient", "dancefloor")
            .with("rods_length", 0)
            .with("rods_distance", 0);
        let ctx = EffectContext::new(&settings, &palette);
        let mut effect = rods(10, 5);

        let mut frame = effect.advance(&ctx).unwrap();
        for _ in 0..3 {
            frame = effect.advance(&ctx).unwrap();
        }
        let pink = rgb_from_u32(0xFF00B2);
        let blue = rgb_from_u32(0x0000FF);
        // newest rod first: the fourth spawn wrapped back to the first stop
        assert_eq!(&frame.pixels()[0..2], &[RED; 2]);
        assert_eq!(&frame.pixels()[2..4], &[blue; 2]);
        assert_eq!(&frame.pixels()[4..6], &[pink; 2]);
        assert_eq!(&frame.pixels()[6..8], &[RED; 2]);
        assert_eq!(effect.color_index(), Some(0));
    }

    #[test]
    fn test_unknown_color_falls_back_to_white() {
        let palette = palette();
        let settings = scenario_settings().with("color", "mauve");
        let ctx = EffectContext::new(&settings, &palette);
        let mut effect = rods(4, 2);

        let frame = effect.advance(&ctx).unwrap();
        let white = Rgb {
            r: 255,
            g: 255,
            b: 255,
        };
        assert_eq!(&frame.pixels()[..2], &[white; 2]);
    }

    #[test]
    fn test_missing_setting_is_configuration_error() {
        let palette = palette();
        let settings = Settings::new().with("speed", 20);
        let ctx = EffectContext::new(&settings, &palette);
        let mut effect = rods(10, 5);

        assert!(matches!(
            effect.advance(&ctx),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_steps_never_exceed_strip() {
        let palette = palette();
        let settings = scenario_settings().with("speed", 100);
        let ctx = EffectContext::new(&settings, &palette).with_max_roll_steps(50);
        let mut effect = rods(3, 1);

        let frame = effect.advance(&ctx).unwrap();
        assert_eq!(frame.pixels(), &[RED; 3]);
    }
}
