mod tests {
    use std::sync::Arc;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    use myrtio_strip_engine::command::DeviceChannel;
    use myrtio_strip_engine::engine::DEFAULT_POLL_INTERVAL;
    use myrtio_strip_engine::{
        ConfigService, ControlHandle, DeviceCommand, DeviceId, DeviceRenderer, EffectId, Engine,
        Error, OutputDriver, PixelBuffer, Rgb, Settings, TickOutcome, frame_queue,
    };

    const RED: Rgb = Rgb { r: 255, g: 0, b: 0 };

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn device_0() -> DeviceId {
        DeviceId::indexed(0)
    }

    /// Defaults with a 10 LED strip showing red rods on device_0
    fn rods_config() -> Arc<ConfigService> {
        let config = ConfigService::with_defaults();
        config
            .set_device_setting(
                &device_0(),
                &Settings::new().with("led_count", 10).with("led_mid", 5),
            )
            .unwrap();
        config
            .set_effect_setting(
                &device_0(),
                EffectId::Rods,
                &Settings::new()
                    .with("color", "red")
                    .with("change_color", false)
                    .with("speed", 20)
                    .with("rods_length", 2)
                    .with("rods_distance", 0),
            )
            .unwrap();
        config.set_active_effect(&device_0(), EffectId::Rods).unwrap();
        Arc::new(config)
    }

    #[test]
    fn test_tick_renders_active_effect() {
        init_logger();
        let config = rods_config();
        let (frame_tx, frame_rx) = frame_queue(4);
        let (_command_tx, command_rx) = DeviceChannel::split();
        let mut renderer = DeviceRenderer::new(device_0(), config, command_rx, frame_tx);

        assert_eq!(renderer.tick().unwrap(), TickOutcome::Rendered { fps: 60 });
        assert_eq!(renderer.tick().unwrap(), TickOutcome::Rendered { fps: 60 });
        assert_eq!(renderer.effect(), EffectId::Rods);

        frame_rx.recv().unwrap();
        let frame = frame_rx.recv().unwrap();
        assert_eq!(frame.len(), 10);
        assert_eq!(&frame.pixels()[..4], &[RED; 4]);
        assert!(frame.pixels()[4..].iter().all(|pixel| *pixel == Rgb::default()));
    }

    #[test]
    fn test_brightness_scales_frames() {
        let config = rods_config();
        config
            .set_device_setting(&device_0(), &Settings::new().with("led_brightness", 50))
            .unwrap();
        let (frame_tx, frame_rx) = frame_queue(1);
        let (_command_tx, command_rx) = DeviceChannel::split();
        let mut renderer = DeviceRenderer::new(device_0(), config, command_rx, frame_tx);

        renderer.tick().unwrap();
        let frame = frame_rx.recv().unwrap();
        assert_eq!(frame.pixels()[0], Rgb { r: 127, g: 0, b: 0 });
    }

    #[test]
    fn test_effect_switch_reinitializes() {
        let config = rods_config();
        let (frame_tx, frame_rx) = frame_queue(4);
        let (_command_tx, command_rx) = DeviceChannel::split();
        let mut renderer =
            DeviceRenderer::new(device_0(), Arc::clone(&config), command_rx, frame_tx);

        renderer.tick().unwrap();
        config.set_active_effect(&device_0(), EffectId::Single).unwrap();
        renderer.tick().unwrap();
        assert_eq!(renderer.effect(), EffectId::Single);

        config.set_active_effect(&device_0(), EffectId::Rods).unwrap();
        renderer.tick().unwrap();

        frame_rx.recv().unwrap();
        assert_eq!(frame_rx.recv().unwrap().pixels(), &[RED; 10]);
        // a fresh rods run: only the first tick's rod is lit
        let restarted = frame_rx.recv().unwrap();
        assert_eq!(&restarted.pixels()[..2], &[RED; 2]);
        assert!(restarted.pixels()[2..].iter().all(|pixel| *pixel == Rgb::default()));
    }

    #[test]
    fn test_geometry_change_resizes_frames() {
        let config = rods_config();
        let (frame_tx, frame_rx) = frame_queue(4);
        let (_command_tx, command_rx) = DeviceChannel::split();
        let mut renderer =
            DeviceRenderer::new(device_0(), Arc::clone(&config), command_rx, frame_tx);

        renderer.tick().unwrap();
        config
            .set_device_setting(
                &device_0(),
                &Settings::new().with("led_count", 0).with("led_mid", 0),
            )
            .unwrap();
        renderer.tick().unwrap();

        assert_eq!(frame_rx.recv().unwrap().len(), 10);
        assert!(frame_rx.recv().unwrap().is_empty());
    }

    #[test]
    fn test_stop_command_ends_rendering() {
        let config = rods_config();
        let (frame_tx, frame_rx) = frame_queue(4);
        let (command_tx, command_rx) = DeviceChannel::split();
        let mut renderer = DeviceRenderer::new(device_0(), config, command_rx, frame_tx);

        command_tx.try_send(DeviceCommand::Stop).unwrap();
        assert_eq!(renderer.tick().unwrap(), TickOutcome::Stopped);
        assert!(frame_rx.is_empty());
    }

    #[test]
    fn test_deleted_device_and_closed_queue_end_rendering() {
        let config = rods_config();
        let (frame_tx, frame_rx) = frame_queue(4);
        let (_command_tx, command_rx) = DeviceChannel::split();
        let mut renderer =
            DeviceRenderer::new(device_0(), Arc::clone(&config), command_rx, frame_tx);

        frame_rx.close();
        assert!(matches!(renderer.tick(), Err(Error::Closed)));

        config.delete_device(&device_0()).unwrap();
        assert!(matches!(renderer.tick(), Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_full_queue_blocks_render_loop() {
        init_logger();
        let config = rods_config();
        let (frame_tx, frame_rx) = frame_queue(1);
        let (_command_tx, command_rx) = DeviceChannel::split();
        let mut renderer = DeviceRenderer::new(device_0(), config, command_rx, frame_tx);
        renderer.tick().unwrap();

        let (done_tx, done_rx) = mpsc::channel();
        let producer = thread::spawn(move || {
            let outcome = renderer.tick();
            done_tx.send(outcome.is_ok()).unwrap();
        });

        assert!(done_rx.recv_timeout(Duration::from_millis(100)).is_err());
        assert_eq!(frame_rx.len(), 1);

        let first = frame_rx.recv().unwrap();
        assert!(done_rx.recv_timeout(Duration::from_secs(5)).unwrap());
        let second = frame_rx.recv().unwrap();
        assert_eq!(&first.pixels()[..2], &[RED; 2]);
        assert_eq!(&second.pixels()[..4], &[RED; 4]);
        producer.join().unwrap();
    }

    #[test]
    fn test_engine_frames_arrive_in_order() {
        init_logger();
        let config = rods_config();
        let (mut engine, _sender) = Engine::new(config);
        engine.start().unwrap();

        let frames = engine.frames(&device_0()).unwrap();
        let mut previous: Option<PixelBuffer> = None;
        for _ in 0..6 {
            let frame = frames.recv_timeout(Duration::from_secs(5)).unwrap();
            if let Some(previous) = previous {
                // every frame is the previous one rolled by two pixels
                assert_eq!(&frame.pixels()[2..], &previous.pixels()[..8]);
            }
            previous = Some(frame);
        }
        engine.shutdown();
    }

    #[test]
    fn test_engine_follows_device_lifecycle() {
        init_logger();
        let config = Arc::new(ConfigService::with_defaults());
        let (mut engine, sender) = Engine::new(Arc::clone(&config));
        let control = ControlHandle::new(Arc::clone(&config), sender);
        engine.start().unwrap();

        let device_1 = control.create_device().unwrap();
        assert_eq!(engine.process_pending(), 1);
        let frames = engine.frames(&device_1).unwrap();
        assert_eq!(frames.recv_timeout(Duration::from_secs(5)).unwrap().len(), 200);

        control.delete_device(&device_1).unwrap();
        assert!(config.contains_device(&device_1));
        engine.process_pending();
        assert!(engine.frames(&device_1).is_none());
        assert!(!config.contains_device(&device_1));
        assert!(frames.is_closed());

        control.reset_settings().unwrap();
        control.create_device().unwrap();
        engine.process_pending();
        assert_eq!(engine.devices().count(), 2);
        engine.shutdown();
    }

    #[test]
    fn test_engine_restarts_worker_of_recreated_device() {
        init_logger();
        let config = Arc::new(ConfigService::with_defaults());
        let (mut engine, sender) = Engine::new(Arc::clone(&config));
        let control = ControlHandle::new(Arc::clone(&config), sender);
        engine.start().unwrap();

        let device_1 = control.create_device().unwrap();
        engine.process_pending();
        let old_frames = engine.frames(&device_1).unwrap();
        assert!(old_frames.recv_timeout(Duration::from_secs(5)).is_some());

        // the worker of device_1 exits once it sees the device gone
        control.reset_settings().unwrap();
        while old_frames.recv_timeout(Duration::from_millis(300)).is_some() {}

        assert_eq!(control.create_device().unwrap(), device_1);
        engine.process_pending();
        let frames = engine.frames(&device_1).unwrap();
        assert!(frames.recv_timeout(Duration::from_secs(5)).is_some());
        engine.shutdown();
    }

    #[test]
    fn test_spawned_engine_applies_effect_changes() {
        init_logger();
        let config = Arc::new(ConfigService::with_defaults());
        config
            .set_effect_setting(&device_0(), EffectId::Single, &Settings::new().with("color", "red"))
            .unwrap();
        let (engine, sender) = Engine::new(Arc::clone(&config));
        let control = ControlHandle::new(config, sender);
        let handle = engine.spawn(DEFAULT_POLL_INTERVAL).unwrap();

        let frames = handle.frames(&device_0()).unwrap();
        control.activate_effect(&device_0(), EffectId::Single).unwrap();

        let all_red = (0..200).any(|_| {
            frames
                .recv_timeout(Duration::from_secs(5))
                .is_some_and(|frame| frame.pixels().iter().all(|pixel| *pixel == RED))
        });
        assert!(all_red);
        handle.stop();
        assert!(frames.is_closed());
    }

    #[derive(Default)]
    struct Recorder {
        frames: Vec<Vec<Rgb>>,
    }

    impl OutputDriver for Recorder {
        fn write(&mut self, colors: &[Rgb]) {
            self.frames.push(colors.to_vec());
        }
    }

    #[test]
    fn test_forward_drains_queue_into_driver() {
        let (frame_tx, frame_rx) = frame_queue(4);
        for _ in 0..3 {
            frame_tx.send(PixelBuffer::from_pixels(vec![RED; 2])).unwrap();
        }
        frame_tx.close();

        let mut recorder = Recorder::default();
        assert_eq!(frame_rx.forward(&mut recorder), 3);
        assert_eq!(recorder.frames, vec![vec![RED; 2]; 3]);
    }
}
