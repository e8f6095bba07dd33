#![allow(clippy::unreadable_literal)]

use std::collections::BTreeMap;

use crate::color::{rgb_from_u32, rgb_to_array};
use crate::effect::{DEFAULT_MAX_ROLL_STEPS, EffectId};
use crate::queue::DEFAULT_QUEUE_CAPACITY;
use crate::settings::{Schema, SettingKind, Settings};

use super::DeviceEntry;

pub const DEFAULT_LED_COUNT: usize = 200;
pub const DEFAULT_FPS: u32 = 60;

const OUTPUT_RASPI: &str = "output_raspi";
const OUTPUT_UDP: &str = "output_udp";

/// Output types a device can be routed to
pub const OUTPUT_TYPES: [&str; 2] = [OUTPUT_RASPI, OUTPUT_UDP];

/// Accepted `log_level` values
pub const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Accepted `led_strip` values
pub const LED_STRIPS: &[&str] = &[
    "ws2811_strip_rgb",
    "ws2811_strip_grb",
    "ws2811_strip_brg",
    "sk6812_strip_rgbw",
    "sk6812w_strip",
];

const MAX_LED_COUNT: i64 = 10_000;

pub const GENERAL_SCHEMA: Schema = Schema::new(&[
    ("webserver_port", SettingKind::Int { min: 1, max: 65535 }),
    ("log_level", SettingKind::Choice(LOG_LEVELS)),
    ("max_roll_steps", SettingKind::Int { min: 1, max: 100 }),
    ("output_queue_capacity", SettingKind::Int { min: 1, max: 64 }),
]);

pub const DEVICE_SCHEMA: Schema = Schema::new(&[
    ("device_name", SettingKind::Text),
    ("led_count", SettingKind::Int { min: 0, max: MAX_LED_COUNT }),
    ("led_mid", SettingKind::Int { min: 0, max: MAX_LED_COUNT }),
    ("output_type", SettingKind::Choice(&OUTPUT_TYPES)),
    ("fps", SettingKind::Int { min: 1, max: 240 }),
    ("led_brightness", SettingKind::Int { min: 0, max: 100 }),
]);

const RASPI_SCHEMA: Schema = Schema::new(&[
    ("led_pin", SettingKind::Int { min: 0, max: 40 }),
    ("led_freq_hz", SettingKind::Int { min: 400_000, max: 800_000 }),
    ("led_channel", SettingKind::Int { min: 0, max: 1 }),
    ("led_dma", SettingKind::Int { min: 0, max: 14 }),
    ("led_invert", SettingKind::Bool),
    ("led_strip", SettingKind::Choice(LED_STRIPS)),
]);

const UDP_SCHEMA: Schema = Schema::new(&[
    ("udp_client_ip", SettingKind::Text),
    ("udp_client_port", SettingKind::Int { min: 1, max: 65535 }),
]);

/// Schema of the settings of `output_type`
pub fn output_type_schema(output_type: &str) -> Option<Schema> {
    match output_type {
        OUTPUT_RASPI => Some(RASPI_SCHEMA),
        OUTPUT_UDP => Some(UDP_SCHEMA),
        _ => None,
    }
}

pub fn default_general() -> Settings {
    Settings::new()
        .with("webserver_port", 8080)
        .with("log_level", "info")
        .with("max_roll_steps", DEFAULT_MAX_ROLL_STEPS)
        .with("output_queue_capacity", DEFAULT_QUEUE_CAPACITY)
}

/// Default settings of `output_type`, empty for unknown types
pub fn default_output_settings(output_type: &str) -> Settings {
    match output_type {
        OUTPUT_RASPI => Settings::new()
            .with("led_pin", 18)
            .with("led_freq_hz", 800_000)
            .with("led_channel", 0)
            .with("led_dma", 10)
            .with("led_invert", false)
            .with("led_strip", "ws2811_strip_grb"),
        OUTPUT_UDP => Settings::new()
            .with("udp_client_ip", "127.0.0.1")
            .with("udp_client_port", 7777),
        _ => Settings::new(),
    }
}

pub fn default_effect_settings(effect: EffectId) -> Settings {
    match effect {
        EffectId::Off => Settings::new(),
        EffectId::Single => Settings::new().with("color", "red"),
        EffectId::Gradient => Settings::new()
            .with("gradient", "spectral")
            .with("speed", 10)
            .with("reverse", false)
            .with("mirror", false),
        EffectId::Fade => Settings::new()
            .with("gradient", "spectral")
            .with("speed", 10)
            .with("reverse", false),
        EffectId::Rods => Settings::new()
            .with("color", "white")
            .with("gradient", "spectral")
            .with("change_color", true)
            .with("speed", 10)
            .with("reverse", false)
            .with("mirror", false)
            .with("rods_length", 3)
            .with("rods_distance", 10),
    }
}

pub fn default_device() -> DeviceEntry {
    DeviceEntry {
        settings: Settings::new()
            .with("device_name", "Default Device")
            .with("led_count", DEFAULT_LED_COUNT)
            .with("led_mid", DEFAULT_LED_COUNT / 2)
            .with("output_type", OUTPUT_RASPI)
            .with("fps", DEFAULT_FPS)
            .with("led_brightness", 100),
        active_effect: EffectId::Off,
        effects: EffectId::ALL
            .into_iter()
            .map(|effect| (effect, default_effect_settings(effect)))
            .collect(),
        outputs: OUTPUT_TYPES
            .into_iter()
            .map(|output_type| (output_type.to_owned(), default_output_settings(output_type)))
            .collect(),
    }
}

fn table(entries: &[(&str, u32)]) -> BTreeMap<String, [u8; 3]> {
    entries
        .iter()
        .map(|(id, hex)| ((*id).to_owned(), rgb_to_array(rgb_from_u32(*hex))))
        .collect()
}

fn gradient(stops: &[u32]) -> Vec<[u8; 3]> {
    stops
        .iter()
        .map(|hex| rgb_to_array(rgb_from_u32(*hex)))
        .collect()
}

pub fn default_colors() -> BTreeMap<String, [u8; 3]> {
    table(&[
        ("black", 0x000000),
        ("white", 0xFFFFFF),
        ("red", 0xFF0000),
        ("orange", 0xFF2800),
        ("yellow", 0xFFFF00),
        ("green", 0x00FF00),
        ("blue", 0x0000FF),
        ("cyan", 0x00FFFF),
        ("purple", 0x800080),
        ("pink", 0xFF00B2),
    ])
}

pub fn default_gradients() -> BTreeMap<String, Vec<[u8; 3]>> {
    BTreeMap::from([
        (
            "spectral".to_owned(),
            gradient(&[0xFF0000, 0xFFFF00, 0x00FF00, 0x00FFFF, 0x0000FF, 0xFF00FF]),
        ),
        (
            "dancefloor".to_owned(),
            gradient(&[0xFF0000, 0xFF00B2, 0x0000FF]),
        ),
        (
            "sunset".to_owned(),
            gradient(&[0xFF0000, 0xFF7800, 0xFFC800]),
        ),
        (
            "ocean".to_owned(),
            gradient(&[0x00FFFF, 0x0000FF, 0x000080]),
        ),
        (
            "jungle".to_owned(),
            gradient(&[0x00FF00, 0x228B22, 0xFF7800]),
        ),
        (
            "fruity".to_owned(),
            gradient(&[0xFF7800, 0xFF0000, 0xFF00B2, 0x800080]),
        ),
        (
            "peach".to_owned(),
            gradient(&[0xFF6464, 0xFF8C50, 0xFFC896]),
        ),
        (
            "borealis".to_owned(),
            gradient(&[0x002EB8, 0x00FFD4, 0x14FF78, 0x8800FF]),
        ),
    ])
}
