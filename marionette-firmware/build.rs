//! Build script for marionette-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates prop.toml and compiles it into `node_config.rs`
//! - Embeds animation assets, generating placeholders for missing ones

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use marionette_core::animation::{names, FrameGeometry, EYE_GEOMETRY, MOUTH_GEOMETRY};
use marionette_core::config::{
    BusConfig, ChoreographyConfig, ConfigError, NodeConfig, PlaybackConfig,
};

/// Environment overrides for the node identity
const ROLE_ENV: &str = "MARIONETTE_ROLE";
const ADDRESS_ENV: &str = "MARIONETTE_ADDRESS";

/// Boot order of the frame store; an animation's position is its wire id
const ASSETS: [(&str, FrameGeometry); 5] = [
    (names::EYE_IDLE, EYE_GEOMETRY),
    (names::EYE_BLINK, EYE_GEOMETRY),
    (names::MOUTH_IDLE, MOUTH_GEOMETRY),
    (names::NIFRI, EYE_GEOMETRY),
    (names::SPINNY_LAMBDA, EYE_GEOMETRY),
];

struct PropConfig {
    node: NodeConfig,
    bus: BusConfig,
    playback: PlaybackConfig,
    choreography: ChoreographyConfig,
}

fn main() {
    let out_dir = env::var("OUT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|e| fail("OUT_DIR not set", &[e.to_string()]));

    setup_linker(&out_dir);
    let config = load_config();
    write_node_config(&out_dir, &config);
    embed_assets(&out_dir);
}

/// Set up linker search paths for memory.x
fn setup_linker(out_dir: &Path) {
    write_file(&out_dir.join("memory.x"), include_bytes!("memory.x"));

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    if env::var_os("CARGO_FEATURE_DEFMT").is_some() {
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Abort the build with a boxed error message
fn fail(title: &str, lines: &[String]) -> ! {
    let body = lines
        .iter()
        .map(|line| {
            let truncated = if line.len() > 62 {
                format!("{}...", &line[..59])
            } else {
                line.clone()
            };
            format!("║  • {:<62} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n");

    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title, body
    );
}

fn write_file(path: &Path, contents: &[u8]) {
    if let Err(e) = fs::write(path, contents) {
        fail("Failed to write build output", &[format!("{}: {}", path.display(), e)]);
    }
}

/// Read and validate prop.toml
fn load_config() -> PropConfig {
    println!("cargo:rerun-if-changed=prop.toml");
    println!("cargo:rerun-if-env-changed={}", ROLE_ENV);
    println!("cargo:rerun-if-env-changed={}", ADDRESS_ENV);

    let content = fs::read_to_string("prop.toml")
        .unwrap_or_else(|e| fail("Failed to read prop.toml", &[e.to_string()]));

    let value: toml::Value = toml::from_str(&content).unwrap_or_else(|e| {
        let lines: Vec<String> = e.to_string().lines().map(str::to_string).collect();
        fail("Invalid TOML syntax in prop.toml", &lines)
    });

    let mut errors = Vec::new();
    let config = parse_config(&value, &mut errors);

    if !errors.is_empty() {
        fail("Invalid configuration in prop.toml", &errors);
    }

    println!(
        "cargo:warning=prop.toml validated: {} at {}",
        config.node.role.name(),
        config.node.address.name()
    );
    config
}

fn parse_config(value: &toml::Value, errors: &mut Vec<String>) -> PropConfig {
    let role = env::var(ROLE_ENV)
        .ok()
        .or_else(|| read_str(value, "node", "role", errors))
        .unwrap_or_else(|| "worker".to_string());
    let address = env::var(ADDRESS_ENV)
        .ok()
        .or_else(|| read_str(value, "node", "address", errors))
        .unwrap_or_else(|| "worker-0".to_string());

    let node = match NodeConfig::from_names(&role, &address) {
        Ok(node) => node,
        Err(e) => {
            errors.push(describe(e, &role, &address));
            NodeConfig::default()
        }
    };

    let defaults = BusConfig::new();
    let bus = BusConfig {
        baud: read_u32(value, "bus", "baud", defaults.baud, errors),
        packet_gap_ms: read_u32(value, "bus", "packet_gap_ms", defaults.packet_gap_ms, errors),
        rx_timeout_ms: read_u32(value, "bus", "rx_timeout_ms", defaults.rx_timeout_ms, errors),
    };

    let defaults = PlaybackConfig::new();
    let playback = PlaybackConfig {
        tick_hz: read_u32(value, "playback", "tick_hz", defaults.tick_hz, errors),
        autonomous_blink: read_bool(
            value,
            "playback",
            "autonomous_blink",
            defaults.autonomous_blink,
            errors,
        ),
        blink_min_ms: read_u32(value, "playback", "blink_min_ms", defaults.blink_min_ms, errors),
        blink_max_ms: read_u32(value, "playback", "blink_max_ms", defaults.blink_max_ms, errors),
    };

    let defaults = ChoreographyConfig::new();
    let choreography = ChoreographyConfig {
        min_delay_ms: read_u32(
            value,
            "choreography",
            "min_delay_ms",
            defaults.min_delay_ms,
            errors,
        ),
        max_delay_ms: read_u32(
            value,
            "choreography",
            "max_delay_ms",
            defaults.max_delay_ms,
            errors,
        ),
    };

    for (section, result) in [
        ("bus", bus.validate()),
        ("playback", playback.validate()),
        ("choreography", choreography.validate()),
    ] {
        if let Err(e) = result {
            errors.push(format!("[{}] {}", section, describe(e, &role, &address)));
        }
    }

    PropConfig {
        node,
        bus,
        playback,
        choreography,
    }
}

fn describe(e: ConfigError, role: &str, address: &str) -> String {
    match e {
        ConfigError::UnknownRole => format!("unknown role '{}' (dispatcher, worker)", role),
        ConfigError::UnknownAddress => {
            format!("unknown address '{}' (dispatch, worker-0..worker-3)", address)
        }
        ConfigError::RoleAddressMismatch { role, address } => format!(
            "role '{}' cannot use address '{}'",
            role.name(),
            address.name()
        ),
        ConfigError::InvalidBaud => "baud must be non-zero".to_string(),
        ConfigError::InvalidTickRate(hz) => format!("tick_hz {} out of range", hz),
        ConfigError::InvalidRange { min, max } => {
            format!("delay range {}..={} ms is empty or starts at 0", min, max)
        }
    }
}

fn field<'a>(value: &'a toml::Value, section: &str, key: &str) -> Option<&'a toml::Value> {
    value.get(section).and_then(|s| s.get(key))
}

fn read_str(
    value: &toml::Value,
    section: &str,
    key: &str,
    errors: &mut Vec<String>,
) -> Option<String> {
    match field(value, section, key) {
        Some(toml::Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.push(format!("[{}] {} must be a string", section, key));
            None
        }
        None => None,
    }
}

fn read_u32(
    value: &toml::Value,
    section: &str,
    key: &str,
    default: u32,
    errors: &mut Vec<String>,
) -> u32 {
    match field(value, section, key) {
        Some(toml::Value::Integer(n)) => u32::try_from(*n).unwrap_or_else(|_| {
            errors.push(format!("[{}] {} must be 0..={}", section, key, u32::MAX));
            default
        }),
        Some(_) => {
            errors.push(format!("[{}] {} must be an integer", section, key));
            default
        }
        None => default,
    }
}

fn read_bool(
    value: &toml::Value,
    section: &str,
    key: &str,
    default: bool,
    errors: &mut Vec<String>,
) -> bool {
    match field(value, section, key) {
        Some(toml::Value::Boolean(b)) => *b,
        Some(_) => {
            errors.push(format!("[{}] {} must be true or false", section, key));
            default
        }
        None => default,
    }
}

/// Emit the validated configuration as constants
fn write_node_config(out_dir: &Path, config: &PropConfig) {
    let PropConfig {
        node,
        bus,
        playback,
        choreography,
    } = config;

    let source = format!(
        "// Generated by build.rs from prop.toml\n\
        pub const NODE: NodeConfig = NodeConfig {{ role: Role::{:?}, address: Address::{:?} }};\n\
        pub const BUS: BusConfig = BusConfig {{\n    \
            baud: {},\n    packet_gap_ms: {},\n    rx_timeout_ms: {},\n}};\n\
        pub const PLAYBACK: PlaybackConfig = PlaybackConfig {{\n    \
            tick_hz: {},\n    autonomous_blink: {},\n    \
            blink_min_ms: {},\n    blink_max_ms: {},\n}};\n\
        pub const CHOREOGRAPHY: ChoreographyConfig = ChoreographyConfig {{\n    \
            min_delay_ms: {},\n    max_delay_ms: {},\n}};\n",
        node.role,
        node.address,
        bus.baud,
        bus.packet_gap_ms,
        bus.rx_timeout_ms,
        playback.tick_hz,
        playback.autonomous_blink,
        playback.blink_min_ms,
        playback.blink_max_ms,
        choreography.min_delay_ms,
        choreography.max_delay_ms,
    );

    write_file(&out_dir.join("node_config.rs"), source.as_bytes());
}

/// Embed `assets/<name>.animbyte`, or a generated animation when absent
fn embed_assets(out_dir: &Path) {
    println!("cargo:rerun-if-changed=assets");

    let manifest_dir = env::var("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|e| fail("CARGO_MANIFEST_DIR not set", &[e.to_string()]));

    let mut entries = Vec::new();
    for (name, geometry) in ASSETS {
        let asset_path = manifest_dir.join("assets").join(format!("{}.animbyte", name));

        let path = if asset_path.exists() {
            println!("cargo:rerun-if-changed={}", asset_path.display());
            asset_path
        } else {
            println!(
                "cargo:warning=assets/{}.animbyte not found, embedding a generated animation",
                name
            );
            let generated = out_dir.join(format!("{}.animbyte", name));
            write_file(&generated, &procedural::animation(name, geometry));
            generated
        };

        let geometry_const = if geometry == MOUTH_GEOMETRY {
            "MOUTH_GEOMETRY"
        } else {
            "EYE_GEOMETRY"
        };
        entries.push(format!(
            "    Asset {{ name: {:?}, geometry: {}, blob: include_bytes!({:?}) }},",
            name,
            geometry_const,
            path.display().to_string()
        ));
    }

    let source = format!(
        "// Generated by build.rs\n\
        pub static ASSETS: [Asset<'static>; {}] = [\n{}\n];\n",
        entries.len(),
        entries.join("\n")
    );
    write_file(&out_dir.join("assets.rs"), source.as_bytes());
}

/// Small animations so a fresh checkout renders something on every channel
mod procedural {
    use marionette_core::animation::{names, FrameGeometry};

    type Pixel = [u8; 3];

    pub fn animation(name: &str, geometry: FrameGeometry) -> Vec<u8> {
        match name {
            names::EYE_IDLE => render(geometry, 8, pupil),
            names::EYE_BLINK => render(geometry, 6, eyelid),
            names::MOUTH_IDLE => render(geometry, 8, wave),
            names::NIFRI => render(geometry, 4, checker),
            _ => render(geometry, 8, spinner),
        }
    }

    fn render(
        geometry: FrameGeometry,
        frames: u32,
        pixel: fn(FrameGeometry, u32, usize, usize) -> Pixel,
    ) -> Vec<u8> {
        let mut blob = frames.to_le_bytes().to_vec();
        for frame in 0..frames {
            for y in 0..geometry.height {
                for x in 0..geometry.width {
                    blob.extend_from_slice(&pixel(geometry, frame, x, y));
                }
            }
        }
        blob
    }

    fn distance_sq(g: FrameGeometry, x: usize, y: usize) -> i32 {
        let dx = 2 * x as i32 + 1 - g.width as i32;
        let dy = 2 * y as i32 + 1 - g.height as i32;
        (dx * dx + dy * dy) / 4
    }

    /// Iris with a slowly breathing brightness
    fn pupil(g: FrameGeometry, frame: u32, x: usize, y: usize) -> Pixel {
        let level = 16 + 4 * (frame.min(8 - frame)) as u8;
        match distance_sq(g, x, y) {
            0..=4 => [0, 0, 0],
            5..=36 => [0, level, level / 2],
            _ => [0, 0, 0],
        }
    }

    /// Lids closing over the iris and opening again
    fn eyelid(g: FrameGeometry, frame: u32, x: usize, y: usize) -> Pixel {
        let closed_rows = [0, 3, 6, 8, 5, 2][frame as usize % 6];
        if y < closed_rows || y >= g.height.saturating_sub(closed_rows) {
            return [0, 0, 0];
        }
        pupil(g, 0, x, y)
    }

    /// Travelling sine line
    fn wave(g: FrameGeometry, frame: u32, x: usize, y: usize) -> Pixel {
        let phase = (x as f32 + frame as f32 * 4.0) * core::f32::consts::TAU / g.width as f32;
        let row = (g.height as f32 / 2.0) + phase.sin() * 3.0;
        if (y as f32 - row).abs() < 1.0 {
            [24, 4, 0]
        } else {
            [0, 0, 0]
        }
    }

    fn checker(_: FrameGeometry, frame: u32, x: usize, y: usize) -> Pixel {
        if (x / 4 + y / 4 + frame as usize) % 2 == 0 {
            [20, 0, 20]
        } else {
            [0, 0, 0]
        }
    }

    /// Rotating bar
    fn spinner(g: FrameGeometry, frame: u32, x: usize, y: usize) -> Pixel {
        let angle = frame as f32 * core::f32::consts::PI / 8.0;
        let cx = x as f32 + 0.5 - g.width as f32 / 2.0;
        let cy = y as f32 + 0.5 - g.height as f32 / 2.0;
        let across = (cx * angle.sin() - cy * angle.cos()).abs();
        if across < 1.0 {
            [0, 12, 28]
        } else {
            [0, 0, 0]
        }
    }
}
