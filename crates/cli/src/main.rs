//! edge-config CLI: command-line configuration tool for the Edge mouse.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use edge_config_core::device::MODEL_NAME;
use edge_config_core::led::{self, LedMode};
use edge_config_core::session::ConfigSession;
use edge_config_core::settings::{Rgb, SettingsRecord, DPI_LEVEL_COUNT};
use edge_config_core::status::Status;
use edge_config_core::transport::HidApiBackend;
use edge_config_core::{dpi, PRODUCT_ID, VENDOR_ID};

#[derive(Parser)]
#[command(
    name = "edge-config",
    version,
    about = "Open-source ZET/ARDOR GAMING Edge mouse configuration"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List HID interfaces exposed by the mouse.
    ListDevices,
    /// Find the configuration interface and print its path.
    Probe,
    /// Read and print the settings stored on the mouse.
    Read {
        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Write settings to the mouse. Unset fields keep their factory values.
    Write(WriteArgs),
    /// Write the factory settings to the mouse.
    RestoreDefaults,
    /// Print the factory settings without touching the mouse.
    Defaults {
        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show which supported DPI a requested value snaps to.
    Quantize {
        /// Requested DPI.
        dpi: u32,
    },
}

#[derive(clap::Args)]
struct WriteArgs {
    /// Start from the settings read from the mouse instead of factory values.
    #[arg(long)]
    from_device: bool,
    /// DPI per level, comma separated (up to 7 values, snapped to supported steps).
    #[arg(long, value_delimiter = ',')]
    dpi: Vec<u32>,
    /// Enable DPI levels (1-7).
    #[arg(long, value_delimiter = ',')]
    enable: Vec<usize>,
    /// Disable DPI levels (1-7).
    #[arg(long, value_delimiter = ',')]
    disable: Vec<usize>,
    /// Level the mouse starts in (1-7).
    #[arg(long)]
    active_level: Option<usize>,
    /// Polling rate in Hz (125, 250, 500 or 1000).
    #[arg(long)]
    polling_rate: Option<u16>,
    /// Button debounce in ms (even, 2-30).
    #[arg(long)]
    debounce: Option<u8>,
    /// Angle snapping.
    #[arg(long)]
    angle_snap: Option<bool>,
    /// Ripple control.
    #[arg(long)]
    ripple_control: Option<bool>,
    /// LED mode: prismo, breathe, steady, neon, tail, colorful-tail, stream,
    /// reaction, heart, off.
    #[arg(long)]
    led_mode: Option<String>,
    /// LED speed: 0 slow, 1 medium, 2 fast.
    #[arg(long)]
    led_speed: Option<u8>,
    /// LED brightness (0-10).
    #[arg(long)]
    brightness: Option<u8>,
    /// Level color as LEVEL=RRGGBB (LEVEL 1-7), repeatable.
    #[arg(long = "color")]
    colors: Vec<String>,
}

impl WriteArgs {
    fn apply(&self, record: &mut SettingsRecord) -> Result<()> {
        if self.dpi.len() > DPI_LEVEL_COUNT {
            bail!("at most {DPI_LEVEL_COUNT} DPI values, got {}", self.dpi.len());
        }
        for (level, &value) in record.dpi_levels.iter_mut().zip(&self.dpi) {
            level.dpi = value;
        }
        for &n in &self.enable {
            record.dpi_levels[level_index(n)?].enabled = true;
        }
        for &n in &self.disable {
            record.dpi_levels[level_index(n)?].enabled = false;
        }
        if let Some(n) = self.active_level {
            record.active_dpi_level = level_index(n)? as u8;
        }
        if let Some(hz) = self.polling_rate {
            record.polling_rate_hz = hz;
        }
        if let Some(ms) = self.debounce {
            record.debounce_ms = ms;
        }
        if let Some(on) = self.angle_snap {
            record.angle_snap = on;
        }
        if let Some(on) = self.ripple_control {
            record.ripple_control = on;
        }
        if let Some(name) = &self.led_mode {
            let mode = LedMode::from_name(name).ok_or_else(|| {
                let valid: Vec<&str> = LedMode::ALL.iter().map(|m| m.name()).collect();
                anyhow!("Unknown LED mode '{name}'. Valid modes: {}", valid.join(", "))
            })?;
            record.led_mode_id = mode.id();
        }
        if let Some(speed) = self.led_speed {
            record.led_speed_level = speed;
        }
        if let Some(brightness) = self.brightness {
            record.led_brightness = brightness;
        }
        for spec in &self.colors {
            let (level, hex) = spec
                .split_once('=')
                .ok_or_else(|| anyhow!("color '{spec}' is not LEVEL=RRGGBB"))?;
            let n: usize = level
                .trim()
                .parse()
                .with_context(|| format!("color level '{level}'"))?;
            let color = Rgb::from_hex(hex.trim())
                .ok_or_else(|| anyhow!("color '{hex}' is not RRGGBB"))?;
            record.palette[level_index(n)?] = color;
        }
        Ok(())
    }
}

/// 1-based level number from the command line to a record index.
fn level_index(n: usize) -> Result<usize> {
    if !(1..=DPI_LEVEL_COUNT).contains(&n) {
        bail!("DPI level {n} out of range (1-{DPI_LEVEL_COUNT})");
    }
    Ok(n - 1)
}

fn open_session() -> Result<ConfigSession<HidApiBackend>> {
    let backend = HidApiBackend::new()?;
    Ok(ConfigSession::new(backend).with_status_sink(|status: &Status| {
        if status.is_failure() {
            eprintln!("{status}");
        } else if *status != Status::Ready {
            println!("{status}");
        }
    }))
}

fn print_settings(record: &SettingsRecord, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
        return Ok(());
    }

    println!("DPI levels:");
    for (i, level) in record.dpi_levels.iter().enumerate() {
        let marker = if usize::from(record.active_dpi_level) == i {
            " (active)"
        } else {
            ""
        };
        println!(
            "  Level {}: {:>5} DPI  {}  {}{marker}",
            i + 1,
            level.dpi,
            if level.enabled { "enabled " } else { "disabled" },
            record.palette[i],
        );
    }
    println!("Polling rate: {} Hz", record.polling_rate_hz);
    println!("Debounce: {} ms", record.debounce_ms);
    println!("Angle snap: {}", on_off(record.angle_snap));
    println!("Ripple control: {}", on_off(record.ripple_control));
    match record.led_mode() {
        Some(mode) => println!("LED mode: {mode}"),
        None => println!("LED mode: unknown ({})", record.led_mode_id),
    }
    println!("LED speed: {}", led::speed_label(record.led_speed_level));
    println!("LED brightness: {}", record.led_brightness);
    Ok(())
}

fn on_off(on: bool) -> &'static str {
    if on {
        "on"
    } else {
        "off"
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::ListDevices => {
            let mut session = open_session()?;
            let interfaces = session.locator_mut().list_interfaces()?;
            if interfaces.is_empty() {
                println!(
                    "No {MODEL_NAME} found (VID: 0x{VENDOR_ID:04X}, PID: 0x{PRODUCT_ID:04X})."
                );
                println!("Ensure the mouse is connected and udev rules are set up.");
            } else {
                for info in &interfaces {
                    println!(
                        "{MODEL_NAME} interface {} (usage page: 0x{:04X}, usage: 0x{:04X}, path: {})",
                        info.interface_number,
                        info.usage_page,
                        info.usage,
                        info.path_lossy()
                    );
                }
            }
        }
        Commands::Probe => {
            let mut session = open_session()?;
            let path = session.probe()?;
            println!("Configuration interface: {path}");
        }
        Commands::Read { json } => {
            let mut session = open_session()?;
            let record = session.read_settings()?;
            print_settings(&record, json)?;
        }
        Commands::Write(args) => {
            let mut session = open_session()?;
            let mut record = if args.from_device {
                session.read_settings()?
            } else {
                SettingsRecord::factory()
            };
            args.apply(&mut record)?;
            tracing::debug!(?record, "Settings to write");
            session.write_settings(&record)?;
        }
        Commands::RestoreDefaults => {
            let mut session = open_session()?;
            session.restore_factory_defaults()?;
        }
        Commands::Defaults { json } => {
            print_settings(&SettingsRecord::factory(), json)?;
        }
        Commands::Quantize { dpi: requested } => {
            let (snapped, raw) = dpi::quantized_raw_byte(requested)?;
            println!("{requested} DPI -> {snapped} DPI (register 0x{raw:02X})");
        }
    }

    Ok(())
}
