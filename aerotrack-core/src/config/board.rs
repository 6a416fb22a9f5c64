//! Board variants
//!
//! Every supported board is a [`BoardVariant`] whose parameters (pins,
//! feature flags, hardware model, electrical constants) are plain `const`
//! data. The firmware picks the variant at build time; on boards that share
//! an MCU the variant may be refined at runtime by probing the I2C bus.

use aerotrack_hal::BootAction;

/// GPIO port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Port {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    H = 7,
}

/// A GPIO pin identified by port and index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinId {
    /// GPIO port
    pub port: Port,
    /// Pin index within the port (0-15)
    pub index: u8,
}

impl PinId {
    /// Create a pin id
    pub const fn new(port: Port, index: u8) -> Self {
        Self { port, index }
    }

    /// Combined port/pin number (`port * 16 + index`)
    pub const fn pin_port(self) -> u8 {
        (self.port as u8) * 16 + self.index
    }

    /// Parse a pin label such as `"PB6"`
    pub fn parse(label: &str) -> Option<Self> {
        let rest = label.trim().strip_prefix('P')?;
        let mut chars = rest.chars();
        let port = match chars.next()? {
            'A' => Port::A,
            'B' => Port::B,
            'C' => Port::C,
            'D' => Port::D,
            'H' => Port::H,
            _ => return None,
        };
        let index: u8 = chars.as_str().parse().ok()?;
        if index > 15 {
            return None;
        }
        Some(Self { port, index })
    }
}

/// Hardware model advertised to the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HardwareModel {
    /// Classic bench-style tracker
    Retro,
    /// USB-dongle form factor
    Dongle,
}

bitflags::bitflags! {
    /// Optional board features
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BoardFeatures: u8 {
        /// USB virtual serial port wired to the MCU
        const USB_CDC = 1 << 0;
        /// Shutdown parks in serial deep sleep instead of halting
        const SERIAL_DEEP_SLEEP = 1 << 1;
        /// OLED panel header populated
        const OLED = 1 << 2;
        /// GNSS sits behind 1.8V/3.3V level shifters
        const GNSS_LEVEL_SHIFTER = 1 << 3;
        /// GNSS pulse-per-second line routed to the MCU
        const PPS = 1 << 4;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for BoardFeatures {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "BoardFeatures({=u8:#x})", self.bits())
    }
}

/// Pin assignments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BoardPins {
    pub scl: PinId,
    pub sda: PinId,
    pub spi_sck: PinId,
    pub spi_miso: PinId,
    pub spi_mosi: PinId,
    /// Radio chip select, driven by the radio driver
    pub spi_ss: PinId,
    pub gnss_rx: PinId,
    pub gnss_tx: PinId,
    pub gnss_reset: Option<PinId>,
    pub gnss_level_shifter: Option<PinId>,
    pub gnss_pps: Option<PinId>,
    pub battery: PinId,
    pub buzzer: Option<PinId>,
    /// UAT module enable line
    pub uat_enable: Option<PinId>,
}

/// Per-variant parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BoardConfig {
    pub variant: BoardVariant,
    /// Human-readable board name
    pub name: &'static str,
    pub model: HardwareModel,
    pub pins: BoardPins,
    pub features: BoardFeatures,
    /// Variant detected when external I2C pull-ups are present
    pub pullup_variant: Option<BoardVariant>,
    /// Battery divider ratio
    pub adc_divider: f32,
    /// Shutdown threshold in volts; `None` for bus-powered boards
    pub low_battery_volts: Option<f32>,
    pub gnss_baud: u32,
    pub uat_baud: u32,
    /// Bytes requested from the settings EEPROM
    pub eeprom_size: usize,
    /// Fixed over-the-air address replacing the derived chip id
    pub fixed_address: Option<u32>,
}

impl BoardConfig {
    /// Boot action persisted when the application shuts down
    pub fn shutdown_action(&self) -> BootAction {
        if self.features.contains(BoardFeatures::SERIAL_DEEP_SLEEP) {
            BootAction::SerialDeepSleep
        } else {
            BootAction::Shutdown
        }
    }

    /// Check if the board has a given feature
    pub fn has(&self, feature: BoardFeatures) -> bool {
        self.features.contains(feature)
    }
}

/// Errors from board selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BoardError {
    /// Name does not match any variant
    UnknownVariant,
}

/// Supported boards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BoardVariant {
    /// STM32F103CB "Blue Pill" with an RFM95W module
    BluePill,
    /// STM32L073 on the T-Watch expansion board 1.3
    TWatchEb13,
    /// STM32L073 T-Motion 1.1 dongle
    TMotion11,
}

impl BoardVariant {
    /// All variants
    pub const ALL: [BoardVariant; 3] = [
        BoardVariant::BluePill,
        BoardVariant::TWatchEb13,
        BoardVariant::TMotion11,
    ];

    /// Configuration key used in `board.toml`
    pub fn key(self) -> &'static str {
        match self {
            BoardVariant::BluePill => "blue_pill",
            BoardVariant::TWatchEb13 => "twatch_eb_1_3",
            BoardVariant::TMotion11 => "tmotion_1_1",
        }
    }

    /// Look a variant up by its configuration key
    pub fn from_name(name: &str) -> Result<Self, BoardError> {
        Self::ALL
            .into_iter()
            .find(|variant| variant.key() == name)
            .ok_or(BoardError::UnknownVariant)
    }

    /// Parameters for this variant
    pub fn config(self) -> &'static BoardConfig {
        match self {
            BoardVariant::BluePill => &BLUE_PILL,
            BoardVariant::TWatchEb13 => &TWATCH_EB_1_3,
            BoardVariant::TMotion11 => &TMOTION_1_1,
        }
    }
}

/// Refine a build-time variant by probing for external I2C pull-ups
///
/// `read_pulled_down` must configure the pin with an internal pull-down,
/// let it settle, and return whether it still reads high. Both lines must
/// read high twice, 50 ms apart.
pub fn probe_variant<R, D>(
    default: BoardVariant,
    mut read_pulled_down: R,
    mut delay_ms: D,
) -> BoardVariant
where
    R: FnMut(PinId) -> bool,
    D: FnMut(u32),
{
    let config = default.config();
    let Some(detected) = config.pullup_variant else {
        return default;
    };

    let mut line_held_high = |pin: PinId| {
        if !read_pulled_down(pin) {
            return false;
        }
        delay_ms(50);
        read_pulled_down(pin)
    };

    if line_held_high(config.pins.scl) && line_held_high(config.pins.sda) {
        info!("external I2C pull-ups found, board is {}", detected.config().name);
        detected
    } else {
        default
    }
}

const L073_PINS: BoardPins = BoardPins {
    scl: PinId::new(Port::B, 6),
    sda: PinId::new(Port::B, 7),
    spi_sck: PinId::new(Port::B, 13),
    spi_miso: PinId::new(Port::B, 14),
    spi_mosi: PinId::new(Port::B, 15),
    spi_ss: PinId::new(Port::B, 12),
    gnss_rx: PinId::new(Port::C, 11),
    gnss_tx: PinId::new(Port::C, 10),
    gnss_reset: Some(PinId::new(Port::B, 2)),
    gnss_level_shifter: Some(PinId::new(Port::C, 6)),
    gnss_pps: Some(PinId::new(Port::B, 5)),
    battery: PinId::new(Port::C, 4),
    buzzer: Some(PinId::new(Port::A, 8)),
    uat_enable: Some(PinId::new(Port::A, 1)),
};

const SETTINGS_REGION: usize = 64;

pub const BLUE_PILL: BoardConfig = BoardConfig {
    variant: BoardVariant::BluePill,
    name: "BluePill",
    model: HardwareModel::Retro,
    pins: BoardPins {
        scl: PinId::new(Port::B, 6),
        sda: PinId::new(Port::B, 7),
        spi_sck: PinId::new(Port::A, 5),
        spi_miso: PinId::new(Port::A, 6),
        spi_mosi: PinId::new(Port::A, 7),
        spi_ss: PinId::new(Port::A, 4),
        gnss_rx: PinId::new(Port::A, 3),
        gnss_tx: PinId::new(Port::A, 2),
        gnss_reset: None,
        gnss_level_shifter: None,
        gnss_pps: Some(PinId::new(Port::A, 1)),
        battery: PinId::new(Port::B, 1),
        buzzer: Some(PinId::new(Port::B, 8)),
        uat_enable: Some(PinId::new(Port::B, 12)),
    },
    features: BoardFeatures::USB_CDC
        .union(BoardFeatures::OLED)
        .union(BoardFeatures::PPS),
    pullup_variant: None,
    adc_divider: 2.0,
    low_battery_volts: None,
    gnss_baud: 9600,
    uat_baud: 2_000_000,
    eeprom_size: SETTINGS_REGION,
    fixed_address: None,
};

pub const TWATCH_EB_1_3: BoardConfig = BoardConfig {
    variant: BoardVariant::TWatchEb13,
    name: "T-Watch EB 1.3",
    model: HardwareModel::Retro,
    pins: L073_PINS,
    features: BoardFeatures::SERIAL_DEEP_SLEEP
        .union(BoardFeatures::GNSS_LEVEL_SHIFTER)
        .union(BoardFeatures::PPS),
    pullup_variant: Some(BoardVariant::TMotion11),
    adc_divider: 2.0,
    low_battery_volts: Some(3.2),
    gnss_baud: 115_200,
    uat_baud: 2_000_000,
    eeprom_size: SETTINGS_REGION,
    fixed_address: None,
};

pub const TMOTION_1_1: BoardConfig = BoardConfig {
    variant: BoardVariant::TMotion11,
    name: "T-Motion 1.1",
    model: HardwareModel::Dongle,
    pins: L073_PINS,
    features: BoardFeatures::SERIAL_DEEP_SLEEP
        .union(BoardFeatures::GNSS_LEVEL_SHIFTER)
        .union(BoardFeatures::PPS),
    pullup_variant: None,
    adc_divider: 2.0,
    low_battery_volts: Some(3.2),
    gnss_baud: 115_200,
    uat_baud: 2_000_000,
    eeprom_size: SETTINGS_REGION,
    fixed_address: None,
};
