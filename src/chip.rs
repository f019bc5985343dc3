//! Chip descriptors
//!
//! Each supported part is described by an immutable [`ChipDescriptor`]: the
//! identity byte, the register map and the range/scale table. The driver core
//! only ever talks to the hardware through these tables.

use crate::register::{kx13x, qma6100p, Field};

/// Supported accelerometers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Chip {
    Qma6100p,
    Kx132,
    Kx134,
}

impl Chip {
    /// The register map and constants of the chip
    pub fn descriptor(self) -> &'static ChipDescriptor {
        match self {
            Chip::Qma6100p => &QMA6100P,
            Chip::Kx132 => &KX132,
            Chip::Kx134 => &KX134,
        }
    }
}

/// Full-scale measurement range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RangeCode {
    G2,
    G4,
    G8,
    G16,
    G32,
    G64,
}

/// A supported range, its register code and its count to g scale
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RangeEntry {
    pub range: RangeCode,
    pub code: u8,
    pub scale: f32,
}

impl RangeEntry {
    const fn new(range: RangeCode, code: u8, scale: f32) -> Self {
        RangeEntry { range, code, scale }
    }
}

/// Constants describing one chip variant
#[derive(Debug)]
pub struct ChipDescriptor {
    pub name: &'static str,
    /// Expected value of the identity register
    pub identity: u8,
    /// Default and alternate I2C addresses
    pub addresses: [u8; 2],
    pub map: &'static RegisterMap,
    /// Supported ranges, lowest first
    pub ranges: &'static [RangeEntry],
    /// Output data rate for rate code 0
    pub odr_base_hz: f32,
}

impl ChipDescriptor {
    /// Look up a range by its enumerated value
    pub fn range(&self, range: RangeCode) -> Option<&'static RangeEntry> {
        self.ranges.iter().find(|entry| entry.range == range)
    }

    /// Look up a range by the code stored in the range field
    pub fn range_by_code(&self, code: u8) -> Option<&'static RangeEntry> {
        self.ranges.iter().find(|entry| entry.code == code)
    }

    /// The smallest supported range
    pub fn lowest_range(&self) -> &'static RangeEntry {
        &self.ranges[0]
    }

    /// I2C address to hand to [`I2cTransport::new`](crate::I2cTransport::new)
    ///
    /// `alternate` selects the address used when the address pin is strapped
    /// the other way.
    pub fn i2c_address(&self, alternate: bool) -> u8 {
        self.addresses[alternate as usize]
    }
}

/// How a chip performs a software reset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetScheme {
    /// Write `trigger` to `register`, wait for it to be echoed back, then
    /// write `release`.
    Sentinel { register: u8, trigger: u8, release: u8 },
    /// Set the field and wait for the part to clear it.
    SelfClearing(Field),
}

/// Register fields of one physical interrupt pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinGroup {
    /// The whole pin control register
    pub control: Field,
    pub enable: Field,
    pub active_high: Field,
    pub pulsed: Field,
    pub pulse_width: Field,
    /// Interrupt sources routed to the pin
    pub route: Field,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterruptMap {
    pub pins: [PinGroup; 2],
    /// Reading this register releases latched interrupts
    pub release: u8,
    pub status: u8,
    pub direction: u8,
    pub data_ready: Field,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionMap {
    pub tap_rate: Field,
    pub tilt_rate: Field,
    pub wake_rate: Field,
    pub tap_engine: Field,
    pub tilt_engine: Field,
    pub wake_engine: Field,
    pub sleep_engine: Field,
    pub direction_tap: Field,
    pub double_tap: Field,
    pub force_wake: Field,
    pub force_sleep: Field,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferMap {
    pub threshold: u8,
    pub enable: Field,
    pub resolution: Field,
    pub interrupt: Field,
    pub mode: Field,
    pub status: u8,
    pub clear: u8,
    pub data: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelfTestMap {
    pub trigger: Field,
    pub result: u8,
}

/// Register map of a chip family
///
/// Groups a chip does not have are `None`, operations on them report
/// [`Error::Unsupported`](crate::Error::Unsupported).
#[derive(Debug)]
pub struct RegisterMap {
    pub who_am_i: u8,
    /// First of the six little-endian output registers
    pub output: u8,
    /// Operating (1) or standby (0)
    pub power: Field,
    pub range: Field,
    pub output_data_rate: Field,
    pub high_performance: Option<Field>,
    /// Fields that together enable the data ready engine
    pub data_engine: &'static [Field],
    pub reset: ResetScheme,
    pub interrupts: Option<InterruptMap>,
    pub motion: Option<MotionMap>,
    pub buffer: Option<BufferMap>,
    pub self_test: Option<SelfTestMap>,
}

pub static KX13X_MAP: RegisterMap = RegisterMap {
    who_am_i: kx13x::WHO_AM_I,
    output: kx13x::XOUT_L,
    power: kx13x::cntl1::PC1,
    range: kx13x::cntl1::GSEL,
    output_data_rate: kx13x::odcntl::OSA,
    high_performance: Some(kx13x::cntl1::RES),
    data_engine: &[kx13x::cntl1::DRDYE],
    reset: ResetScheme::SelfClearing(kx13x::cntl2::SRST),
    interrupts: Some(InterruptMap {
        pins: [
            PinGroup {
                control: kx13x::inc1::ALL,
                enable: kx13x::inc1::IEN1,
                active_high: kx13x::inc1::IEA1,
                pulsed: kx13x::inc1::IEL1,
                pulse_width: kx13x::inc1::PW1,
                route: kx13x::inc4::ALL,
            },
            PinGroup {
                control: kx13x::inc5::ALL,
                enable: kx13x::inc5::IEN2,
                active_high: kx13x::inc5::IEA2,
                pulsed: kx13x::inc5::IEL2,
                pulse_width: kx13x::inc5::PW2,
                route: kx13x::inc6::ALL,
            },
        ],
        release: kx13x::INT_REL,
        status: kx13x::INS2,
        direction: kx13x::INS1,
        data_ready: kx13x::ins2::DRDY,
    }),
    motion: Some(MotionMap {
        tap_rate: kx13x::cntl3::OTDT,
        tilt_rate: kx13x::cntl3::OTP,
        wake_rate: kx13x::cntl3::OWUF,
        tap_engine: kx13x::cntl1::TDTE,
        tilt_engine: kx13x::cntl1::TPE,
        wake_engine: kx13x::cntl4::WUFE,
        sleep_engine: kx13x::cntl4::BTSE,
        direction_tap: kx13x::tdtrc::STRE,
        double_tap: kx13x::tdtrc::DTRE,
        force_wake: kx13x::cntl5::MAN_WAKE,
        force_sleep: kx13x::cntl5::MAN_SLEEP,
    }),
    buffer: Some(BufferMap {
        threshold: kx13x::BUF_CNTL1,
        enable: kx13x::buf_cntl2::BUFE,
        resolution: kx13x::buf_cntl2::BRES,
        interrupt: kx13x::buf_cntl2::BFIE,
        mode: kx13x::buf_cntl2::BM,
        status: kx13x::BUF_STATUS_1,
        clear: kx13x::BUF_CLEAR,
        data: kx13x::BUF_READ,
    }),
    self_test: Some(SelfTestMap {
        trigger: kx13x::cntl2::COTC,
        result: kx13x::COTR,
    }),
};

pub static QMA6100P_MAP: RegisterMap = RegisterMap {
    who_am_i: qma6100p::CHIP_ID,
    output: qma6100p::DXL,
    power: qma6100p::pm::MODE_BIT,
    range: qma6100p::fsr::RANGE,
    output_data_rate: qma6100p::bw::ODR,
    high_performance: None,
    data_engine: &[qma6100p::int_en1::INT_DATA_EN, qma6100p::int_map1::INT1_DATA],
    reset: ResetScheme::Sentinel {
        register: qma6100p::SR,
        trigger: 0xB6,
        release: 0x00,
    },
    interrupts: None,
    motion: None,
    buffer: None,
    self_test: None,
};

pub static KX132: ChipDescriptor = ChipDescriptor {
    name: "KX132",
    identity: 0x3D,
    addresses: [0x1F, 0x1E],
    map: &KX13X_MAP,
    ranges: &[
        RangeEntry::new(RangeCode::G2, 0, 0.000061),
        RangeEntry::new(RangeCode::G4, 1, 0.000122),
        RangeEntry::new(RangeCode::G8, 2, 0.000244),
        RangeEntry::new(RangeCode::G16, 3, 0.000488),
    ],
    odr_base_hz: 0.781,
};

pub static KX134: ChipDescriptor = ChipDescriptor {
    name: "KX134",
    identity: 0x46,
    addresses: [0x1F, 0x1E],
    map: &KX13X_MAP,
    ranges: &[
        RangeEntry::new(RangeCode::G8, 0, 0.000244),
        RangeEntry::new(RangeCode::G16, 1, 0.000488),
        RangeEntry::new(RangeCode::G32, 2, 0.000977),
        RangeEntry::new(RangeCode::G64, 3, 0.00195),
    ],
    odr_base_hz: 0.781,
};

pub static QMA6100P: ChipDescriptor = ChipDescriptor {
    name: "QMA6100P",
    identity: 0x90,
    addresses: [0x12, 0x13],
    map: &QMA6100P_MAP,
    ranges: &[
        RangeEntry::new(RangeCode::G2, 0b0001, 0.000244),
        RangeEntry::new(RangeCode::G4, 0b0010, 0.000488),
        RangeEntry::new(RangeCode::G8, 0b0100, 0.000977),
        RangeEntry::new(RangeCode::G16, 0b1000, 0.00195),
        RangeEntry::new(RangeCode::G32, 0b1111, 0.00391),
    ],
    odr_base_hz: 0.781,
};
