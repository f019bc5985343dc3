//! Register codec and register tables
//!
//! Every control setting lives in a bit-field of a single byte register. A
//! [`Field`] describes where the bits are and whether the part has to be in
//! standby for a write to take effect. The tables below declare the register
//! addresses and fields for each supported chip family.

use paste::paste;

/// A named group of bits within a single register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Field {
    /// Register address
    pub register: u8,
    /// Position of the least significant bit
    pub offset: u8,
    /// Number of bits
    pub width: u8,
    /// The part must be in standby while this field is written
    pub gated: bool,
}

impl Field {
    /// Describe the bits `first_bit..=last_bit` of `register`
    pub const fn new(register: u8, first_bit: u8, last_bit: u8, gated: bool) -> Self {
        Field {
            register,
            offset: first_bit,
            width: last_bit - first_bit + 1,
            gated,
        }
    }

    /// Largest value the field can hold
    #[inline]
    pub const fn max(&self) -> u8 {
        ((1u16 << self.width) - 1) as u8
    }

    /// Mask of the field's bits within the register
    #[inline]
    pub const fn mask(&self) -> u8 {
        self.max() << self.offset
    }

    /// Extract the field value from a register byte
    #[inline]
    pub const fn decode(&self, byte: u8) -> u8 {
        (byte & self.mask()) >> self.offset
    }

    /// Replace the field bits of `byte` with `value`
    ///
    /// Returns `None` if `value` does not fit in the field.
    pub const fn encode(&self, byte: u8, value: u8) -> Option<u8> {
        if value > self.max() {
            return None;
        }
        Some((byte & !self.mask()) | (value << self.offset))
    }
}

macro_rules! gate {
    (gated) => {
        true
    };
    (live) => {
        false
    };
}

/// Generates register address constants and their field descriptors
macro_rules! register_map {
    (
        $family: ident,
        $(
            $addr:expr,
            $name:ident($name_lower:ident) {
            #[$doc:meta]
            $(
                $field:ident,
                $first_bit:expr,
                $last_bit:expr,
                $gate:ident;
                #[$field_doc:meta]
            )*
            }
        )*
    ) => {
        paste! {
            pub mod [<$family:lower>] {
                $(
                    #[$doc]
                    pub const $name: u8 = $addr;

                    #[$doc]
                    pub mod $name_lower {
                        #[allow(unused_imports)]
                        use crate::register::Field;

                        $(
                            #[$field_doc]
                            pub const [<$field:upper>]: Field =
                                Field::new(super::$name, $first_bit, $last_bit, gate!($gate));
                        )*
                    }
                )*
            }
        }
    };
}

register_map! {
    KX13X,
    0x08, XOUT_L(xout_l) { /// X axis output, low byte. Y and Z follow
    }
    0x12, COTR(cotr) { /// Command test response
        result, 0, 7, live; /// 0x55 at rest, 0xAA while the command test runs
    }
    0x13, WHO_AM_I(who_am_i) { /// Identity register
        wai, 0, 7, live; /// 0x3D for KX132, 0x46 for KX134
    }
    0x16, INS1(ins1) { /// Tap/double tap direction
        direction, 0, 5, live; /// TLE TRI TDO TUP FD FU
    }
    0x17, INS2(ins2) { /// Interrupt source
        tps, 0, 0, live; /// Tilt position changed
        tdts, 2, 3, live; /// Tap event: 00 none, 01 single, 10 double, 11 unknown
        drdy, 4, 4, live; /// New acceleration data available
        wmi, 5, 5, live; /// Buffer watermark reached
        bfi, 6, 6, live; /// Buffer full
        ffs, 7, 7, live; /// Free fall
    }
    0x1A, INT_REL(int_rel) { /// Interrupt latch release, cleared on read
    }
    0x1B, CNTL1(cntl1) { /// Control register 1
        tpe, 0, 0, gated; /// Tilt position engine enable
        tdte, 2, 2, gated; /// Tap/double tap engine enable
        gsel, 3, 4, gated; /// Acceleration range
        drdye, 5, 5, gated; /// Data ready engine enable
        res, 6, 6, gated; /// High performance mode
        pc1, 7, 7, live; /// Operating mode, 0 standby
    }
    0x1C, CNTL2(cntl2) { /// Control register 2
        cotc, 6, 6, live; /// Command test control, self clearing
        srst, 7, 7, live; /// Software reset, self clearing
    }
    0x1D, CNTL3(cntl3) { /// Control register 3
        owuf, 0, 2, gated; /// Wake-up function output data rate
        otdt, 3, 5, gated; /// Tap/double tap output data rate
        otp, 6, 7, gated; /// Tilt position output data rate
    }
    0x1E, CNTL4(cntl4) { /// Control register 4
        btse, 4, 4, gated; /// Back-to-sleep engine enable
        wufe, 5, 5, gated; /// Wake-up engine enable
    }
    0x1F, CNTL5(cntl5) { /// Control register 5
        man_sleep, 0, 0, live; /// Force the sleep state
        man_wake, 1, 1, live; /// Force the wake state
    }
    0x21, ODCNTL(odcntl) { /// Output data control
        osa, 0, 3, gated; /// Output data rate, 0.781Hz * 2^osa
    }
    0x22, INC1(inc1) { /// Interrupt control 1, physical pin 1
        all, 0, 7, gated; /// Whole register
        iel1, 3, 3, gated; /// Latch (0) or pulse (1)
        iea1, 4, 4, gated; /// Polarity, 1 active high
        ien1, 5, 5, gated; /// Pin enable
        pw1, 6, 7, gated; /// Pulse width
    }
    0x25, INC4(inc4) { /// Interrupt routing to pin 1
        all, 0, 7, gated; /// Whole register
    }
    0x26, INC5(inc5) { /// Interrupt control 5, physical pin 2
        all, 0, 7, gated; /// Whole register
        iel2, 3, 3, gated; /// Latch (0) or pulse (1)
        iea2, 4, 4, gated; /// Polarity, 1 active high
        ien2, 5, 5, gated; /// Pin enable
        pw2, 6, 7, gated; /// Pulse width
    }
    0x27, INC6(inc6) { /// Interrupt routing to pin 2
        all, 0, 7, gated; /// Whole register
    }
    0x2A, TDTRC(tdtrc) { /// Tap/double tap report control
        stre, 0, 0, gated; /// Single tap reporting
        dtre, 1, 1, gated; /// Double tap reporting
    }
    0x5E, BUF_CNTL1(buf_cntl1) { /// Buffer watermark threshold
        smp_th, 0, 7, live; /// Sample threshold
    }
    0x5F, BUF_CNTL2(buf_cntl2) { /// Buffer control 2
        bm, 0, 1, live; /// Operating mode: 0 FIFO, 1 stream, 2 trigger
        bfie, 5, 5, live; /// Buffer full interrupt enable
        bres, 6, 6, live; /// Sample resolution, 1 for 16 bit
        bufe, 7, 7, live; /// Buffer enable
    }
    0x60, BUF_STATUS_1(buf_status_1) { /// Sample level, low byte. Bits 1:0 of the next register are the high bits
    }
    0x62, BUF_CLEAR(buf_clear) { /// Writing any value clears the buffer
    }
    0x63, BUF_READ(buf_read) { /// Buffer output, auto-increment is disabled on this address
    }
}

register_map! {
    QMA6100P,
    0x00, CHIP_ID(chip_id) { /// Identity register
        id, 0, 7, live; /// 0x90
    }
    0x01, DXL(dxl) { /// X axis output, low byte. Y and Z follow
    }
    0x0F, FSR(fsr) { /// Full scale range
        range, 0, 3, gated; /// One-hot range code, 0b1111 for 32g
    }
    0x10, BW(bw) { /// Bandwidth
        odr, 0, 3, gated; /// Output data rate
    }
    0x11, PM(pm) { /// Power mode
        mode_bit, 7, 7, live; /// Active (1) or standby (0)
    }
    0x17, INT_EN1(int_en1) { /// Interrupt enable 1
        int_data_en, 4, 4, live; /// Data ready interrupt enable
    }
    0x1A, INT_MAP1(int_map1) { /// Interrupt mapping 1
        int1_data, 4, 4, live; /// Map data ready to INT1
    }
    0x36, SR(sr) { /// Soft reset, 0xB6 resets, 0x00 releases
        all, 0, 7, live; /// Whole register
    }
}
