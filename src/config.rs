//! Device configuration words (config bits).
//!
//! PIC32MZ parts read their fuse values from fixed words at the top of
//! boot flash. The [`config_words!`](crate::config_words) macro places the
//! chosen values into the absolute sections the linker script pins at the
//! right addresses; the constant families below build the values, one
//! module per word, combined with `|`.
//!
//! ```ignore
//! use pic32mz_rt::config_words;
//! use pic32mz_rt::config::{devcfg1, devcfg2};
//!
//! config_words! {
//!     DEVCFG1 = devcfg1::FNOSC_SPLL
//!         | devcfg1::POSCMOD_HS
//!         | devcfg1::FCKSM_CSDCMD
//!         | devcfg1::FWDTEN_OFF,
//!     DEVCFG2 = devcfg2::FPLLIDIV_DIV_1
//!         | devcfg2::FPLLRNG_RANGE_5_10
//!         | devcfg2::fpllmult(50)
//!         | devcfg2::FPLLODIV_DIV_2,
//! }
//! ```
//!
//! Invoke the macro once per program.

/// Address of DEVCFG0 in the lower boot alias.
pub const DEVCFG0_ADDR: u32 = 0xBFC0_FFCC;
/// Address of DEVCFG1.
pub const DEVCFG1_ADDR: u32 = 0xBFC0_FFC8;
/// Address of DEVCFG2.
pub const DEVCFG2_ADDR: u32 = 0xBFC0_FFC4;
/// Address of DEVCFG3.
pub const DEVCFG3_ADDR: u32 = 0xBFC0_FFC0;
/// Address of the boot flash 1 sequence word.
pub const BF1SEQ0_ADDR: u32 = 0xBFC0_FF40;

/// DEVCFG0: debug and code protection.
pub mod devcfg0 {
    /* DEBUG - background debugger */
    pub const DEBUG_ON: u32 = 0 << 0;
    pub const DEBUG_OFF: u32 = 3 << 0;

    /* JTAGEN - JTAG port */
    pub const JTAGEN_ON: u32 = 1 << 2;
    pub const JTAGEN_OFF: u32 = 0 << 2;

    /* ICESEL - ICE communication channel */
    pub const ICESEL_ICS_PGX1: u32 = 3 << 3;
    pub const ICESEL_ICS_PGX2: u32 = 2 << 3;

    /* TRCEN - instruction trace */
    pub const TRCEN_ON: u32 = 1 << 5;
    pub const TRCEN_OFF: u32 = 0 << 5;

    /* BOOTISA - boot instruction set */
    pub const BOOTISA_MIPS32: u32 = 1 << 6;
    pub const BOOTISA_MICROMIPS: u32 = 0 << 6;

    /* FECCCON - flash ECC */
    pub const FECCCON_ON: u32 = 3 << 8;
    pub const FECCCON_DYNAMIC: u32 = 2 << 8;
    pub const FECCCON_OFF: u32 = 1 << 8;

    /* FSLEEP - flash power-down in sleep */
    pub const FSLEEP_OFF: u32 = 1 << 10;
    pub const FSLEEP_ON: u32 = 0 << 10;

    /* DBGPER - debug-mode peripheral access */
    pub const DBGPER_PG_ALL: u32 = 7 << 12;
    pub const DBGPER_PG_2_1: u32 = 3 << 12;
    pub const DBGPER_PG_1: u32 = 1 << 12;
    pub const DBGPER_DENY_ALL: u32 = 0 << 12;

    /* SMCLR - soft master clear */
    pub const SMCLR_MCLR_NORM: u32 = 1 << 15;
    pub const SMCLR_MCLR_POR: u32 = 0 << 15;

    /* SOSCGAIN - secondary oscillator gain */
    pub const SOSCGAIN_0: u32 = 0 << 16;
    pub const SOSCGAIN_1: u32 = 1 << 16;
    pub const SOSCGAIN_2: u32 = 2 << 16;
    pub const SOSCGAIN_3: u32 = 3 << 16;

    /* SOSCBOOST - secondary oscillator boost */
    pub const SOSCBOOST_ON: u32 = 1 << 18;
    pub const SOSCBOOST_OFF: u32 = 0 << 18;

    /* POSCGAIN - primary oscillator gain */
    pub const POSCGAIN_0: u32 = 0 << 19;
    pub const POSCGAIN_1: u32 = 1 << 19;
    pub const POSCGAIN_2: u32 = 2 << 19;
    pub const POSCGAIN_3: u32 = 3 << 19;

    /* POSCBOOST - primary oscillator boost */
    pub const POSCBOOST_ON: u32 = 1 << 21;
    pub const POSCBOOST_OFF: u32 = 0 << 21;

    /* EJTAGBEN - EJTAG boot */
    pub const EJTAGBEN_NORMAL: u32 = 1 << 24;
    pub const EJTAGBEN_REDUCED: u32 = 0 << 24;

    /* CP - code protect */
    pub const CP_OFF: u32 = 1 << 28;
    pub const CP_ON: u32 = 0 << 28;

    /// All non-field bits set, for conservative programming.
    pub const DEFAULT: u32 = 0x7FFF_FFFF;
}

/// DEVCFG1: oscillator and watchdog.
pub mod devcfg1 {
    /* FNOSC - oscillator selection */
    pub const FNOSC_FRC: u32 = 0 << 0;
    pub const FNOSC_SPLL: u32 = 1 << 0;
    pub const FNOSC_POSC: u32 = 2 << 0;
    pub const FNOSC_SOSC: u32 = 4 << 0;
    pub const FNOSC_LPRC: u32 = 5 << 0;
    pub const FNOSC_FRCDIV: u32 = 7 << 0;

    /* DMTINTV - deadman count window interval */
    pub const DMTINTV_WIN_127_128: u32 = 7 << 3;
    pub const DMTINTV_WIN_63_64: u32 = 6 << 3;
    pub const DMTINTV_WIN_31_32: u32 = 5 << 3;
    pub const DMTINTV_WIN_15_16: u32 = 4 << 3;
    pub const DMTINTV_WIN_7_8: u32 = 3 << 3;
    pub const DMTINTV_WIN_3_4: u32 = 2 << 3;
    pub const DMTINTV_WIN_1_2: u32 = 1 << 3;
    pub const DMTINTV_WIN_0: u32 = 0 << 3;

    /* FSOSCEN - secondary oscillator */
    pub const FSOSCEN_ON: u32 = 1 << 6;
    pub const FSOSCEN_OFF: u32 = 0 << 6;

    /* IESO - two-speed startup */
    pub const IESO_ON: u32 = 1 << 7;
    pub const IESO_OFF: u32 = 0 << 7;

    /* POSCMOD - primary oscillator mode */
    pub const POSCMOD_EC: u32 = 0 << 8;
    pub const POSCMOD_HS: u32 = 2 << 8;
    pub const POSCMOD_OFF: u32 = 3 << 8;

    /* OSCIOFNC - CLKO output */
    pub const OSCIOFNC_OFF: u32 = 1 << 10;
    pub const OSCIOFNC_ON: u32 = 0 << 10;

    /* FCKSM - clock switching and monitoring */
    pub const FCKSM_CSECME: u32 = 0 << 14;
    pub const FCKSM_CSECMD: u32 = 1 << 14;
    pub const FCKSM_CSDCMD: u32 = 3 << 14;

    /* WDTPS - watchdog postscaler, PS1 .. PS1048576 */
    pub const WDTPS_PS1: u32 = 0 << 16;
    pub const WDTPS_PS2: u32 = 1 << 16;
    pub const WDTPS_PS4: u32 = 2 << 16;
    pub const WDTPS_PS8: u32 = 3 << 16;
    pub const WDTPS_PS16: u32 = 4 << 16;
    pub const WDTPS_PS32: u32 = 5 << 16;
    pub const WDTPS_PS64: u32 = 6 << 16;
    pub const WDTPS_PS128: u32 = 7 << 16;
    pub const WDTPS_PS256: u32 = 8 << 16;
    pub const WDTPS_PS512: u32 = 9 << 16;
    pub const WDTPS_PS1024: u32 = 10 << 16;
    pub const WDTPS_PS2048: u32 = 11 << 16;
    pub const WDTPS_PS4096: u32 = 12 << 16;
    pub const WDTPS_PS8192: u32 = 13 << 16;
    pub const WDTPS_PS16384: u32 = 14 << 16;
    pub const WDTPS_PS32768: u32 = 15 << 16;
    pub const WDTPS_PS65536: u32 = 16 << 16;
    pub const WDTPS_PS131072: u32 = 17 << 16;
    pub const WDTPS_PS262144: u32 = 18 << 16;
    pub const WDTPS_PS524288: u32 = 19 << 16;
    pub const WDTPS_PS1048576: u32 = 20 << 16;

    /* WDTSPGM - watchdog during flash programming */
    pub const WDTSPGM_STOP: u32 = 1 << 21;
    pub const WDTSPGM_RUN: u32 = 0 << 21;

    /* WINDIS - watchdog window mode */
    pub const WINDIS_NORMAL: u32 = 1 << 22;
    pub const WINDIS_WINDOW: u32 = 0 << 22;

    /* FWDTEN - watchdog enable */
    pub const FWDTEN_ON: u32 = 1 << 23;
    pub const FWDTEN_OFF: u32 = 0 << 23;

    /* FWDTWINSZ - watchdog window size */
    pub const FWDTWINSZ_WINSZ_75: u32 = 0 << 24;
    pub const FWDTWINSZ_WINSZ_50: u32 = 1 << 24;
    pub const FWDTWINSZ_WINSZ_37: u32 = 2 << 24;
    pub const FWDTWINSZ_WINSZ_25: u32 = 3 << 24;

    /// DMTCNT - deadman timer count select, `n` in 8..=31 selects 2^n.
    pub const fn dmtcnt(n: u32) -> u32 {
        (n - 8) << 26
    }
    pub const DMTCNT_DMT31: u32 = 23 << 26;

    /* FDMTEN - deadman timer enable */
    pub const FDMTEN_ON: u32 = 1 << 31;
    pub const FDMTEN_OFF: u32 = 0 << 31;

    /// All non-field bits set, for conservative programming.
    pub const DEFAULT: u32 = 0xFFFF_FFFF;
}

/// DEVCFG2: PLL configuration.
pub mod devcfg2 {
    /* FPLLIDIV - PLL input divider */
    pub const FPLLIDIV_DIV_1: u32 = 0 << 0;
    pub const FPLLIDIV_DIV_2: u32 = 1 << 0;
    pub const FPLLIDIV_DIV_3: u32 = 2 << 0;
    pub const FPLLIDIV_DIV_4: u32 = 3 << 0;
    pub const FPLLIDIV_DIV_5: u32 = 4 << 0;
    pub const FPLLIDIV_DIV_6: u32 = 5 << 0;
    pub const FPLLIDIV_DIV_7: u32 = 6 << 0;
    pub const FPLLIDIV_DIV_8: u32 = 7 << 0;

    /* FPLLRNG - PLL input frequency range */
    pub const FPLLRNG_BYPASS: u32 = 0 << 4;
    pub const FPLLRNG_RANGE_5_10: u32 = 1 << 4;
    pub const FPLLRNG_RANGE_8_16: u32 = 2 << 4;
    pub const FPLLRNG_RANGE_13_26: u32 = 3 << 4;
    pub const FPLLRNG_RANGE_21_42: u32 = 4 << 4;
    pub const FPLLRNG_RANGE_34_64: u32 = 5 << 4;

    /* FPLLICLK - PLL input clock source */
    pub const FPLLICLK_PLL_FRC: u32 = 1 << 7;
    pub const FPLLICLK_PLL_POSC: u32 = 0 << 7;

    /// FPLLMULT - PLL multiplier, `n` in 1..=128.
    pub const fn fpllmult(n: u32) -> u32 {
        (n - 1) << 8
    }

    /* FPLLODIV - PLL output divider */
    pub const FPLLODIV_DIV_2: u32 = 1 << 16;
    pub const FPLLODIV_DIV_4: u32 = 2 << 16;
    pub const FPLLODIV_DIV_8: u32 = 3 << 16;
    pub const FPLLODIV_DIV_16: u32 = 4 << 16;
    pub const FPLLODIV_DIV_32: u32 = 5 << 16;

    /* UPLLFSEL - USB PLL input frequency */
    pub const UPLLFSEL_FREQ_24MHZ: u32 = 1 << 30;
    pub const UPLLFSEL_FREQ_12MHZ: u32 = 0 << 30;

    /// All non-field bits set, for conservative programming.
    pub const DEFAULT: u32 = 0xFFFF_FFFF;
}

/// DEVCFG3: user ID and peripheral configuration.
pub mod devcfg3 {
    /// USERID - 16-bit user ID readable over ICSP.
    pub const fn userid(n: u32) -> u32 {
        n & 0xFFFF
    }

    /* FMIIEN - Ethernet MII (off = RMII) */
    pub const FMIIEN_ON: u32 = 1 << 24;
    pub const FMIIEN_OFF: u32 = 0 << 24;

    /* FETHIO - Ethernet pin selection */
    pub const FETHIO_ON: u32 = 1 << 25;
    pub const FETHIO_OFF: u32 = 0 << 25;

    /* PGL1WAY - permission group lock one way */
    pub const PGL1WAY_ON: u32 = 1 << 27;
    pub const PGL1WAY_OFF: u32 = 0 << 27;

    /* PMDL1WAY - peripheral module disable one way */
    pub const PMDL1WAY_ON: u32 = 1 << 28;
    pub const PMDL1WAY_OFF: u32 = 0 << 28;

    /* IOL1WAY - peripheral pin select one way */
    pub const IOL1WAY_ON: u32 = 1 << 29;
    pub const IOL1WAY_OFF: u32 = 0 << 29;

    /* FUSBIDIO - USB ID pin control */
    pub const FUSBIDIO_ON: u32 = 1 << 30;
    pub const FUSBIDIO_OFF: u32 = 0 << 30;

    /// All non-field bits set, for conservative programming.
    pub const DEFAULT: u32 = 0xFFFF_FFFF;
}

/// BF1SEQ0: boot flash 1 sequence word.
pub mod bf1seq0 {
    /// TSEQ - boot sequence number.
    pub const fn tseq(n: u32) -> u32 {
        n & 0xFFFF
    }

    /// CSEQ - ones' complement of the sequence number.
    pub const fn cseq(n: u32) -> u32 {
        (n & 0xFFFF) << 16
    }
}

/// Emit configuration word statics into their absolute flash sections.
///
/// Accepts any subset of `DEVCFG0`..`DEVCFG3`, `BF1SEQ0` and the alternate
/// boot flash words `ABF1_DEVCFG0`..`ABF1_DEVCFG3`. Words not listed keep
/// their erased (all-ones) value.
#[macro_export]
macro_rules! config_words {
    ($($name:ident = $value:expr),+ $(,)?) => {
        $($crate::config_words!(@word $name, $value);)+
    };
    (@word DEVCFG0, $value:expr) => {
        #[cfg_attr(all(target_arch = "mips", target_os = "none"), link_section = ".config_BFC0FFCC")]
        #[no_mangle]
        #[used]
        static __DEVCFG0: u32 = $value;
    };
    (@word DEVCFG1, $value:expr) => {
        #[cfg_attr(all(target_arch = "mips", target_os = "none"), link_section = ".config_BFC0FFC8")]
        #[no_mangle]
        #[used]
        static __DEVCFG1: u32 = $value;
    };
    (@word DEVCFG2, $value:expr) => {
        #[cfg_attr(all(target_arch = "mips", target_os = "none"), link_section = ".config_BFC0FFC4")]
        #[no_mangle]
        #[used]
        static __DEVCFG2: u32 = $value;
    };
    (@word DEVCFG3, $value:expr) => {
        #[cfg_attr(all(target_arch = "mips", target_os = "none"), link_section = ".config_BFC0FFC0")]
        #[no_mangle]
        #[used]
        static __DEVCFG3: u32 = $value;
    };
    (@word BF1SEQ0, $value:expr) => {
        #[cfg_attr(all(target_arch = "mips", target_os = "none"), link_section = ".config_BFC0FF40")]
        #[no_mangle]
        #[used]
        static __BF1SEQ0: u32 = $value;
    };
    (@word ABF1_DEVCFG0, $value:expr) => {
        #[cfg_attr(all(target_arch = "mips", target_os = "none"), link_section = ".config_BFC2FFCC")]
        #[no_mangle]
        #[used]
        static __ABF1_DEVCFG0: u32 = $value;
    };
    (@word ABF1_DEVCFG1, $value:expr) => {
        #[cfg_attr(all(target_arch = "mips", target_os = "none"), link_section = ".config_BFC2FFC8")]
        #[no_mangle]
        #[used]
        static __ABF1_DEVCFG1: u32 = $value;
    };
    (@word ABF1_DEVCFG2, $value:expr) => {
        #[cfg_attr(all(target_arch = "mips", target_os = "none"), link_section = ".config_BFC2FFC4")]
        #[no_mangle]
        #[used]
        static __ABF1_DEVCFG2: u32 = $value;
    };
    (@word ABF1_DEVCFG3, $value:expr) => {
        #[cfg_attr(all(target_arch = "mips", target_os = "none"), link_section = ".config_BFC2FFC0")]
        #[no_mangle]
        #[used]
        static __ABF1_DEVCFG3: u32 = $value;
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pll_word_composition() {
        // HS crystal through the PLL: /1, 5-10 MHz range, x50, /2, 24 MHz
        // USB reference.
        let word = devcfg2::FPLLIDIV_DIV_1
            | devcfg2::FPLLRNG_RANGE_5_10
            | devcfg2::FPLLICLK_PLL_POSC
            | devcfg2::fpllmult(50)
            | devcfg2::FPLLODIV_DIV_2
            | devcfg2::UPLLFSEL_FREQ_24MHZ;
        assert_eq!(word, 0x4001_3110);
    }

    #[test]
    fn test_fpllmult_encoding() {
        assert_eq!(devcfg2::fpllmult(1), 0);
        assert_eq!(devcfg2::fpllmult(50), 49 << 8);
        assert_eq!(devcfg2::fpllmult(128), 127 << 8);
    }

    #[test]
    fn test_userid_masks_to_16_bits() {
        assert_eq!(devcfg3::userid(0x0201), 0x0201);
        assert_eq!(devcfg3::userid(0xFFFF_1234), 0x1234);
    }

    #[test]
    fn test_boot_sequence_word() {
        let word = bf1seq0::tseq(0x0000) | bf1seq0::cseq(0xFFFF);
        assert_eq!(word, 0xFFFF_0000);
        assert_eq!(bf1seq0::tseq(0x12345), 0x2345);
    }

    #[test]
    fn test_dmtcnt_encoding() {
        assert_eq!(devcfg1::dmtcnt(8), 0);
        assert_eq!(devcfg1::dmtcnt(31), devcfg1::DMTCNT_DMT31);
    }

    // The macro must expand to valid statics on any target.
    config_words! {
        DEVCFG3 = devcfg3::userid(0x0201) | devcfg3::FMIIEN_ON,
        BF1SEQ0 = bf1seq0::tseq(0) | bf1seq0::cseq(0xFFFF),
    }

    #[test]
    fn test_emitted_words_hold_their_values() {
        assert_eq!(__DEVCFG3, 0x0100_0201);
        assert_eq!(__BF1SEQ0, 0xFFFF_0000);
    }
}
