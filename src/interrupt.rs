//! Core interrupt control and the multi-vector dispatch map.
//!
//! The interrupt controller runs in multi-vector mode: every source gets
//! its own entry point at `EBase + OFFx`, where the per-vector
//! `OFFx` registers are programmed during startup from the entries that
//! [`interrupt`](macro@crate::interrupt) handlers place in the vector map
//! section. Vectors without a handler are routed to a stub that ends up
//! in [`DefaultInterruptHandler`](crate::DefaultInterruptHandler).
//!
//! Interrupt priorities live in the controller's IPC registers and are
//! not touched here; program them through a peripheral access crate
//! before unmasking a source.

// ================ Interrupt controller registers ================

/// INTCONSET alias, writes set bits.
#[doc(hidden)]
pub const INTCONSET: *mut u32 = 0xBF81_0008 as *mut u32;
/// INTCON.MVEC, selects multi-vector mode.
#[doc(hidden)]
pub const INTCON_MVEC: u32 = 1 << 12;
/// OFF000, first of the per-vector offset registers.
#[doc(hidden)]
pub const OFF_BASE: u32 = 0xBF81_0540;

/// Number of OFFx registers programmed during startup.
pub const NUM_VECTORS: usize = 191;

/// Per-vector offset register, one word per vector.
#[doc(hidden)]
pub const fn off_register(vector: usize) -> *mut u32 {
    (OFF_BASE + 4 * vector as u32) as *mut u32
}

// ================ Vector numbers ================

/// Interrupt vector numbers of the PIC32MZ EF family.
///
/// The per-channel ADC data vectors (45..=108) are not listed; handlers
/// for those can still be routed by writing their OFFx registers once
/// the map has been applied.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u16)]
pub enum Vector {
    CORE_TIMER = 0,
    CORE_SOFTWARE_0 = 1,
    CORE_SOFTWARE_1 = 2,
    EXTERNAL_0 = 3,
    TIMER_1 = 4,
    INPUT_CAPTURE_1_ERROR = 5,
    INPUT_CAPTURE_1 = 6,
    OUTPUT_COMPARE_1 = 7,
    EXTERNAL_1 = 8,
    TIMER_2 = 9,
    INPUT_CAPTURE_2_ERROR = 10,
    INPUT_CAPTURE_2 = 11,
    OUTPUT_COMPARE_2 = 12,
    EXTERNAL_2 = 13,
    TIMER_3 = 14,
    INPUT_CAPTURE_3_ERROR = 15,
    INPUT_CAPTURE_3 = 16,
    OUTPUT_COMPARE_3 = 17,
    EXTERNAL_3 = 18,
    TIMER_4 = 19,
    INPUT_CAPTURE_4_ERROR = 20,
    INPUT_CAPTURE_4 = 21,
    OUTPUT_COMPARE_4 = 22,
    EXTERNAL_4 = 23,
    TIMER_5 = 24,
    INPUT_CAPTURE_5_ERROR = 25,
    INPUT_CAPTURE_5 = 26,
    OUTPUT_COMPARE_5 = 27,
    TIMER_6 = 28,
    INPUT_CAPTURE_6_ERROR = 29,
    INPUT_CAPTURE_6 = 30,
    OUTPUT_COMPARE_6 = 31,
    TIMER_7 = 32,
    INPUT_CAPTURE_7_ERROR = 33,
    INPUT_CAPTURE_7 = 34,
    OUTPUT_COMPARE_7 = 35,
    TIMER_8 = 36,
    INPUT_CAPTURE_8_ERROR = 37,
    INPUT_CAPTURE_8 = 38,
    OUTPUT_COMPARE_8 = 39,
    TIMER_9 = 40,
    INPUT_CAPTURE_9_ERROR = 41,
    INPUT_CAPTURE_9 = 42,
    OUTPUT_COMPARE_9 = 43,
    ADC = 44,
    SPI1_FAULT = 109,
    SPI1_RX = 110,
    SPI1_TX = 111,
    UART1_FAULT = 112,
    UART1_RX = 113,
    UART1_TX = 114,
    I2C1_BUS = 115,
    I2C1_SLAVE = 116,
    I2C1_MASTER = 117,
    CHANGE_NOTICE_A = 118,
    CHANGE_NOTICE_B = 119,
    CHANGE_NOTICE_C = 120,
    CHANGE_NOTICE_D = 121,
    CHANGE_NOTICE_E = 122,
    CHANGE_NOTICE_F = 123,
    CHANGE_NOTICE_G = 124,
    CHANGE_NOTICE_H = 125,
    CHANGE_NOTICE_J = 126,
    CHANGE_NOTICE_K = 127,
    PMP = 128,
    PMP_ERROR = 129,
    COMPARATOR_1 = 130,
    COMPARATOR_2 = 131,
    USB = 132,
    USB_DMA = 133,
    DMA0 = 134,
    DMA1 = 135,
    DMA2 = 136,
    DMA3 = 137,
    DMA4 = 138,
    DMA5 = 139,
    DMA6 = 140,
    DMA7 = 141,
    SPI2_FAULT = 142,
    SPI2_RX = 143,
    SPI2_TX = 144,
    UART2_FAULT = 145,
    UART2_RX = 146,
    UART2_TX = 147,
    I2C2_BUS = 148,
    I2C2_SLAVE = 149,
    I2C2_MASTER = 150,
    CAN1 = 151,
    CAN2 = 152,
    ETHERNET = 153,
    SPI3_FAULT = 154,
    SPI3_RX = 155,
    SPI3_TX = 156,
    UART3_FAULT = 157,
    UART3_RX = 158,
    UART3_TX = 159,
    I2C3_BUS = 160,
    I2C3_SLAVE = 161,
    I2C3_MASTER = 162,
    SPI4_FAULT = 163,
    SPI4_RX = 164,
    SPI4_TX = 165,
    RTCC = 166,
    FLASH_CONTROL = 167,
    PREFETCH = 168,
    SQI1 = 169,
    UART4_FAULT = 170,
    UART4_RX = 171,
    UART4_TX = 172,
    I2C4_BUS = 173,
    I2C4_SLAVE = 174,
    I2C4_MASTER = 175,
    SPI5_FAULT = 176,
    SPI5_RX = 177,
    SPI5_TX = 178,
    UART5_FAULT = 179,
    UART5_RX = 180,
    UART5_TX = 181,
    I2C5_BUS = 182,
    I2C5_SLAVE = 183,
    I2C5_MASTER = 184,
    SPI6_FAULT = 185,
    SPI6_RX = 186,
    SPI6_TX = 187,
    UART6_FAULT = 188,
    UART6_RX = 189,
    UART6_TX = 190,
}

impl Vector {
    /// Vector number, the index into the OFFx register block.
    pub const fn number(self) -> u16 {
        self as u16
    }
}

// ================ Vector map ================

/// One handler binding, collected into the vector map section by the
/// [`interrupt`](macro@crate::interrupt) attribute.
#[doc(hidden)]
#[repr(C)]
pub struct VectorEntry {
    pub vector: u16,
    pub trampoline: unsafe extern "C" fn(),
}

impl VectorEntry {
    pub const fn new(vector: Vector, trampoline: unsafe extern "C" fn()) -> Self {
        VectorEntry {
            vector: vector.number(),
            trampoline,
        }
    }
}

/// Entries the linker collected from all `#[interrupt]` expansions.
#[cfg(all(target_arch = "mips", target_os = "none"))]
pub(crate) unsafe fn bound_entries() -> &'static [VectorEntry] {
    extern "C" {
        static __svector_map: VectorEntry;
        static __evector_map: VectorEntry;
    }
    let start = core::ptr::addr_of!(__svector_map);
    let end = core::ptr::addr_of!(__evector_map);
    let len = (end as usize - start as usize) / core::mem::size_of::<VectorEntry>();
    core::slice::from_raw_parts(start, len)
}

// ================ Global interrupt enable ================

/// Disables all maskable interrupts and returns whether they were
/// enabled before.
#[cfg(all(target_arch = "mips", target_os = "none"))]
#[inline]
pub fn disable() -> bool {
    let prev: u32;
    unsafe {
        core::arch::asm!("di {0}", "ehb", out(reg) prev);
    }
    // di returns the prior Status value; bit 0 is IE.
    prev & 1 != 0
}

/// Enables all maskable interrupts.
///
/// # Safety
///
/// Must not be called inside a critical section.
#[cfg(all(target_arch = "mips", target_os = "none"))]
#[inline]
pub unsafe fn enable() {
    core::arch::asm!("ei", "ehb");
}

/// Runs `f` with interrupts disabled, restoring the previous state after.
#[cfg(all(target_arch = "mips", target_os = "none"))]
#[inline]
pub fn free<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    let was_enabled = disable();
    let r = f();
    if was_enabled {
        unsafe { enable() };
    }
    r
}

// ================ critical-section implementation ================

#[cfg(all(
    feature = "critical-section-single-core",
    target_arch = "mips",
    target_os = "none"
))]
mod single_core_critical_section {
    use critical_section::{set_impl, Impl, RawRestoreState};

    struct SingleCoreCriticalSection;
    set_impl!(SingleCoreCriticalSection);

    unsafe impl Impl for SingleCoreCriticalSection {
        unsafe fn acquire() -> RawRestoreState {
            super::disable()
        }

        unsafe fn release(was_enabled: RawRestoreState) {
            if was_enabled {
                super::enable();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_numbers() {
        assert_eq!(Vector::CORE_TIMER.number(), 0);
        assert_eq!(Vector::ADC.number(), 44);
        assert_eq!(Vector::UART2_RX.number(), 146);
        assert_eq!(Vector::UART6_TX.number(), 190);
    }

    #[test]
    fn test_register_addresses() {
        assert_eq!(INTCONSET as u32, 0xBF81_0008);
        assert_eq!(INTCON_MVEC, 1 << 12);
        assert_eq!(off_register(0) as u32, 0xBF81_0540);
        assert_eq!(
            off_register(Vector::UART2_RX.number() as usize) as u32,
            0xBF81_0540 + 4 * 146,
        );
    }

    #[test]
    fn test_all_vectors_in_off_range() {
        assert!((Vector::UART6_TX.number() as usize) < NUM_VECTORS);
    }

    #[test]
    fn test_entry_keeps_vector_number() {
        unsafe extern "C" fn stub() {}
        let entry = VectorEntry::new(Vector::ETHERNET, stub);
        assert_eq!(entry.vector, 153);
    }
}
