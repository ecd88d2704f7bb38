//! Coprocessor-0 register access.
//!
//! One submodule per register, each with `read()` and, where the register
//! is writable, `write()` plus field helpers. Register numbers follow the
//! MIPS32 privileged architecture: BadVAddr $8, Count $9, Compare $11,
//! Status $12 (IntCtl is $12 select 1), Cause $13, EPC $14, EBase $15
//! select 1.
//!
//! The bitfield wrappers are plain value types so decode logic works on
//! any target; only the `mfc0`/`mtc0` accessors require the MIPS core.

/// BadVAddr register ($8): faulting address of the last address error.
pub mod badvaddr {
    #[cfg(all(target_arch = "mips", target_os = "none"))]
    pub fn read() -> u32 {
        let bits: u32;
        unsafe { core::arch::asm!("mfc0 {0}, $8", out(reg) bits) };
        bits
    }
}

/// Count register ($9): free-running counter at half the core clock.
pub mod count {
    #[cfg(all(target_arch = "mips", target_os = "none"))]
    pub fn read() -> u32 {
        let bits: u32;
        unsafe { core::arch::asm!("mfc0 {0}, $9", out(reg) bits) };
        bits
    }

    #[cfg(all(target_arch = "mips", target_os = "none"))]
    pub unsafe fn write(bits: u32) {
        core::arch::asm!("mtc0 {0}, $9", "ehb", in(reg) bits);
    }
}

/// Compare register ($11): writing it clears the core timer interrupt.
pub mod compare {
    #[cfg(all(target_arch = "mips", target_os = "none"))]
    pub fn read() -> u32 {
        let bits: u32;
        unsafe { core::arch::asm!("mfc0 {0}, $11", out(reg) bits) };
        bits
    }

    #[cfg(all(target_arch = "mips", target_os = "none"))]
    pub unsafe fn write(bits: u32) {
        core::arch::asm!("mtc0 {0}, $11", "ehb", in(reg) bits);
    }
}

/// Status register ($12 select 0).
pub mod status {
    /// Decoded Status value.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Status {
        bits: u32,
    }

    impl Status {
        pub const fn from_bits(bits: u32) -> Self {
            Status { bits }
        }

        pub const fn bits(&self) -> u32 {
            self.bits
        }

        /// Global interrupt enable.
        pub const fn ie(&self) -> bool {
            self.bits & 1 != 0
        }

        /// Exception level; set by hardware on exception entry, cleared
        /// by `eret`. Interrupts are masked while set.
        pub const fn exl(&self) -> bool {
            self.bits & (1 << 1) != 0
        }

        /// Error level; set at reset.
        pub const fn erl(&self) -> bool {
            self.bits & (1 << 2) != 0
        }

        /// Current interrupt priority level. The controller only delivers
        /// requests with a higher priority.
        pub const fn ipl(&self) -> u8 {
            ((self.bits >> 10) & 0x7) as u8
        }

        /// Boot exception vectors: exceptions go through KSEG1 boot flash
        /// while set.
        pub const fn bev(&self) -> bool {
            self.bits & (1 << 22) != 0
        }
    }

    #[cfg(all(target_arch = "mips", target_os = "none"))]
    pub fn read() -> Status {
        let bits: u32;
        unsafe { core::arch::asm!("mfc0 {0}, $12", out(reg) bits) };
        Status { bits }
    }

    #[cfg(all(target_arch = "mips", target_os = "none"))]
    pub unsafe fn write(value: Status) {
        core::arch::asm!("mtc0 {0}, $12", "ehb", in(reg) value.bits());
    }

    #[cfg(all(target_arch = "mips", target_os = "none"))]
    pub unsafe fn set_bev() {
        write(Status::from_bits(read().bits() | (1 << 22)));
    }

    #[cfg(all(target_arch = "mips", target_os = "none"))]
    pub unsafe fn clear_bev() {
        write(Status::from_bits(read().bits() & !(1 << 22)));
    }

    #[cfg(test)]
    mod tests {
        use super::Status;

        #[test]
        fn test_status_fields() {
            let s = Status::from_bits(1 | (1 << 1) | (3 << 10) | (1 << 22));
            assert!(s.ie());
            assert!(s.exl());
            assert!(!s.erl());
            assert_eq!(s.ipl(), 3);
            assert!(s.bev());
            assert_eq!(Status::from_bits(0).ipl(), 0);
        }
    }
}

/// IntCtl register ($12 select 1): vector spacing.
pub mod intctl {
    /// Decoded IntCtl value.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IntCtl {
        bits: u32,
    }

    impl IntCtl {
        pub const fn from_bits(bits: u32) -> Self {
            IntCtl { bits }
        }

        pub const fn bits(&self) -> u32 {
            self.bits
        }

        /// Vector spacing in bytes (VS field, bits 5..10, encoded as a
        /// power of two: 1 -> 32 bytes, 2 -> 64 bytes, ...).
        pub const fn vector_spacing(&self) -> u32 {
            let vs = (self.bits >> 5) & 0x1F;
            if vs == 0 {
                0
            } else {
                32 << (vs - 1)
            }
        }
    }

    /// VS encoding for 32-byte vector spacing.
    pub const VS_32: u32 = 1 << 5;

    #[cfg(all(target_arch = "mips", target_os = "none"))]
    pub fn read() -> IntCtl {
        let bits: u32;
        unsafe { core::arch::asm!("mfc0 {0}, $12, 1", out(reg) bits) };
        IntCtl { bits }
    }

    #[cfg(all(target_arch = "mips", target_os = "none"))]
    pub unsafe fn write(value: IntCtl) {
        core::arch::asm!("mtc0 {0}, $12, 1", "ehb", in(reg) value.bits());
    }

    #[cfg(test)]
    mod tests {
        use super::{IntCtl, VS_32};

        #[test]
        fn test_vector_spacing_decode() {
            assert_eq!(IntCtl::from_bits(0).vector_spacing(), 0);
            assert_eq!(IntCtl::from_bits(VS_32).vector_spacing(), 32);
            assert_eq!(IntCtl::from_bits(2 << 5).vector_spacing(), 64);
            assert_eq!(IntCtl::from_bits(5 << 5).vector_spacing(), 512);
        }
    }
}

/// Cause register ($13).
pub mod cause {
    /// Decoded Cause value.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Cause {
        bits: u32,
    }

    impl Cause {
        pub const fn from_bits(bits: u32) -> Self {
            Cause { bits }
        }

        pub const fn bits(&self) -> u32 {
            self.bits
        }

        /// Exception code (bits 2..7).
        pub const fn exc_code(&self) -> usize {
            ((self.bits >> 2) & 0x1F) as usize
        }

        /// Priority level of the interrupt the controller is requesting.
        pub const fn ripl(&self) -> u8 {
            ((self.bits >> 10) & 0x7) as u8
        }

        /// Interrupts use the dedicated vector at EBase + 0x200.
        pub const fn iv(&self) -> bool {
            self.bits & (1 << 23) != 0
        }

        /// The faulting instruction was in a branch delay slot; EPC points
        /// at the branch.
        pub const fn bd(&self) -> bool {
            self.bits & (1 << 31) != 0
        }
    }

    #[cfg(all(target_arch = "mips", target_os = "none"))]
    pub fn read() -> Cause {
        let bits: u32;
        unsafe { core::arch::asm!("mfc0 {0}, $13", out(reg) bits) };
        Cause { bits }
    }

    #[cfg(all(target_arch = "mips", target_os = "none"))]
    pub unsafe fn set_iv() {
        let bits: u32;
        core::arch::asm!("mfc0 {0}, $13", out(reg) bits);
        core::arch::asm!("mtc0 {0}, $13", "ehb", in(reg) bits | (1 << 23));
    }

    #[cfg(test)]
    mod tests {
        use super::Cause;

        #[test]
        fn test_cause_fields() {
            // AdEL (code 4), priority 2 requested, delay slot.
            let c = Cause::from_bits((4 << 2) | (2 << 10) | (1 << 31));
            assert_eq!(c.exc_code(), 4);
            assert_eq!(c.ripl(), 2);
            assert!(c.bd());
            assert!(!c.iv());
        }
    }
}

/// EPC register ($14): return address for `eret`.
pub mod epc {
    #[cfg(all(target_arch = "mips", target_os = "none"))]
    pub fn read() -> u32 {
        let bits: u32;
        unsafe { core::arch::asm!("mfc0 {0}, $14", out(reg) bits) };
        bits
    }

    #[cfg(all(target_arch = "mips", target_os = "none"))]
    pub unsafe fn write(bits: u32) {
        core::arch::asm!("mtc0 {0}, $14", "ehb", in(reg) bits);
    }
}

/// EBase register ($15 select 1): exception vector base, 4 KiB aligned.
pub mod ebase {
    /// Alignment required of an exception base address.
    pub const ALIGN: u32 = 0x1000;

    #[cfg(all(target_arch = "mips", target_os = "none"))]
    pub fn read() -> u32 {
        let bits: u32;
        unsafe { core::arch::asm!("mfc0 {0}, $15, 1", out(reg) bits) };
        bits & !(ALIGN - 1)
    }

    /// Set the exception base. Only valid while Status.BEV is set; the
    /// low 12 bits of `base` must be zero.
    #[cfg(all(target_arch = "mips", target_os = "none"))]
    pub unsafe fn write(base: u32) {
        core::arch::asm!("mtc0 {0}, $15, 1", "ehb", in(reg) base);
    }
}
