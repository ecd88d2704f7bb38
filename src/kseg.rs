//! MIPS fixed-mapping address arithmetic.
//!
//! The PIC32MZ maps physical memory twice in kernel space: KSEG0
//! (0x8000_0000.., cached) and KSEG1 (0xA000_0000.., uncached). The two
//! windows differ in exactly one address bit, so moving a buffer between
//! its cached and uncached view is pure arithmetic. DMA descriptors and
//! peripheral-shared buffers must be touched through KSEG1 (or placed in
//! a `#[coherent]` static).

/// Address bit distinguishing KSEG1 from KSEG0.
const KSEG1_BIT: usize = 0x2000_0000;
/// Mask selecting the physical part of a kernel virtual address.
const PHYS_MASK: usize = 0x1FFF_FFFF;

/// Cached (KSEG0) alias of a kernel virtual address.
pub const fn kva_to_kseg0(addr: usize) -> usize {
    addr & !KSEG1_BIT
}

/// Uncached (KSEG1) alias of a kernel virtual address.
pub const fn kva_to_kseg1(addr: usize) -> usize {
    addr | KSEG1_BIT
}

/// Physical address behind a KSEG0/KSEG1 virtual address.
pub const fn kva_to_pa(addr: usize) -> usize {
    addr & PHYS_MASK
}

/// KSEG0 virtual address for a physical address below 512 MiB.
pub const fn pa_to_kseg0(pa: usize) -> usize {
    (pa & PHYS_MASK) | 0x8000_0000
}

/// KSEG1 virtual address for a physical address below 512 MiB.
pub const fn pa_to_kseg1(pa: usize) -> usize {
    (pa & PHYS_MASK) | 0xA000_0000
}

/// Whether `addr` lies in the cached KSEG0 window.
pub const fn is_kseg0(addr: usize) -> bool {
    addr & 0xE000_0000 == 0x8000_0000
}

/// Whether `addr` lies in the uncached KSEG1 window.
pub const fn is_kseg1(addr: usize) -> bool {
    addr & 0xE000_0000 == 0xA000_0000
}

/// Uncached view of a pointer. The object itself is unchanged; reads and
/// writes through the result bypass the L1 data cache.
pub fn uncached_ptr<T>(ptr: *mut T) -> *mut T {
    kva_to_kseg1(ptr as usize) as *mut T
}

/// Cached view of a pointer.
pub fn cached_ptr<T>(ptr: *mut T) -> *mut T {
    kva_to_kseg0(ptr as usize) as *mut T
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kseg_aliasing() {
        assert_eq!(kva_to_kseg1(0x8000_1234), 0xA000_1234);
        assert_eq!(kva_to_kseg0(0xA000_1234), 0x8000_1234);
        // Already in the requested segment: unchanged.
        assert_eq!(kva_to_kseg1(0xA000_1234), 0xA000_1234);
        assert_eq!(kva_to_kseg0(0x8000_1234), 0x8000_1234);
    }

    #[test]
    fn test_physical_translation() {
        assert_eq!(kva_to_pa(0x8000_1234), 0x0000_1234);
        assert_eq!(kva_to_pa(0xBFC0_0000), 0x1FC0_0000);
        assert_eq!(pa_to_kseg0(0x1D00_0000), 0x9D00_0000);
        assert_eq!(pa_to_kseg1(0x1FC0_0000), 0xBFC0_0000);
    }

    #[test]
    fn test_segment_predicates() {
        assert!(is_kseg0(0x9D00_0000));
        assert!(!is_kseg0(0xBD00_0000));
        assert!(is_kseg1(0xBF81_0000));
        assert!(!is_kseg1(0x9F81_0000));
        // User segment is neither.
        assert!(!is_kseg0(0x7F00_0000));
        assert!(!is_kseg1(0x7F00_0000));
    }
}
