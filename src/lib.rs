//! PIC32MZ MIPS Runtime
//!
//! This crate provides complete runtime support for Microchip PIC32MZ
//! MCUs: reset and section initialization, configuration words, the
//! multi-vector interrupt dispatch, exception handling, and newlib
//! system call glue with UHI semihosting streams.
//!
//! ## Usage
//!
//! Add this crate as a dependency:
//!
//! ```toml
//! [dependencies]
//! pic32mz-rt = "0.1"
//! ```
//!
//! Configure linker scripts in `.cargo/config.toml`:
//!
//! ```toml
//! [target.mipsel-unknown-none]
//! rustflags = [
//!     "-C", "link-arg=-Tmemory.x",       # User-provided memory layout
//!     "-C", "link-arg=-Tpic32mz-link.x", # From pic32mz-rt
//! ]
//! ```
//!
//! Use the provided macros:
//!
//! ```ignore
//! use pic32mz_rt::{config_words, entry, interrupt, pre_init};
//! use pic32mz_rt::interrupt::Vector;
//!
//! config_words! {
//!     DEVCFG1 = pic32mz_rt::config::devcfg1::FNOSC_SPLL,
//! }
//!
//! #[pre_init]
//! unsafe fn before_main() {
//!     // Called before RAM is initialized
//! }
//!
//! #[entry]
//! fn main() -> ! {
//!     loop {}
//! }
//!
//! #[interrupt(Vector::UART2_RX)]
//! fn on_uart2_rx() {
//!     // Runs with interrupts masked, from its own vector
//! }
//! ```

#![cfg_attr(not(test), no_std)]
#![cfg_attr(target_arch = "mips", feature(asm_experimental_arch))]

#[cfg(all(target_arch = "mips", target_os = "none"))]
mod asm;
#[cfg(all(target_arch = "mips", target_os = "none"))]
pub mod trap;

pub mod config;
pub mod cp0;
pub mod errno;
pub mod float;
pub mod interrupt;
pub mod kseg;
pub mod semihost;
pub mod stream;
pub mod sync;
pub mod syscalls;

// Re-export macros
pub use pic32mz_rt_macros::{coherent, entry, interrupt, pre_init};

// ============ TrapFrame ============

/// Registers saved when entering the general exception handler.
///
/// This struct contains the state the compiler is not aware of (EPC,
/// Status, the hi/lo multiply registers) plus every caller-saved GPR.
#[repr(C)]
pub struct TrapFrame {
    /// Exception program counter
    pub epc: u32,
    /// Status register
    pub status: u32,
    /// Multiply/divide result, high word
    pub hi: u32,
    /// Multiply/divide result, low word
    pub lo: u32,
    /// Assembler temporary
    pub at: u32,
    /// Return value register v0
    pub v0: u32,
    /// Return value register v1
    pub v1: u32,
    /// Argument register a0
    pub a0: u32,
    /// Argument register a1
    pub a1: u32,
    /// Argument register a2
    pub a2: u32,
    /// Argument register a3
    pub a3: u32,
    /// Temporary register t0
    pub t0: u32,
    /// Temporary register t1
    pub t1: u32,
    /// Temporary register t2
    pub t2: u32,
    /// Temporary register t3
    pub t3: u32,
    /// Temporary register t4
    pub t4: u32,
    /// Temporary register t5
    pub t5: u32,
    /// Temporary register t6
    pub t6: u32,
    /// Temporary register t7
    pub t7: u32,
    /// Temporary register t8
    pub t8: u32,
    /// Temporary register t9
    pub t9: u32,
    /// Return address
    pub ra: u32,
}

// ============ Rust Startup Code ============

/// Rust startup function called from assembly after RAM is initialized.
///
/// This function:
/// 1. Sets up the exception and interrupt vectors
/// 2. Calls `main`
#[cfg(all(target_arch = "mips", target_os = "none"))]
#[no_mangle]
pub unsafe extern "C" fn _pic32_start_rust() -> ! {
    extern "Rust" {
        fn main() -> !;
    }

    extern "C" {
        fn _setup_interrupts();
    }

    // 1. Setup interrupts (multi-vector mode)
    _setup_interrupts();

    // 2. Jump to main
    main()
}

// ============ Interrupt Setup ============

/// Setup interrupts for PIC32MZ MCUs.
///
/// This function:
/// 1. Relocates EBase to the linked vector region
/// 2. Selects 32-byte vector spacing and the special interrupt vector
/// 3. Switches the interrupt controller to multi-vector mode
/// 4. Routes every vector, the bound ones to their trampolines and the
///    rest to a stub that parks in `DefaultInterruptHandler`
/// 5. Enables global interrupts
#[cfg(all(target_arch = "mips", target_os = "none"))]
#[export_name = "_setup_interrupts"]
pub unsafe fn setup_interrupts() {
    extern "C" {
        static __vector_base: u32;
        fn __vector_default();
    }

    // 1. EBase may only move while Status.BEV is set.
    cp0::status::set_bev();
    let base = core::ptr::addr_of!(__vector_base) as u32;
    cp0::ebase::write(base);

    // 2. Vectored interrupts with 32-byte spacing.
    cp0::intctl::write(cp0::intctl::IntCtl::from_bits(cp0::intctl::VS_32));
    cp0::cause::set_iv();
    cp0::status::clear_bev();

    // 3. Multi-vector mode; the OFF registers now supply each vector's
    // offset from EBase.
    interrupt::INTCONSET.write_volatile(interrupt::INTCON_MVEC);

    // 4. Park every vector on the default stub, then route the entries
    // the interrupt macro collected.
    let default_off = (__vector_default as usize as u32).wrapping_sub(base);
    for vector in 0..interrupt::NUM_VECTORS {
        interrupt::off_register(vector).write_volatile(default_off);
    }
    for entry in interrupt::bound_entries() {
        let off = (entry.trampoline as usize as u32).wrapping_sub(base);
        interrupt::off_register(entry.vector as usize).write_volatile(off);
    }

    // 5. Enable global interrupts.
    interrupt::enable();
}

// ============ Default Handlers ============

/// Default exception handler - loops forever.
#[no_mangle]
#[allow(non_snake_case)]
pub extern "C" fn DefaultExceptionHandler(_trap_frame: &TrapFrame) -> ! {
    loop {
        core::hint::spin_loop();
    }
}

/// Default interrupt handler - loops forever.
#[no_mangle]
#[allow(non_snake_case)]
pub extern "C" fn DefaultInterruptHandler() {
    loop {
        core::hint::spin_loop();
    }
}
