//! General exception handling for PIC32MZ MIPS cores.
//!
//! Synchronous exceptions arrive at `EBase + 0x180`, where a two
//! instruction stub jumps to the context handler below. The handler
//! saves the state the compiler cannot see (EPC, Status, the hi/lo
//! multiply registers and every caller-saved GPR), dispatches on the
//! Cause.ExcCode field and returns through `eret`.
//!
//! Interrupts never pass through here; in multi-vector mode each source
//! has its own entry point programmed during startup.

use core::arch::global_asm;

use crate::cp0;
use crate::TrapFrame;

// ============ Exception Handlers ============

extern "C" {
    fn TlbModified(trap_frame: &TrapFrame);
    fn TlbLoadMiss(trap_frame: &TrapFrame);
    fn TlbStoreMiss(trap_frame: &TrapFrame);
    fn AddressErrorLoad(trap_frame: &TrapFrame);
    fn AddressErrorStore(trap_frame: &TrapFrame);
    fn BusErrorInstruction(trap_frame: &TrapFrame);
    fn BusErrorData(trap_frame: &TrapFrame);
    fn Syscall(trap_frame: &TrapFrame);
    fn Breakpoint(trap_frame: &TrapFrame);
    fn ReservedInstruction(trap_frame: &TrapFrame);
    fn CoprocessorUnusable(trap_frame: &TrapFrame);
    fn Overflow(trap_frame: &TrapFrame);
    fn Trap(trap_frame: &TrapFrame);
    fn FloatingPoint(trap_frame: &TrapFrame);
    fn Watch(trap_frame: &TrapFrame);
    fn MachineCheck(trap_frame: &TrapFrame);
    fn ExceptionHandler(trap_frame: &TrapFrame);
}

/// Exception dispatch table, indexed by Cause.ExcCode.
#[doc(hidden)]
#[no_mangle]
pub static __PIC32_EXCEPTIONS: [Option<unsafe extern "C" fn(&TrapFrame)>; 32] = [
    None,                      // 0 (interrupt, has its own vectors)
    Some(TlbModified),         // 1
    Some(TlbLoadMiss),         // 2
    Some(TlbStoreMiss),        // 3
    Some(AddressErrorLoad),    // 4
    Some(AddressErrorStore),   // 5
    Some(BusErrorInstruction), // 6
    Some(BusErrorData),        // 7
    Some(Syscall),             // 8
    Some(Breakpoint),          // 9
    Some(ReservedInstruction), // 10
    Some(CoprocessorUnusable), // 11
    Some(Overflow),            // 12
    Some(Trap),                // 13
    None,                      // 14 (reserved)
    Some(FloatingPoint),       // 15
    None,                      // 16 (reserved)
    None,                      // 17 (reserved)
    None,                      // 18 (C2E, reserved)
    None,                      // 19 (TLBRI, reserved)
    None,                      // 20 (TLBXI, reserved)
    None,                      // 21 (reserved)
    None,                      // 22 (reserved)
    Some(Watch),               // 23
    Some(MachineCheck),        // 24
    None,                      // 25 (reserved)
    None,                      // 26 (DSP, reserved)
    None,                      // 27 (reserved)
    None,                      // 28 (reserved)
    None,                      // 29 (reserved)
    None,                      // 30 (cache error, has its own vector)
    None,                      // 31 (reserved)
];

// ============ General Exception Handler ============

/// Rust handler behind the general exception vector.
///
/// Dispatches on the exception code; causes without a table entry go to
/// `ExceptionHandler`.
#[no_mangle]
unsafe extern "C" fn _start_rust_general_exception(trap_frame: *const TrapFrame) {
    let code = cp0::cause::read().exc_code() as usize;

    let trap_frame = &*trap_frame;
    match __PIC32_EXCEPTIONS.get(code) {
        Some(Some(handler)) => handler(trap_frame),
        _ => ExceptionHandler(trap_frame),
    }
}

// Stub placed at EBase + 0x180. The slot is 128 bytes, so it only jumps
// to the full context handler in regular text.
global_asm!(
    r#"
    .section .gen_exception, "ax"
    .set push
    .set noreorder
    .global _gen_exception
    .type _gen_exception, @function
_gen_exception:
    j       _general_exception_context
    nop
    .set pop
    .size _gen_exception, . - _gen_exception
"#
);

// General exception context handler.
// Saves EPC, Status, hi/lo and the caller-saved GPRs, calls the Rust
// dispatcher, restores everything and erets. Callee-saved registers are
// preserved by the dispatcher itself. The TrapFrame sits at 16($sp);
// the bottom 16 bytes are the o32 argument save area, which the called
// handler is allowed to clobber.
global_asm!(
    r#"
    .section .text._general_exception_context, "ax"
    .set push
    .set noreorder
    .set noat
    .global _general_exception_context
    .type _general_exception_context, @function
    .balign 4

_general_exception_context:
    addiu   $29, $29, -104

    sw      $1, 32($29)
    sw      $2, 36($29)
    sw      $3, 40($29)
    sw      $4, 44($29)
    sw      $5, 48($29)
    sw      $6, 52($29)
    sw      $7, 56($29)
    sw      $8, 60($29)
    sw      $9, 64($29)
    sw      $10, 68($29)
    sw      $11, 72($29)
    sw      $12, 76($29)
    sw      $13, 80($29)
    sw      $14, 84($29)
    sw      $15, 88($29)
    sw      $24, 92($29)
    sw      $25, 96($29)
    sw      $31, 100($29)
    mfc0    $26, $14
    sw      $26, 16($29)
    mfc0    $26, $12
    sw      $26, 20($29)
    mfhi    $26
    sw      $26, 24($29)
    mflo    $26
    sw      $26, 28($29)

    addiu   $4, $29, 16
    jal     _start_rust_general_exception
    nop

    lw      $26, 16($29)
    mtc0    $26, $14
    lw      $26, 20($29)
    mtc0    $26, $12
    ehb
    lw      $26, 24($29)
    mthi    $26
    lw      $26, 28($29)
    mtlo    $26
    lw      $1, 32($29)
    lw      $2, 36($29)
    lw      $3, 40($29)
    lw      $4, 44($29)
    lw      $5, 48($29)
    lw      $6, 52($29)
    lw      $7, 56($29)
    lw      $8, 60($29)
    lw      $9, 64($29)
    lw      $10, 68($29)
    lw      $11, 72($29)
    lw      $12, 76($29)
    lw      $13, 80($29)
    lw      $14, 84($29)
    lw      $15, 88($29)
    lw      $24, 92($29)
    lw      $25, 96($29)
    lw      $31, 100($29)
    addiu   $29, $29, 104

    eret

    .set pop
    .size _general_exception_context, . - _general_exception_context
"#
);

// Unbound interrupt vectors are routed here by the startup code. The
// default handler never returns, so no context needs saving first.
global_asm!(
    r#"
    .section .vector.default, "ax"
    .set push
    .set noreorder
    .global __vector_default
    .type __vector_default, @function
__vector_default:
    j       DefaultInterruptHandler
    nop
    .set pop
    .size __vector_default, . - __vector_default
"#
);
