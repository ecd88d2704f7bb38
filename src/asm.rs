//! Assembly entry point and startup code for PIC32MZ MCUs.
//!
//! This module provides the `_pic32_start` entry point that:
//! 1. Masks interrupts and clears the reset error level, keeping BEV set
//! 2. Initializes global pointer and stack pointer
//! 3. Calls `__pre_init` hook
//! 4. Initializes .data, .bss and the coherent (uncached) sections
//! 5. Calls `_pic32_start_rust`

use core::arch::global_asm;

// Entry point of all programs (_pic32_start).
// Lives in .reset, which the linker pins to the boot flash base where
// the core fetches its first instruction.
global_asm!(
    r#"
    .section .reset, "ax"
    .set push
    .set noreorder
    .global _pic32_start
    .type _pic32_start, @function

_pic32_start:
    /* Leave reset state: clear ERL/EXL, mask interrupts, keep BEV set
       so exceptions stay on the boot vector until the real vectors are
       programmed */
    lui     $8, 0x0040
    mtc0    $8, $12
    ehb

    /* Initialize global pointer */
    la      $28, _gp

    /* Initialize stack pointer */
    la      $29, _stack

    /* Call pre-init hook (before RAM is initialized) */
    jal     __pre_init
    nop

    /* Initialize .data section */
    la      $8, _sdata
    la      $9, _edata
    la      $10, _sidata
    beq     $8, $9, 2f
    nop
1:
    lw      $11, 0($10)
    sw      $11, 0($8)
    addiu   $10, $10, 4
    addiu   $8, $8, 4
    bne     $8, $9, 1b
    nop
2:

    /* Initialize .bss section */
    la      $8, _sbss
    la      $9, _ebss
    beq     $8, $9, 4f
    nop
3:
    sw      $0, 0($8)
    addiu   $8, $8, 4
    bne     $8, $9, 3b
    nop
4:

    /* Initialize .coherent_data section (uncached RAM alias) */
    la      $8, __coherent_data_start__
    la      $9, __coherent_data_end__
    la      $10, __coherent_data_load_addr__
    beq     $8, $9, 6f
    nop
5:
    lw      $11, 0($10)
    sw      $11, 0($8)
    addiu   $10, $10, 4
    addiu   $8, $8, 4
    bne     $8, $9, 5b
    nop
6:

    /* Initialize .coherent_bss section */
    la      $8, __coherent_bss_start__
    la      $9, __coherent_bss_end__
    beq     $8, $9, 8f
    nop
7:
    sw      $0, 0($8)
    addiu   $8, $8, 4
    bne     $8, $9, 7b
    nop
8:

    /* Call Rust startup code */
    jal     _pic32_start_rust
    nop

    /* Should not return, but if it does, loop forever */
9:
    b       9b
    nop

    .set pop
    .size _pic32_start, . - _pic32_start
"#
);

// Default pre-init function (does nothing)
global_asm!(
    r#"
    .section .reset, "ax"
    .set push
    .set noreorder
    .weak default_pre_init
    .type default_pre_init, @function

default_pre_init:
    jr      $31
    nop

    .set pop
    .size default_pre_init, . - default_pre_init
"#
);
