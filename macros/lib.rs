//! Procedural macros for pic32mz-rt
//!
//! This crate provides:
//! - `#[entry]` - Define the program entry point
//! - `#[pre_init]` - Define a pre-initialization function
//! - `#[coherent]` - Place statics in uncached (coherent) RAM
//! - `#[interrupt]` - Define vectored interrupt handlers

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, Expr, Item, ItemFn, LitStr, parse::Parse, parse::ParseStream};

/// Attribute to declare the entry point of the program.
///
/// The function must have the signature `fn() -> !` (never returns).
///
/// # Example
///
/// ```ignore
/// #[entry]
/// fn main() -> ! {
///     loop {}
/// }
/// ```
#[proc_macro_attribute]
pub fn entry(_args: TokenStream, input: TokenStream) -> TokenStream {
    let f = parse_macro_input!(input as ItemFn);

    let fn_attrs = &f.attrs;
    let fn_vis = &f.vis;
    let fn_sig = &f.sig;
    let fn_block = &f.block;

    quote!(
        #(#fn_attrs)*
        #[unsafe(export_name = "main")]
        #fn_vis #fn_sig #fn_block
    )
    .into()
}

/// Attribute to declare a function that runs before RAM is initialized.
///
/// The function must have the signature `unsafe fn()`.
/// At this point:
/// - Stack and gp are valid
/// - .data, .bss and the coherent sections are NOT initialized
/// - The core still runs from the boot segment with interrupts disabled
///
/// # Example
///
/// ```ignore
/// #[pre_init]
/// unsafe fn disable_watchdog() {
///     // Stop WDT before the slow RAM init loops
/// }
/// ```
#[proc_macro_attribute]
pub fn pre_init(_args: TokenStream, input: TokenStream) -> TokenStream {
    let f = parse_macro_input!(input as ItemFn);

    let fn_attrs = &f.attrs;
    let fn_vis = &f.vis;
    let fn_sig = &f.sig;
    let fn_block = &f.block;

    quote!(
        #(#fn_attrs)*
        #[unsafe(export_name = "__pre_init")]
        #fn_vis #fn_sig #fn_block
    )
    .into()
}

/// Place a static into coherent (uncached) RAM.
///
/// Initialized statics are placed into `.coherent_data`, uninitialized
/// ones (`MaybeUninit::uninit()`) into `.coherent_bss`. The linker
/// script maps both sections to a KSEG1 region, so the CPU and DMA
/// peripherals see the same bytes without cache maintenance.
///
/// # Example
///
/// ```ignore
/// use core::mem::MaybeUninit;
/// use pic32mz_rt::coherent;
///
/// #[coherent]
/// static mut TX_DESCRIPTORS: [u32; 64] = [0; 64];
///
/// #[coherent]
/// static mut RX_RING: MaybeUninit<[u8; 1536]> = MaybeUninit::uninit();
/// ```
#[proc_macro_attribute]
pub fn coherent(_args: TokenStream, input: TokenStream) -> TokenStream {
    let item = parse_macro_input!(input as Item);

    match item {
        Item::Static(item) => {
            // Check if it's uninitialized (MaybeUninit::uninit())
            let section = if is_uninit_expr(&item.expr) {
                quote!(#[unsafe(link_section = ".coherent_bss")])
            } else {
                quote!(#[unsafe(link_section = ".coherent_data")])
            };

            quote!(
                #section
                #item
            )
            .into()
        }
        _ => {
            let span = item.span();
            syn::Error::new(span, "#[coherent] can only be applied to statics")
                .to_compile_error()
                .into()
        }
    }
}

fn is_uninit_expr(expr: &Expr) -> bool {
    if let Expr::Call(call) = expr {
        let s = quote!(#call).to_string();
        s.contains("MaybeUninit") && (s.contains("uninit()") || s.contains("uninit_array()"))
    } else {
        false
    }
}

/// Argument for the interrupt attribute.
struct InterruptArg {
    vector: syn::Path,
}

impl Parse for InterruptArg {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        Ok(InterruptArg {
            vector: input.parse()?,
        })
    }
}

/// Define a handler for a PIC32MZ interrupt vector.
///
/// The attribute takes the vector the handler serves, as a path to a
/// `Vector` variant (the path must resolve at the call site). It
/// generates a register-save trampoline in a `.vector.<NAME>` section
/// together with a `.vector_map` entry; during `_setup_interrupts` the
/// runtime walks the map and points the matching OFFx register at the
/// trampoline.
///
/// Status.EXL stays set until the trampoline returns through `eret`,
/// so the handler cannot be preempted by another interrupt.
///
/// # Example
///
/// ```ignore
/// use pic32mz_rt::{interrupt, interrupt::Vector};
///
/// #[interrupt(Vector::UART2_RX)]
/// fn uart2_rx_handler() {
///     // Drain the FIFO
/// }
/// ```
///
/// # Safety
///
/// The handler runs in interrupt context. It must:
/// - Clear the interrupt flag in IFSx before returning, or the vector
///   retriggers immediately
/// - Complete quickly
/// - Not wait on anything only another interrupt can provide
#[proc_macro_attribute]
pub fn interrupt(args: TokenStream, input: TokenStream) -> TokenStream {
    let args = parse_macro_input!(args as InterruptArg);
    let f = parse_macro_input!(input as ItemFn);

    let vector_path = &args.vector;
    let fn_name = &f.sig.ident;
    let fn_body = &f.block;
    let fn_attrs = &f.attrs;
    let fn_vis = &f.vis;

    // Get the vector name from the path (last segment)
    let vector_name = vector_path
        .segments
        .last()
        .map(|s| &s.ident)
        .expect("vector path should have at least one segment");

    let isr = LitStr::new(&format!("__isr_{}", vector_name), Span::call_site());
    let trampoline = format_ident!("__vector_{}", vector_name);
    let map_entry = format_ident!("__PIC32_VECTOR_{}", vector_name);
    let trampoline_asm = LitStr::new(&vector_trampoline(&vector_name.to_string()), Span::call_site());

    quote!(
        #(#fn_attrs)*
        #[unsafe(export_name = #isr)]
        #fn_vis unsafe extern "C" fn #vector_name() {
            // The original function body wrapped in unsafe
            #[inline(always)]
            unsafe fn #fn_name() #fn_body

            #fn_name()
        }

        ::core::arch::global_asm!(#trampoline_asm);

        unsafe extern "C" {
            fn #trampoline();
        }

        #[doc(hidden)]
        #[used]
        #[unsafe(link_section = ".vector_map")]
        static #map_entry: ::pic32mz_rt::interrupt::VectorEntry =
            ::pic32mz_rt::interrupt::VectorEntry::new(#vector_path, #trampoline);
    )
    .into()
}

// Interrupts are taken with EXL set and stay unmasked-nested-free until
// eret, so saving EPC, Status, hi/lo and the caller-saved GPRs is
// enough for the handler to be ordinary C-ABI Rust code. The context
// lives at 16($sp), above the o32 argument save area the called handler
// may clobber; offsets match the general exception frame.
fn vector_trampoline(vector_name: &str) -> String {
    format!(
        r#"
    .section .vector.{name}, "ax"
    .set push
    .set noreorder
    .set noat
    .global __vector_{name}
    .type __vector_{name}, @function
    .balign 4

__vector_{name}:
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

    jal     __isr_{name}
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
    .size __vector_{name}, . - __vector_{name}
"#,
        name = vector_name
    )
}
