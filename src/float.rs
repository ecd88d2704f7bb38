//! Soft-float entry points under the names XC32-built objects expect.
//!
//! Code compiled against the vendor toolchain's software floating point
//! references these symbols instead of the compiler-rt ones. Each is a
//! plain single-precision operation, so mixed links resolve without
//! pulling in a second soft-float library.

/// `a + b`.
#[cfg_attr(all(target_arch = "mips", target_os = "none"), no_mangle)]
pub extern "C" fn fpadd(a: f32, b: f32) -> f32 {
    a + b
}

/// `a - b`.
#[cfg_attr(all(target_arch = "mips", target_os = "none"), no_mangle)]
pub extern "C" fn fpsub(a: f32, b: f32) -> f32 {
    a - b
}

/// `a * b`.
#[cfg_attr(all(target_arch = "mips", target_os = "none"), no_mangle)]
pub extern "C" fn fpmul(a: f32, b: f32) -> f32 {
    a * b
}

/// `a / b`.
#[cfg_attr(all(target_arch = "mips", target_os = "none"), no_mangle)]
pub extern "C" fn fpdiv(a: f32, b: f32) -> f32 {
    a / b
}

/// Three-way comparison: -1, 0 or 1. Unordered operands compare as
/// equal.
#[cfg_attr(all(target_arch = "mips", target_os = "none"), no_mangle)]
pub extern "C" fn fpcmp(a: f32, b: f32) -> i32 {
    if a < b {
        -1
    } else if a > b {
        1
    } else {
        0
    }
}

/// Signed integer to single precision.
#[cfg_attr(all(target_arch = "mips", target_os = "none"), no_mangle)]
pub extern "C" fn sitofp(i: i32) -> f32 {
    i as f32
}

/// Single precision to signed integer, truncating toward zero.
/// Out-of-range values saturate and NaN converts to zero.
#[cfg_attr(all(target_arch = "mips", target_os = "none"), no_mangle)]
pub extern "C" fn fptosi(f: f32) -> i32 {
    f as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic() {
        assert_eq!(fpadd(1.5, 2.25), 3.75);
        assert_eq!(fpsub(1.0, 4.0), -3.0);
        assert_eq!(fpmul(3.0, -2.0), -6.0);
        assert_eq!(fpdiv(7.0, 2.0), 3.5);
    }

    #[test]
    fn test_division_special_cases() {
        assert_eq!(fpdiv(1.0, 0.0), f32::INFINITY);
        assert!(fpdiv(0.0, 0.0).is_nan());
    }

    #[test]
    fn test_compare_orders() {
        assert_eq!(fpcmp(1.0, 2.0), -1);
        assert_eq!(fpcmp(2.0, 1.0), 1);
        assert_eq!(fpcmp(1.0, 1.0), 0);
        assert_eq!(fpcmp(-0.0, 0.0), 0);
    }

    #[test]
    fn test_compare_treats_nan_as_equal() {
        assert_eq!(fpcmp(f32::NAN, 1.0), 0);
        assert_eq!(fpcmp(1.0, f32::NAN), 0);
    }

    #[test]
    fn test_int_to_float() {
        assert_eq!(sitofp(0), 0.0);
        assert_eq!(sitofp(-12), -12.0);
        assert_eq!(sitofp(1 << 20), 1048576.0);
    }

    #[test]
    fn test_float_to_int_truncates_toward_zero() {
        assert_eq!(fptosi(2.9), 2);
        assert_eq!(fptosi(-2.9), -2);
        assert_eq!(fptosi(0.0), 0);
    }

    #[test]
    fn test_float_to_int_saturates() {
        assert_eq!(fptosi(3.0e9), i32::MAX);
        assert_eq!(fptosi(-3.0e9), i32::MIN);
        assert_eq!(fptosi(f32::NAN), 0);
    }
}
