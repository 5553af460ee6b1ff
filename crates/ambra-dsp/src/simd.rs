//! Pointwise SIMD kernels for the DSP components.
//!
//! Every operation has a scalar fallback plus a 4-wide vector path (SSE on
//! x86_64, NEON on aarch64). Both vector instruction sets are baseline
//! features of their architectures, so dispatch is decided at compile time.
//! Vector bodies process 4-sample groups and leave the remainder to scalar
//! tail loops.

use ambra_core::{fast_reciprocal_sqrt, Sample, MEMORY_ALIGNMENT_BYTES};

/// Width of the vector paths, in samples.
pub const SIMD_LENGTH: usize = 4;

/// Scale factor between float and 16-bit integer samples. Symmetric in both
/// directions so that int16 -> float -> int16 round-trips exactly.
pub const INT16_SCALE: Sample = 32767.0;

/// Returns whether the pointer is aligned for the vector paths.
#[inline]
pub fn is_aligned(pointer: *const Sample) -> bool {
    pointer as usize % MEMORY_ALIGNMENT_BYTES == 0
}

// ============ Scalar Implementations (Fallback) ============

fn add_scalar(input: &[Sample], accumulator: &mut [Sample]) {
    for (acc, x) in accumulator.iter_mut().zip(input) {
        *acc += *x;
    }
}

fn subtract_scalar(input: &[Sample], accumulator: &mut [Sample]) {
    for (acc, x) in accumulator.iter_mut().zip(input) {
        *acc -= *x;
    }
}

fn multiply_scalar(input_a: &[Sample], input_b: &[Sample], output: &mut [Sample]) {
    for ((out, a), b) in output.iter_mut().zip(input_a).zip(input_b) {
        *out = *a * *b;
    }
}

fn multiply_accumulate_scalar(input_a: &[Sample], input_b: &[Sample], accumulator: &mut [Sample]) {
    for ((acc, a), b) in accumulator.iter_mut().zip(input_a).zip(input_b) {
        *acc += *a * *b;
    }
}

fn scalar_multiply_scalar(buffer: &mut [Sample], gain: Sample) {
    for sample in buffer.iter_mut() {
        *sample *= gain;
    }
}

fn scalar_multiply_accumulate_scalar(gain: Sample, input: &[Sample], accumulator: &mut [Sample]) {
    for (acc, x) in accumulator.iter_mut().zip(input) {
        *acc += gain * *x;
    }
}

fn approx_complex_magnitude_scalar(interleaved: &[Sample], output: &mut [Sample]) {
    for (out, pair) in output.iter_mut().zip(interleaved.chunks_exact(2)) {
        let squared = pair[0] * pair[0] + pair[1] * pair[1];
        *out = if squared > 0.0 {
            squared * fast_reciprocal_sqrt(squared)
        } else {
            0.0
        };
    }
}

#[inline]
fn int16_from_float_single(sample: Sample) -> i16 {
    (sample.clamp(-1.0, 1.0) * INT16_SCALE).round() as i16
}

fn int16_from_float_scalar(input: &[Sample], output: &mut [i16]) {
    for (out, x) in output.iter_mut().zip(input) {
        *out = int16_from_float_single(*x);
    }
}

fn float_from_int16_scalar(input: &[i16], output: &mut [Sample]) {
    for (out, x) in output.iter_mut().zip(input) {
        *out = *x as Sample / INT16_SCALE;
    }
}

fn interleave_stereo_scalar(channel_0: &[Sample], channel_1: &[Sample], interleaved: &mut [Sample]) {
    for ((frame, l), r) in interleaved.chunks_exact_mut(2).zip(channel_0).zip(channel_1) {
        frame[0] = *l;
        frame[1] = *r;
    }
}

fn deinterleave_stereo_scalar(
    interleaved: &[Sample],
    channel_0: &mut [Sample],
    channel_1: &mut [Sample],
) {
    for ((frame, l), r) in interleaved
        .chunks_exact(2)
        .zip(channel_0.iter_mut())
        .zip(channel_1.iter_mut())
    {
        *l = frame[0];
        *r = frame[1];
    }
}

// ============ x86_64 SSE Implementations ============

#[cfg(target_arch = "x86_64")]
mod x86_impl {
    use super::*;
    use std::arch::x86_64::*;

    pub unsafe fn add_impl(input: &[Sample], accumulator: &mut [Sample]) {
        let len = accumulator.len().min(input.len());
        let simd_len = len - (len % SIMD_LENGTH);
        let acc_ptr = accumulator.as_mut_ptr();
        let in_ptr = input.as_ptr();
        for i in (0..simd_len).step_by(SIMD_LENGTH) {
            let acc = _mm_loadu_ps(acc_ptr.add(i));
            let x = _mm_loadu_ps(in_ptr.add(i));
            _mm_storeu_ps(acc_ptr.add(i), _mm_add_ps(acc, x));
        }
        add_scalar(&input[simd_len..len], &mut accumulator[simd_len..len]);
    }

    pub unsafe fn subtract_impl(input: &[Sample], accumulator: &mut [Sample]) {
        let len = accumulator.len().min(input.len());
        let simd_len = len - (len % SIMD_LENGTH);
        let acc_ptr = accumulator.as_mut_ptr();
        let in_ptr = input.as_ptr();
        for i in (0..simd_len).step_by(SIMD_LENGTH) {
            let acc = _mm_loadu_ps(acc_ptr.add(i));
            let x = _mm_loadu_ps(in_ptr.add(i));
            _mm_storeu_ps(acc_ptr.add(i), _mm_sub_ps(acc, x));
        }
        subtract_scalar(&input[simd_len..len], &mut accumulator[simd_len..len]);
    }

    pub unsafe fn multiply_impl(input_a: &[Sample], input_b: &[Sample], output: &mut [Sample]) {
        let len = output.len();
        let simd_len = len - (len % SIMD_LENGTH);
        let a_ptr = input_a.as_ptr();
        let b_ptr = input_b.as_ptr();
        let out_ptr = output.as_mut_ptr();
        for i in (0..simd_len).step_by(SIMD_LENGTH) {
            let a = _mm_loadu_ps(a_ptr.add(i));
            let b = _mm_loadu_ps(b_ptr.add(i));
            _mm_storeu_ps(out_ptr.add(i), _mm_mul_ps(a, b));
        }
        multiply_scalar(
            &input_a[simd_len..len],
            &input_b[simd_len..len],
            &mut output[simd_len..len],
        );
    }

    pub unsafe fn multiply_accumulate_impl(
        input_a: &[Sample],
        input_b: &[Sample],
        accumulator: &mut [Sample],
    ) {
        let len = accumulator.len();
        let simd_len = len - (len % SIMD_LENGTH);
        let a_ptr = input_a.as_ptr();
        let b_ptr = input_b.as_ptr();
        let acc_ptr = accumulator.as_mut_ptr();
        for i in (0..simd_len).step_by(SIMD_LENGTH) {
            let a = _mm_loadu_ps(a_ptr.add(i));
            let b = _mm_loadu_ps(b_ptr.add(i));
            let acc = _mm_loadu_ps(acc_ptr.add(i));
            _mm_storeu_ps(acc_ptr.add(i), _mm_add_ps(acc, _mm_mul_ps(a, b)));
        }
        multiply_accumulate_scalar(
            &input_a[simd_len..len],
            &input_b[simd_len..len],
            &mut accumulator[simd_len..len],
        );
    }

    pub unsafe fn scalar_multiply_impl(buffer: &mut [Sample], gain: Sample) {
        let len = buffer.len();
        let simd_len = len - (len % SIMD_LENGTH);
        let gain_vec = _mm_set1_ps(gain);
        let ptr = buffer.as_mut_ptr();
        for i in (0..simd_len).step_by(SIMD_LENGTH) {
            let x = _mm_loadu_ps(ptr.add(i));
            _mm_storeu_ps(ptr.add(i), _mm_mul_ps(x, gain_vec));
        }
        scalar_multiply_scalar(&mut buffer[simd_len..len], gain);
    }

    pub unsafe fn scalar_multiply_accumulate_impl(
        gain: Sample,
        input: &[Sample],
        accumulator: &mut [Sample],
    ) {
        let len = accumulator.len().min(input.len());
        let simd_len = len - (len % SIMD_LENGTH);
        let gain_vec = _mm_set1_ps(gain);
        let in_ptr = input.as_ptr();
        let acc_ptr = accumulator.as_mut_ptr();
        for i in (0..simd_len).step_by(SIMD_LENGTH) {
            let x = _mm_loadu_ps(in_ptr.add(i));
            let acc = _mm_loadu_ps(acc_ptr.add(i));
            _mm_storeu_ps(acc_ptr.add(i), _mm_add_ps(acc, _mm_mul_ps(x, gain_vec)));
        }
        scalar_multiply_accumulate_scalar(
            gain,
            &input[simd_len..len],
            &mut accumulator[simd_len..len],
        );
    }

    pub unsafe fn approx_complex_magnitude_impl(interleaved: &[Sample], output: &mut [Sample]) {
        let len = output.len();
        let simd_len = len - (len % SIMD_LENGTH);
        let in_ptr = interleaved.as_ptr();
        let out_ptr = output.as_mut_ptr();
        let zero = _mm_setzero_ps();
        for i in (0..simd_len).step_by(SIMD_LENGTH) {
            // Two loads hold four interleaved (re, im) pairs.
            let lo = _mm_loadu_ps(in_ptr.add(2 * i));
            let hi = _mm_loadu_ps(in_ptr.add(2 * i + 4));
            let re = _mm_shuffle_ps::<0b10_00_10_00>(lo, hi);
            let im = _mm_shuffle_ps::<0b11_01_11_01>(lo, hi);
            let squared = _mm_add_ps(_mm_mul_ps(re, re), _mm_mul_ps(im, im));
            // |z| = z^2 * rsqrt(z^2), masked so zero inputs stay zero.
            let mask = _mm_cmpgt_ps(squared, zero);
            let magnitude = _mm_mul_ps(squared, _mm_rsqrt_ps(squared));
            _mm_storeu_ps(out_ptr.add(i), _mm_and_ps(magnitude, mask));
        }
        approx_complex_magnitude_scalar(&interleaved[2 * simd_len..], &mut output[simd_len..len]);
    }

    pub unsafe fn int16_from_float_impl(input: &[Sample], output: &mut [i16]) {
        let len = output.len().min(input.len());
        let simd_len = len - (len % SIMD_LENGTH);
        let scale = _mm_set1_ps(INT16_SCALE);
        let min = _mm_set1_ps(-1.0);
        let max = _mm_set1_ps(1.0);
        let in_ptr = input.as_ptr();
        let out_ptr = output.as_mut_ptr();
        for i in (0..simd_len).step_by(SIMD_LENGTH) {
            let x = _mm_loadu_ps(in_ptr.add(i));
            let clamped = _mm_min_ps(_mm_max_ps(x, min), max);
            let scaled = _mm_cvtps_epi32(_mm_mul_ps(clamped, scale));
            let packed = _mm_packs_epi32(scaled, scaled);
            _mm_storel_epi64(out_ptr.add(i) as *mut __m128i, packed);
        }
        int16_from_float_scalar(&input[simd_len..len], &mut output[simd_len..len]);
    }

    pub unsafe fn float_from_int16_impl(input: &[i16], output: &mut [Sample]) {
        let len = output.len().min(input.len());
        let simd_len = len - (len % SIMD_LENGTH);
        let scale = _mm_set1_ps(1.0 / INT16_SCALE);
        let in_ptr = input.as_ptr();
        let out_ptr = output.as_mut_ptr();
        for i in (0..simd_len).step_by(SIMD_LENGTH) {
            let raw = _mm_loadl_epi64(in_ptr.add(i) as *const __m128i);
            // Sign-extend 16 -> 32 bit with SSE2-only operations.
            let widened = _mm_srai_epi32(_mm_unpacklo_epi16(raw, raw), 16);
            let x = _mm_cvtepi32_ps(widened);
            _mm_storeu_ps(out_ptr.add(i), _mm_mul_ps(x, scale));
        }
        float_from_int16_scalar(&input[simd_len..len], &mut output[simd_len..len]);
    }

    pub unsafe fn interleave_stereo_impl(
        channel_0: &[Sample],
        channel_1: &[Sample],
        interleaved: &mut [Sample],
    ) {
        let len = channel_0.len().min(channel_1.len());
        let simd_len = len - (len % SIMD_LENGTH);
        let l_ptr = channel_0.as_ptr();
        let r_ptr = channel_1.as_ptr();
        let out_ptr = interleaved.as_mut_ptr();
        for i in (0..simd_len).step_by(SIMD_LENGTH) {
            let l = _mm_loadu_ps(l_ptr.add(i));
            let r = _mm_loadu_ps(r_ptr.add(i));
            _mm_storeu_ps(out_ptr.add(2 * i), _mm_unpacklo_ps(l, r));
            _mm_storeu_ps(out_ptr.add(2 * i + 4), _mm_unpackhi_ps(l, r));
        }
        interleave_stereo_scalar(
            &channel_0[simd_len..len],
            &channel_1[simd_len..len],
            &mut interleaved[2 * simd_len..2 * len],
        );
    }

    pub unsafe fn deinterleave_stereo_impl(
        interleaved: &[Sample],
        channel_0: &mut [Sample],
        channel_1: &mut [Sample],
    ) {
        let len = channel_0.len().min(channel_1.len());
        let simd_len = len - (len % SIMD_LENGTH);
        let in_ptr = interleaved.as_ptr();
        let l_ptr = channel_0.as_mut_ptr();
        let r_ptr = channel_1.as_mut_ptr();
        for i in (0..simd_len).step_by(SIMD_LENGTH) {
            let lo = _mm_loadu_ps(in_ptr.add(2 * i));
            let hi = _mm_loadu_ps(in_ptr.add(2 * i + 4));
            _mm_storeu_ps(l_ptr.add(i), _mm_shuffle_ps::<0b10_00_10_00>(lo, hi));
            _mm_storeu_ps(r_ptr.add(i), _mm_shuffle_ps::<0b11_01_11_01>(lo, hi));
        }
        deinterleave_stereo_scalar(
            &interleaved[2 * simd_len..2 * len],
            &mut channel_0[simd_len..len],
            &mut channel_1[simd_len..len],
        );
    }
}

// ============ aarch64 NEON Implementations ============

#[cfg(target_arch = "aarch64")]
mod arm_impl {
    use super::*;
    use std::arch::aarch64::*;

    pub unsafe fn add_impl(input: &[Sample], accumulator: &mut [Sample]) {
        let len = accumulator.len().min(input.len());
        let simd_len = len - (len % SIMD_LENGTH);
        let acc_ptr = accumulator.as_mut_ptr();
        let in_ptr = input.as_ptr();
        for i in (0..simd_len).step_by(SIMD_LENGTH) {
            let acc = vld1q_f32(acc_ptr.add(i));
            let x = vld1q_f32(in_ptr.add(i));
            vst1q_f32(acc_ptr.add(i), vaddq_f32(acc, x));
        }
        add_scalar(&input[simd_len..len], &mut accumulator[simd_len..len]);
    }

    pub unsafe fn subtract_impl(input: &[Sample], accumulator: &mut [Sample]) {
        let len = accumulator.len().min(input.len());
        let simd_len = len - (len % SIMD_LENGTH);
        let acc_ptr = accumulator.as_mut_ptr();
        let in_ptr = input.as_ptr();
        for i in (0..simd_len).step_by(SIMD_LENGTH) {
            let acc = vld1q_f32(acc_ptr.add(i));
            let x = vld1q_f32(in_ptr.add(i));
            vst1q_f32(acc_ptr.add(i), vsubq_f32(acc, x));
        }
        subtract_scalar(&input[simd_len..len], &mut accumulator[simd_len..len]);
    }

    pub unsafe fn multiply_impl(input_a: &[Sample], input_b: &[Sample], output: &mut [Sample]) {
        let len = output.len();
        let simd_len = len - (len % SIMD_LENGTH);
        let a_ptr = input_a.as_ptr();
        let b_ptr = input_b.as_ptr();
        let out_ptr = output.as_mut_ptr();
        for i in (0..simd_len).step_by(SIMD_LENGTH) {
            let a = vld1q_f32(a_ptr.add(i));
            let b = vld1q_f32(b_ptr.add(i));
            vst1q_f32(out_ptr.add(i), vmulq_f32(a, b));
        }
        multiply_scalar(
            &input_a[simd_len..len],
            &input_b[simd_len..len],
            &mut output[simd_len..len],
        );
    }

    pub unsafe fn multiply_accumulate_impl(
        input_a: &[Sample],
        input_b: &[Sample],
        accumulator: &mut [Sample],
    ) {
        let len = accumulator.len();
        let simd_len = len - (len % SIMD_LENGTH);
        let a_ptr = input_a.as_ptr();
        let b_ptr = input_b.as_ptr();
        let acc_ptr = accumulator.as_mut_ptr();
        for i in (0..simd_len).step_by(SIMD_LENGTH) {
            let a = vld1q_f32(a_ptr.add(i));
            let b = vld1q_f32(b_ptr.add(i));
            let acc = vld1q_f32(acc_ptr.add(i));
            vst1q_f32(acc_ptr.add(i), vfmaq_f32(acc, a, b));
        }
        multiply_accumulate_scalar(
            &input_a[simd_len..len],
            &input_b[simd_len..len],
            &mut accumulator[simd_len..len],
        );
    }

    pub unsafe fn scalar_multiply_impl(buffer: &mut [Sample], gain: Sample) {
        let len = buffer.len();
        let simd_len = len - (len % SIMD_LENGTH);
        let gain_vec = vdupq_n_f32(gain);
        let ptr = buffer.as_mut_ptr();
        for i in (0..simd_len).step_by(SIMD_LENGTH) {
            let x = vld1q_f32(ptr.add(i));
            vst1q_f32(ptr.add(i), vmulq_f32(x, gain_vec));
        }
        scalar_multiply_scalar(&mut buffer[simd_len..len], gain);
    }

    pub unsafe fn scalar_multiply_accumulate_impl(
        gain: Sample,
        input: &[Sample],
        accumulator: &mut [Sample],
    ) {
        let len = accumulator.len().min(input.len());
        let simd_len = len - (len % SIMD_LENGTH);
        let gain_vec = vdupq_n_f32(gain);
        let in_ptr = input.as_ptr();
        let acc_ptr = accumulator.as_mut_ptr();
        for i in (0..simd_len).step_by(SIMD_LENGTH) {
            let x = vld1q_f32(in_ptr.add(i));
            let acc = vld1q_f32(acc_ptr.add(i));
            vst1q_f32(acc_ptr.add(i), vfmaq_f32(acc, x, gain_vec));
        }
        scalar_multiply_accumulate_scalar(
            gain,
            &input[simd_len..len],
            &mut accumulator[simd_len..len],
        );
    }

    pub unsafe fn approx_complex_magnitude_impl(interleaved: &[Sample], output: &mut [Sample]) {
        let len = output.len();
        let simd_len = len - (len % SIMD_LENGTH);
        let in_ptr = interleaved.as_ptr();
        let out_ptr = output.as_mut_ptr();
        for i in (0..simd_len).step_by(SIMD_LENGTH) {
            let pairs = vld2q_f32(in_ptr.add(2 * i));
            let squared = vfmaq_f32(vmulq_f32(pairs.0, pairs.0), pairs.1, pairs.1);
            // One Newton-Raphson refinement keeps the estimate within 2e-3.
            let mut estimate = vrsqrteq_f32(squared);
            estimate = vmulq_f32(estimate, vrsqrtsq_f32(vmulq_f32(squared, estimate), estimate));
            let magnitude = vmulq_f32(squared, estimate);
            let mask = vcgtq_f32(squared, vdupq_n_f32(0.0));
            vst1q_f32(
                out_ptr.add(i),
                vbslq_f32(mask, magnitude, vdupq_n_f32(0.0)),
            );
        }
        approx_complex_magnitude_scalar(&interleaved[2 * simd_len..], &mut output[simd_len..len]);
    }

    pub unsafe fn interleave_stereo_impl(
        channel_0: &[Sample],
        channel_1: &[Sample],
        interleaved: &mut [Sample],
    ) {
        let len = channel_0.len().min(channel_1.len());
        let simd_len = len - (len % SIMD_LENGTH);
        let l_ptr = channel_0.as_ptr();
        let r_ptr = channel_1.as_ptr();
        let out_ptr = interleaved.as_mut_ptr();
        for i in (0..simd_len).step_by(SIMD_LENGTH) {
            let frames = float32x4x2_t(vld1q_f32(l_ptr.add(i)), vld1q_f32(r_ptr.add(i)));
            vst2q_f32(out_ptr.add(2 * i), frames);
        }
        interleave_stereo_scalar(
            &channel_0[simd_len..len],
            &channel_1[simd_len..len],
            &mut interleaved[2 * simd_len..2 * len],
        );
    }

    pub unsafe fn deinterleave_stereo_impl(
        interleaved: &[Sample],
        channel_0: &mut [Sample],
        channel_1: &mut [Sample],
    ) {
        let len = channel_0.len().min(channel_1.len());
        let simd_len = len - (len % SIMD_LENGTH);
        let in_ptr = interleaved.as_ptr();
        let l_ptr = channel_0.as_mut_ptr();
        let r_ptr = channel_1.as_mut_ptr();
        for i in (0..simd_len).step_by(SIMD_LENGTH) {
            let frames = vld2q_f32(in_ptr.add(2 * i));
            vst1q_f32(l_ptr.add(i), frames.0);
            vst1q_f32(r_ptr.add(i), frames.1);
        }
        deinterleave_stereo_scalar(
            &interleaved[2 * simd_len..2 * len],
            &mut channel_0[simd_len..len],
            &mut channel_1[simd_len..len],
        );
    }
}

// ============ Public Entry Points ============

/// accumulator += input, pointwise.
#[inline]
pub fn add_pointwise(input: &[Sample], accumulator: &mut [Sample]) {
    assert_eq!(input.len(), accumulator.len());
    #[cfg(target_arch = "x86_64")]
    unsafe {
        x86_impl::add_impl(input, accumulator)
    }
    #[cfg(target_arch = "aarch64")]
    unsafe {
        arm_impl::add_impl(input, accumulator)
    }
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    add_scalar(input, accumulator);
}

/// accumulator -= input, pointwise.
#[inline]
pub fn subtract_pointwise(input: &[Sample], accumulator: &mut [Sample]) {
    assert_eq!(input.len(), accumulator.len());
    #[cfg(target_arch = "x86_64")]
    unsafe {
        x86_impl::subtract_impl(input, accumulator)
    }
    #[cfg(target_arch = "aarch64")]
    unsafe {
        arm_impl::subtract_impl(input, accumulator)
    }
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    subtract_scalar(input, accumulator);
}

/// output = input_a * input_b, pointwise.
#[inline]
pub fn multiply_pointwise(input_a: &[Sample], input_b: &[Sample], output: &mut [Sample]) {
    assert_eq!(input_a.len(), output.len());
    assert_eq!(input_b.len(), output.len());
    #[cfg(target_arch = "x86_64")]
    unsafe {
        x86_impl::multiply_impl(input_a, input_b, output)
    }
    #[cfg(target_arch = "aarch64")]
    unsafe {
        arm_impl::multiply_impl(input_a, input_b, output)
    }
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    multiply_scalar(input_a, input_b, output);
}

/// accumulator += input_a * input_b, pointwise.
#[inline]
pub fn multiply_and_accumulate(input_a: &[Sample], input_b: &[Sample], accumulator: &mut [Sample]) {
    assert_eq!(input_a.len(), accumulator.len());
    assert_eq!(input_b.len(), accumulator.len());
    #[cfg(target_arch = "x86_64")]
    unsafe {
        x86_impl::multiply_accumulate_impl(input_a, input_b, accumulator)
    }
    #[cfg(target_arch = "aarch64")]
    unsafe {
        arm_impl::multiply_accumulate_impl(input_a, input_b, accumulator)
    }
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    multiply_accumulate_scalar(input_a, input_b, accumulator);
}

/// buffer *= gain.
#[inline]
pub fn scalar_multiply(buffer: &mut [Sample], gain: Sample) {
    #[cfg(target_arch = "x86_64")]
    unsafe {
        x86_impl::scalar_multiply_impl(buffer, gain)
    }
    #[cfg(target_arch = "aarch64")]
    unsafe {
        arm_impl::scalar_multiply_impl(buffer, gain)
    }
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    scalar_multiply_scalar(buffer, gain);
}

/// accumulator += gain * input.
#[inline]
pub fn scalar_multiply_and_accumulate(gain: Sample, input: &[Sample], accumulator: &mut [Sample]) {
    assert_eq!(input.len(), accumulator.len());
    #[cfg(target_arch = "x86_64")]
    unsafe {
        x86_impl::scalar_multiply_accumulate_impl(gain, input, accumulator)
    }
    #[cfg(target_arch = "aarch64")]
    unsafe {
        arm_impl::scalar_multiply_accumulate_impl(gain, input, accumulator)
    }
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    scalar_multiply_accumulate_scalar(gain, input, accumulator);
}

/// Approximate magnitudes of interleaved complex numbers:
/// output[i] = |interleaved[2i] + j * interleaved[2i + 1]|. Precision follows
/// the reciprocal-sqrt approximation (about 2e-3 relative).
#[inline]
pub fn approx_complex_magnitude(interleaved: &[Sample], output: &mut [Sample]) {
    assert_eq!(interleaved.len(), 2 * output.len());
    #[cfg(target_arch = "x86_64")]
    unsafe {
        x86_impl::approx_complex_magnitude_impl(interleaved, output)
    }
    #[cfg(target_arch = "aarch64")]
    unsafe {
        arm_impl::approx_complex_magnitude_impl(interleaved, output)
    }
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    approx_complex_magnitude_scalar(interleaved, output);
}

/// Converts float samples in [-1, 1] to clamped 16-bit integers.
#[inline]
pub fn int16_from_float(input: &[Sample], output: &mut [i16]) {
    assert_eq!(input.len(), output.len());
    #[cfg(target_arch = "x86_64")]
    unsafe {
        x86_impl::int16_from_float_impl(input, output)
    }
    #[cfg(not(target_arch = "x86_64"))]
    int16_from_float_scalar(input, output);
}

/// Converts 16-bit integer samples to floats in [-1, 1].
#[inline]
pub fn float_from_int16(input: &[i16], output: &mut [Sample]) {
    assert_eq!(input.len(), output.len());
    #[cfg(target_arch = "x86_64")]
    unsafe {
        x86_impl::float_from_int16_impl(input, output)
    }
    #[cfg(not(target_arch = "x86_64"))]
    float_from_int16_scalar(input, output);
}

/// Interleaves two mono channels into a stereo buffer of twice the length.
#[inline]
pub fn interleave_stereo(channel_0: &[Sample], channel_1: &[Sample], interleaved: &mut [Sample]) {
    assert_eq!(channel_0.len(), channel_1.len());
    assert_eq!(interleaved.len(), 2 * channel_0.len());
    #[cfg(target_arch = "x86_64")]
    unsafe {
        x86_impl::interleave_stereo_impl(channel_0, channel_1, interleaved)
    }
    #[cfg(target_arch = "aarch64")]
    unsafe {
        arm_impl::interleave_stereo_impl(channel_0, channel_1, interleaved)
    }
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    interleave_stereo_scalar(channel_0, channel_1, interleaved);
}

/// Splits a stereo interleaved buffer into two mono channels.
#[inline]
pub fn deinterleave_stereo(
    interleaved: &[Sample],
    channel_0: &mut [Sample],
    channel_1: &mut [Sample],
) {
    assert_eq!(channel_0.len(), channel_1.len());
    assert_eq!(interleaved.len(), 2 * channel_0.len());
    #[cfg(target_arch = "x86_64")]
    unsafe {
        x86_impl::deinterleave_stereo_impl(interleaved, channel_0, channel_1)
    }
    #[cfg(target_arch = "aarch64")]
    unsafe {
        arm_impl::deinterleave_stereo_impl(interleaved, channel_0, channel_1)
    }
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    deinterleave_stereo_scalar(interleaved, channel_0, channel_1);
}

/// Interleaves two mono float channels into a stereo 16-bit buffer.
pub fn interleave_stereo_int16(channel_0: &[Sample], channel_1: &[Sample], interleaved: &mut [i16]) {
    assert_eq!(channel_0.len(), channel_1.len());
    assert_eq!(interleaved.len(), 2 * channel_0.len());
    for ((frame, l), r) in interleaved.chunks_exact_mut(2).zip(channel_0).zip(channel_1) {
        frame[0] = int16_from_float_single(*l);
        frame[1] = int16_from_float_single(*r);
    }
}

/// Splits a stereo interleaved 16-bit buffer into two mono float channels.
pub fn deinterleave_stereo_int16(
    interleaved: &[i16],
    channel_0: &mut [Sample],
    channel_1: &mut [Sample],
) {
    assert_eq!(channel_0.len(), channel_1.len());
    assert_eq!(interleaved.len(), 2 * channel_0.len());
    for ((frame, l), r) in interleaved
        .chunks_exact(2)
        .zip(channel_0.iter_mut())
        .zip(channel_1.iter_mut())
    {
        *l = frame[0] as Sample / INT16_SCALE;
        *r = frame[1] as Sample / INT16_SCALE;
    }
}

// ============ Tests ============
