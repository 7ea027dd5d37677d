use crate::error::{XRayError, XrResult};
use image::RgbaImage;
use rayon::prelude::*;

// Rec. 601 luma weights used by the non-separable blend modes.
const LUM_R: f32 = 0.3;
const LUM_G: f32 = 0.59;
const LUM_B: f32 = 0.11;

type Rgb = [f32; 3];

#[inline(always)]
fn lum(c: Rgb) -> f32 {
    LUM_R * c[0] + LUM_G * c[1] + LUM_B * c[2]
}

/// Pulls an out-of-gamut colour back into [0, 1] along the luminosity axis.
#[inline(always)]
fn clip_color(c: Rgb) -> Rgb {
    let l = lum(c);
    let n = c[0].min(c[1]).min(c[2]);
    let x = c[0].max(c[1]).max(c[2]);
    let mut out = c;
    if n < 0.0 {
        for v in out.iter_mut() {
            *v = l + (*v - l) * l / (l - n);
        }
    }
    if x > 1.0 {
        for v in out.iter_mut() {
            *v = l + (*v - l) * (1.0 - l) / (x - l);
        }
    }
    out
}

#[inline(always)]
fn set_lum(c: Rgb, l: f32) -> Rgb {
    let d = l - lum(c);
    clip_color([c[0] + d, c[1] + d, c[2] + d])
}

/// "Color" blend of one pixel: hue and saturation from `src`, luminosity
/// from `dst`, composited source-over.
#[inline]
fn blend_pixel(dst: &mut [u8], src: &[u8]) {
    let sa = src[3] as f32 / 255.0;
    if sa == 0.0 {
        return;
    }
    let da = dst[3] as f32 / 255.0;

    let cs: Rgb = [
        src[0] as f32 / 255.0,
        src[1] as f32 / 255.0,
        src[2] as f32 / 255.0,
    ];
    let cb: Rgb = [
        dst[0] as f32 / 255.0,
        dst[1] as f32 / 255.0,
        dst[2] as f32 / 255.0,
    ];
    let mixed = set_lum(cs, lum(cb));

    let out_a = sa + da * (1.0 - sa);
    for i in 0..3 {
        let premul = sa * (1.0 - da) * cs[i] + da * (1.0 - sa) * cb[i] + sa * da * mixed[i];
        dst[i] = to_byte(premul / out_a);
    }
    dst[3] = to_byte(out_a);
}

#[inline(always)]
fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Composites `overlay` onto a copy of `background` with the "Color" blend
/// mode. Neither input is modified.
pub fn blend(background: &RgbaImage, overlay: &RgbaImage) -> XrResult<RgbaImage> {
    if background.dimensions() != overlay.dimensions() {
        return Err(XRayError::DimensionMismatch {
            what: "overlay",
            expected_width: background.width(),
            expected_height: background.height(),
            width: overlay.width(),
            height: overlay.height(),
        });
    }

    let mut output = background.clone();
    let dst: &mut [u8] = &mut output;
    dst.par_chunks_exact_mut(4)
        .zip(overlay.as_raw().par_chunks_exact(4))
        .for_each(|(d, s)| blend_pixel(d, s));

    Ok(output)
}
