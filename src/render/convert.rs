//! Conversion between typed [`Image`] storage and straight-alpha `f32` RGBA.

use crate::foundation::core::{ComponentType, Endian, Image, ImageInfo, PixelType};
use crate::foundation::error::{BakeError, BakeResult};
use crate::foundation::math::{f16_bits_to_f32, f32_to_f16_bits, luma, quantize};
use crate::render::canvas::Rgba;

fn layout_of(info: &ImageInfo) -> BakeResult<(ComponentType, usize, usize)> {
    let component = info
        .pixel_type
        .component()
        .ok_or_else(|| BakeError::invalid_pixel_format(format!("{} has no interleaved layout", info.pixel_type)))?;
    let row_bytes = info
        .row_bytes()
        .ok_or_else(|| BakeError::invalid_pixel_format(info.pixel_type.to_string()))?;
    Ok((component, info.pixel_type.channel_count(), row_bytes))
}

fn read_component(bytes: &[u8], component: ComponentType, endian: Endian) -> f32 {
    let msb = endian == Endian::Msb;
    match component {
        ComponentType::U8 => f32::from(bytes[0]) / 255.0,
        ComponentType::U16 => {
            let b = [bytes[0], bytes[1]];
            let v = if msb { u16::from_be_bytes(b) } else { u16::from_le_bytes(b) };
            f32::from(v) / 65535.0
        }
        ComponentType::U32 => {
            let b = [bytes[0], bytes[1], bytes[2], bytes[3]];
            let v = if msb { u32::from_be_bytes(b) } else { u32::from_le_bytes(b) };
            (f64::from(v) / f64::from(u32::MAX)) as f32
        }
        ComponentType::F16 => {
            let b = [bytes[0], bytes[1]];
            f16_bits_to_f32(if msb { u16::from_be_bytes(b) } else { u16::from_le_bytes(b) })
        }
        ComponentType::F32 => {
            let b = [bytes[0], bytes[1], bytes[2], bytes[3]];
            if msb { f32::from_be_bytes(b) } else { f32::from_le_bytes(b) }
        }
    }
}

fn write_component(out: &mut [u8], v: f32, component: ComponentType, endian: Endian) {
    let msb = endian == Endian::Msb;
    match component {
        ComponentType::U8 => out[0] = quantize(v, 255.0) as u8,
        ComponentType::U16 => {
            let q = quantize(v, 65535.0) as u16;
            out.copy_from_slice(&if msb { q.to_be_bytes() } else { q.to_le_bytes() });
        }
        ComponentType::U32 => {
            let q = quantize(v, f64::from(u32::MAX)) as u32;
            out.copy_from_slice(&if msb { q.to_be_bytes() } else { q.to_le_bytes() });
        }
        ComponentType::F16 => {
            let h = f32_to_f16_bits(v);
            out.copy_from_slice(&if msb { h.to_be_bytes() } else { h.to_le_bytes() });
        }
        ComponentType::F32 => {
            out.copy_from_slice(&if msb { v.to_be_bytes() } else { v.to_le_bytes() });
        }
    }
}

/// Decode any interleaved image to straight-alpha RGBA; missing alpha reads as `1.0`.
pub fn decode_rgba(image: &Image) -> BakeResult<Vec<Rgba>> {
    let info = image.info();
    let (component, channels, row_bytes) = layout_of(info)?;
    let cs = component.byte_size();
    let (w, h) = (info.size.w as usize, info.size.h as usize);

    let mut out = Vec::with_capacity(w * h);
    for row in image.data().chunks_exact(row_bytes).take(h) {
        for px in row[..w * channels * cs].chunks_exact(channels * cs) {
            let ch = |i: usize| read_component(&px[i * cs..(i + 1) * cs], component, info.layout.endian);
            out.push(match channels {
                1 => {
                    let l = ch(0);
                    [l, l, l, 1.0]
                }
                2 => {
                    let l = ch(0);
                    [l, l, l, ch(1)]
                }
                3 => [ch(0), ch(1), ch(2), 1.0],
                _ => [ch(0), ch(1), ch(2), ch(3)],
            });
        }
    }
    Ok(out)
}

/// Encode RGBA pixels into `dst`'s pixel type, honoring its alignment and byte order.
///
/// Luminance types store Rec. 709 luma; alpha is dropped for types without it.
pub fn encode_rgba(pixels: &[Rgba], dst: &mut Image) -> BakeResult<()> {
    let info = *dst.info();
    let (component, channels, row_bytes) = layout_of(&info)?;
    let cs = component.byte_size();
    let (w, h) = (info.size.w as usize, info.size.h as usize);
    if pixels.len() != w * h {
        return Err(BakeError::render(format!(
            "{} pixels cannot fill a {} image",
            pixels.len(),
            info.size
        )));
    }

    for (y, row) in dst.data_mut().chunks_exact_mut(row_bytes).take(h).enumerate() {
        for (x, px) in row[..w * channels * cs].chunks_exact_mut(channels * cs).enumerate() {
            let [r, g, b, a] = pixels[y * w + x];
            let values: [f32; 4] = match channels {
                1 => [luma(r, g, b), 0.0, 0.0, 0.0],
                2 => [luma(r, g, b), a, 0.0, 0.0],
                3 => [r, g, b, 0.0],
                _ => [r, g, b, a],
            };
            for (i, v) in values.iter().take(channels).enumerate() {
                write_component(&mut px[i * cs..(i + 1) * cs], *v, component, info.layout.endian);
            }
        }
    }
    Ok(())
}

/// `true` when `pixel_type` can be produced by [`encode_rgba`].
pub fn is_encodable(pixel_type: PixelType) -> bool {
    pixel_type.component().is_some()
}

#[cfg(test)]
#[path = "../../tests/unit/render/convert.rs"]
mod tests;
