//! Decoding of image XObjects into pixel buffers.
//!
//! Only color spaces that can be reproduced faithfully are decoded. Anything
//! else yields `Ok(None)` so callers skip the image instead of emitting
//! corrupted pixels.

use std::io::Read;

use flate2::read::ZlibDecoder;
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId, Stream};

use crate::error::{Error, Result};

/// Upper bound on decoded pixels, to refuse absurd image headers.
const MAX_PIXELS: u64 = 100_000_000;

/// Pixel layout of a decodable image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorModel {
    Gray,
    Rgb,
    Cmyk,
}

impl ColorModel {
    fn components(self) -> usize {
        match self {
            ColorModel::Gray => 1,
            ColorModel::Rgb => 3,
            ColorModel::Cmyk => 4,
        }
    }
}

/// Decode the image XObject `id`.
///
/// Returns `Ok(None)` when the object is not an image or uses an encoding
/// that is not supported (JPX, indexed or separation color, bit depths other
/// than 8, image masks).
pub fn decode_image(doc: &LopdfDocument, id: ObjectId) -> Result<Option<DynamicImage>> {
    let stream = match doc.get_object(id)? {
        Object::Stream(s) => s,
        _ => return Ok(None),
    };
    let dict = &stream.dict;

    if dict.get(b"Subtype").and_then(|s| s.as_name_str()).ok() != Some("Image") {
        return Ok(None);
    }
    if dict
        .get(b"ImageMask")
        .and_then(|m| m.as_bool())
        .unwrap_or(false)
    {
        return Ok(None);
    }

    let filters = stream_filters(dict);
    if filters.iter().any(|f| f == "DCTDecode") {
        let jpeg = image::load_from_memory_with_format(&stream.content, ImageFormat::Jpeg)?;
        return Ok(Some(jpeg));
    }
    if filters
        .iter()
        .any(|f| matches!(f.as_str(), "JPXDecode" | "JBIG2Decode" | "CCITTFaxDecode"))
    {
        log::debug!("Image {:?}: unsupported filter {:?}", id, filters);
        return Ok(None);
    }

    let width = dict_u32(dict, b"Width").ok_or_else(|| corrupted(id, "missing Width"))?;
    let height = dict_u32(dict, b"Height").ok_or_else(|| corrupted(id, "missing Height"))?;
    if width == 0 || height == 0 || width as u64 * height as u64 > MAX_PIXELS {
        return Err(corrupted(id, "invalid dimensions"));
    }

    let bits = dict_u32(dict, b"BitsPerComponent").unwrap_or(8);
    if bits != 8 {
        log::debug!("Image {:?}: unsupported bit depth {}", id, bits);
        return Ok(None);
    }

    let Some(model) = color_model(doc, dict) else {
        log::debug!("Image {:?}: unsupported color space", id);
        return Ok(None);
    };

    let data = stream_data(stream, &filters)?;
    let expected = width as usize * height as usize * model.components();
    if data.len() < expected {
        return Err(corrupted(
            id,
            &format!("expected {} bytes, found {}", expected, data.len()),
        ));
    }
    let data = &data[..expected];

    let image = match model {
        ColorModel::Gray => GrayImage::from_raw(width, height, data.to_vec())
            .map(DynamicImage::ImageLuma8),
        ColorModel::Rgb => {
            RgbImage::from_raw(width, height, data.to_vec()).map(DynamicImage::ImageRgb8)
        }
        ColorModel::Cmyk => {
            RgbImage::from_raw(width, height, cmyk_to_rgb(data)).map(DynamicImage::ImageRgb8)
        }
    };

    image
        .map(Some)
        .ok_or_else(|| corrupted(id, "buffer does not match dimensions"))
}

/// Whether [`decode_image`] would attempt to decode `id`, judged from the
/// stream dictionary alone.
pub fn is_supported(doc: &LopdfDocument, id: ObjectId) -> bool {
    let Ok(Object::Stream(stream)) = doc.get_object(id) else {
        return false;
    };
    let dict = &stream.dict;

    if dict.get(b"Subtype").and_then(|s| s.as_name_str()).ok() != Some("Image") {
        return false;
    }
    if dict
        .get(b"ImageMask")
        .and_then(|m| m.as_bool())
        .unwrap_or(false)
    {
        return false;
    }

    let filters = stream_filters(dict);
    if filters.iter().any(|f| f == "DCTDecode") {
        return true;
    }
    if filters
        .iter()
        .any(|f| matches!(f.as_str(), "JPXDecode" | "JBIG2Decode" | "CCITTFaxDecode"))
    {
        return false;
    }

    dict_u32(dict, b"BitsPerComponent").unwrap_or(8) == 8 && color_model(doc, dict).is_some()
}

/// Resolve the color space of an image dictionary.
pub fn color_model(doc: &LopdfDocument, dict: &Dictionary) -> Option<ColorModel> {
    let cs = dict.get(b"ColorSpace").ok()?;
    let cs = doc.dereference(cs).ok()?.1;

    match cs {
        Object::Name(name) => name_model(name),
        Object::Array(arr) => {
            let family = arr.first()?.as_name().ok()?;
            match family {
                b"ICCBased" => {
                    let profile = arr.get(1)?;
                    let (_, profile) = doc.dereference(profile).ok()?;
                    let n = profile.as_stream().ok()?.dict.get(b"N").ok()?.as_i64().ok()?;
                    match n {
                        1 => Some(ColorModel::Gray),
                        3 => Some(ColorModel::Rgb),
                        4 => Some(ColorModel::Cmyk),
                        _ => None,
                    }
                }
                b"CalRGB" => Some(ColorModel::Rgb),
                b"CalGray" => Some(ColorModel::Gray),
                // Indexed, Separation, DeviceN, Lab
                _ => None,
            }
        }
        _ => None,
    }
}

fn name_model(name: &[u8]) -> Option<ColorModel> {
    match name {
        b"DeviceGray" | b"G" | b"CalGray" => Some(ColorModel::Gray),
        b"DeviceRGB" | b"RGB" | b"CalRGB" => Some(ColorModel::Rgb),
        b"DeviceCMYK" | b"CMYK" => Some(ColorModel::Cmyk),
        _ => None,
    }
}

/// Naive CMYK to RGB conversion, no color management.
pub fn cmyk_to_rgb(data: &[u8]) -> Vec<u8> {
    data.chunks_exact(4)
        .flat_map(|px| {
            let k = 255 - px[3] as u16;
            [
                ((255 - px[0] as u16) * k / 255) as u8,
                ((255 - px[1] as u16) * k / 255) as u8,
                ((255 - px[2] as u16) * k / 255) as u8,
            ]
        })
        .collect()
}

fn stream_filters(dict: &Dictionary) -> Vec<String> {
    match dict.get(b"Filter") {
        Ok(Object::Name(n)) => vec![String::from_utf8_lossy(n).to_string()],
        Ok(Object::Array(arr)) => arr
            .iter()
            .filter_map(|o| o.as_name_str().ok())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}

/// Decoded sample bytes of a non-JPEG image stream.
fn stream_data(stream: &Stream, filters: &[String]) -> Result<Vec<u8>> {
    if filters.is_empty() {
        return Ok(stream.content.clone());
    }
    if let Ok(data) = stream.decompressed_content() {
        return Ok(data);
    }
    // lopdf refuses some streams (e.g. unusual DecodeParms); plain zlib
    // without a predictor is still recoverable.
    if filters.len() == 1 && filters[0] == "FlateDecode" {
        let mut decoder = ZlibDecoder::new(stream.content.as_slice());
        let mut data = Vec::new();
        decoder.read_to_end(&mut data)?;
        return Ok(data);
    }
    Err(Error::Corrupted(format!(
        "cannot decode image stream with filters {:?}",
        filters
    )))
}

fn dict_u32(dict: &Dictionary, key: &[u8]) -> Option<u32> {
    dict.get(key)
        .ok()
        .and_then(|o| o.as_i64().ok())
        .and_then(|v| u32::try_from(v).ok())
}

fn corrupted(id: ObjectId, reason: &str) -> Error {
    Error::Corrupted(format!("image object {} {}: {}", id.0, id.1, reason))
}
