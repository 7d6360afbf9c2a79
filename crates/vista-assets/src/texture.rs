use crate::error::AssetError;

/// Tightly packed RGBA8 pixels, row-major from the top-left corner.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedTexture {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl DecodedTexture {
    /// A 1x1 opaque white texel, bound until the real texture arrives.
    pub fn white() -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: vec![255; 4],
        }
    }

    pub fn bytes_per_row(&self) -> u32 {
        self.width * 4
    }
}

/// Decode a PNG or JPEG file into RGBA8.
pub fn decode_texture(bytes: &[u8]) -> Result<DecodedTexture, AssetError> {
    let image = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = image.dimensions();
    Ok(DecodedTexture {
        width,
        height,
        rgba: image.into_raw(),
    })
}
