//! Hand-rolled BMP encoding (spec.md §6: "Frame output: bytes of a
//! bitmap (BMP) image"). No crate in this workspace's dependency tree
//! encodes BMP, so this follows the format directly: a 14-byte file
//! header, a 40-byte BITMAPINFOHEADER, then 24-bit BGR rows bottom-up
//! padded to 4-byte boundaries.

use galaga_core::video::Frame;

pub fn encode(frame: &Frame) -> Vec<u8> {
    let width = frame.width;
    let height = frame.height;
    let row_bytes = width * 3;
    let padding = (4 - (row_bytes % 4)) % 4;
    let pixel_data_size = (row_bytes + padding) * height;

    let file_header_size = 14;
    let dib_header_size = 40;
    let pixel_data_offset = file_header_size + dib_header_size;
    let file_size = pixel_data_offset + pixel_data_size;

    let mut out = Vec::with_capacity(file_size);

    // File header.
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&(file_size as u32).to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes()); // reserved
    out.extend_from_slice(&0u16.to_le_bytes()); // reserved
    out.extend_from_slice(&(pixel_data_offset as u32).to_le_bytes());

    // BITMAPINFOHEADER.
    out.extend_from_slice(&(dib_header_size as u32).to_le_bytes());
    out.extend_from_slice(&(width as i32).to_le_bytes());
    out.extend_from_slice(&(height as i32).to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // color planes
    out.extend_from_slice(&24u16.to_le_bytes()); // bits per pixel
    out.extend_from_slice(&0u32.to_le_bytes()); // no compression
    out.extend_from_slice(&(pixel_data_size as u32).to_le_bytes());
    out.extend_from_slice(&2835i32.to_le_bytes()); // 72 DPI
    out.extend_from_slice(&2835i32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // palette colors
    out.extend_from_slice(&0u32.to_le_bytes()); // important colors

    // Pixel data, bottom row first, BGR byte order.
    for y in (0..height).rev() {
        for x in 0..width {
            let color = frame.pixel(x, y);
            out.push(color.b);
            out.push(color.g);
            out.push(color.r);
        }
        out.extend(std::iter::repeat_n(0u8, padding));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_declares_correct_file_size() {
        let frame = Frame::new();
        let bytes = encode(&frame);
        let declared = u32::from_le_bytes(bytes[2..6].try_into().unwrap());
        assert_eq!(declared as usize, bytes.len());
    }

    #[test]
    fn row_size_is_padded_to_four_bytes() {
        let frame = Frame::new();
        let bytes = encode(&frame);
        let pixel_offset = u32::from_le_bytes(bytes[10..14].try_into().unwrap()) as usize;
        let pixel_bytes = bytes.len() - pixel_offset;
        assert_eq!(pixel_bytes % 4, 0);
    }

    #[test]
    fn declares_24_bits_per_pixel() {
        let frame = Frame::new();
        let bytes = encode(&frame);
        let bpp = u16::from_le_bytes(bytes[28..30].try_into().unwrap());
        assert_eq!(bpp, 24);
    }
}
