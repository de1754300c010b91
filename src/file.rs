//! Reading and writing of image files
//!
//! Format is chosen by the file extension (png, ppm, ...)
//!
use std::path::Path;

/// Read an image as RGBA8 data with its width and height
pub fn read_file<P: AsRef<Path>>(filename: P) -> Result<(Vec<u8>,u16,u16),image::ImageError> {
    let img = image::open(filename)?.to_rgba();
    let (w, h) = img.dimensions();
    if w > u32::from(u16::MAX) || h > u32::from(u16::MAX) {
        return Err(image::ImageError::DimensionError);
    }
    let buf = img.into_raw();
    Ok((buf, w as u16, h as u16))
}

/// Write RGBA8 data to an image file
pub fn write_file<P: AsRef<Path>>(buf: &[u8], width: usize, height: usize, filename: P) -> Result<(), std::io::Error> {
    image::save_buffer(filename, buf, width as u32, height as u32, image::RGBA(8))
}

/// Compare two image files pixel by pixel
///
/// Differing components are logged at debug level
pub fn img_diff<P: AsRef<Path>>(f1: P, f2: P) -> Result<bool,image::ImageError> {
    let (d1,w1,h1) = read_file(f1)?;
    let (d2,w2,h2) = read_file(f2)?;
    if w1 != w2 || h1 != h2 {
        return Ok(false);
    }
    let w1 = usize::from(w1);
    let mut flag = true;
    for (i,(v1,v2)) in d1.iter().zip(d2.iter()).enumerate() {
        if v1 != v2 {
            log::debug!("{} [{},{},{}]: {} {}", i, (i/4)%w1, (i/4)/w1, i%4, v1, v2);
            flag = false;
        }
    }
    Ok(flag)
}
