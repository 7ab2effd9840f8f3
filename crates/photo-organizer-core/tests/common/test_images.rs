use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// PNG bytes of a flat-colored image; equal arguments give equal bytes
pub fn png_bytes(width: u32, height: u32, shade: u8) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([shade, 255 - shade, shade / 2]));
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buffer, ImageOutputFormat::Png)
        .unwrap();
    buffer.into_inner()
}

/// Write a PNG into `dir` under `name`
pub fn create_test_image(dir: &Path, name: &str, width: u32, height: u32, shade: u8) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, png_bytes(width, height, shade)).unwrap();
    path
}

/// The five-file staging set: 2 and 4 identical, 3 is 50x50
pub fn create_mixed_staging(dir: &Path) -> Vec<PathBuf> {
    vec![
        create_test_image(dir, "photo_0001.png", 640, 480, 10),
        create_test_image(dir, "photo_0002.png", 800, 600, 20),
        create_test_image(dir, "photo_0003.png", 50, 50, 30),
        create_test_image(dir, "photo_0004.png", 800, 600, 20),
        create_test_image(dir, "photo_0005.png", 1024, 768, 40),
    ]
}

pub fn file_names(paths: impl IntoIterator<Item = PathBuf>) -> Vec<String> {
    paths
        .into_iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}
