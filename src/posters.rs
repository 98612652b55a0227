use std::{
    io,
    path::{Path, PathBuf},
};

use image::ImageFormat;

use crate::error::{AppError, AppResult};

const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Poster files live outside the database, one `{movie_id}.jpg` per movie.
#[derive(Clone, Debug)]
pub struct PosterStore {
    dir: PathBuf,
}

impl PosterStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, movie_id: i32) -> PathBuf {
        self.dir.join(format!("{movie_id}.jpg"))
    }

    /// Decodes the upload, flattens it to RGB and writes it as JPEG, replacing
    /// any earlier poster for the same movie.
    pub async fn store(&self, movie_id: i32, bytes: Vec<u8>) -> AppResult<PathBuf> {
        let dir = self.dir.clone();
        let path = self.path_for(movie_id);
        let out = path.clone();
        tokio::task::spawn_blocking(move || write_jpeg(&dir, &out, &bytes)).await??;
        Ok(path)
    }

    /// Returns whether a file was removed. A missing poster is not an error.
    pub async fn remove(&self, movie_id: i32) -> io::Result<bool> {
        match tokio::fs::remove_file(self.path_for(movie_id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}

pub fn allowed_file(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_EXTENSIONS.iter().any(|a| ext.eq_ignore_ascii_case(a)),
        None => false,
    }
}

fn write_jpeg(dir: &Path, path: &Path, bytes: &[u8]) -> AppResult<()> {
    let img = image::load_from_memory(bytes).map_err(|e| AppError::ImageDecode(e.to_string()))?;
    std::fs::create_dir_all(dir).map_err(anyhow::Error::from)?;
    img.to_rgb8()
        .save_with_format(path, ImageFormat::Jpeg)
        .map_err(|e| AppError::Internal(anyhow::Error::new(e)))?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn encode_test_image(format: ImageFormat) -> Vec<u8> {
    let img = image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
        4,
        4,
        image::Rgba([200, 40, 40, 128]),
    ));
    let img = match format {
        ImageFormat::Jpeg => image::DynamicImage::ImageRgb8(img.to_rgb8()),
        _ => img,
    };
    let mut buf = io::Cursor::new(Vec::new());
    img.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(allowed_file("poster.PNG"));
        assert!(allowed_file("a.b.jpeg"));
        assert!(allowed_file("x.Jpg"));
        assert!(!allowed_file("poster.gif"));
        assert!(!allowed_file("jpg"));
        assert!(!allowed_file(""));
    }

    #[tokio::test]
    async fn png_is_reencoded_as_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let store = PosterStore::new(dir.path().join("images"));

        let path = store.store(7, encode_test_image(ImageFormat::Png)).await.unwrap();

        assert_eq!(path.file_name().unwrap(), "7.jpg");
        let written = std::fs::read(&path).unwrap();
        assert_eq!(image::guess_format(&written).unwrap(), ImageFormat::Jpeg);
    }

    #[tokio::test]
    async fn corrupt_upload_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = PosterStore::new(dir.path());

        let err = store.store(1, b"not an image".to_vec()).await.unwrap_err();

        assert!(matches!(err, AppError::ImageDecode(_)));
        assert!(!store.path_for(1).exists());
    }

    #[tokio::test]
    async fn removing_a_missing_poster_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let store = PosterStore::new(dir.path());

        assert!(!store.remove(3).await.unwrap());
        store.store(3, encode_test_image(ImageFormat::Jpeg)).await.unwrap();
        assert!(store.remove(3).await.unwrap());
        assert!(!store.path_for(3).exists());
    }
}
