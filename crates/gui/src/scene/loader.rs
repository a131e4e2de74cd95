//! Background decoding of uploaded pictures
//!
//! Decodes run on a small tokio runtime and report back over an unbounded
//! channel. Nothing is ever cancelled; the scene manager decides whether a
//! result is still wanted when it arrives.

use std::path::PathBuf;

use image::RgbaImage;
use shared::{ImageSource, OverlayId};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::texture::fit_to_envelope;

/// Why a picture could not be turned into a bitmap
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("source is generated, not decoded")]
    NotDecodable,
}

/// Finished decode for one overlay / source pair
#[derive(Debug)]
pub struct LoadResult {
    pub overlay_id: OverlayId,
    /// `ImageSource::content_key` of the source that was decoded
    pub source_key: u64,
    pub result: Result<RgbaImage, LoadError>,
}

pub struct ImageLoader {
    runtime: Option<tokio::runtime::Runtime>,
    tx: mpsc::UnboundedSender<LoadResult>,
    rx: mpsc::UnboundedReceiver<LoadResult>,
    in_flight: usize,
}

impl ImageLoader {
    pub fn new() -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(2)
            .thread_name("image-loader")
            .build()?;
        let (tx, rx) = mpsc::unbounded_channel();
        Ok(Self {
            runtime: Some(runtime),
            tx,
            rx,
            in_flight: 0,
        })
    }

    /// Start decoding `source` for `overlay_id`. Fire-and-forget.
    pub fn request(&mut self, overlay_id: OverlayId, source: ImageSource) {
        let Some(runtime) = &self.runtime else {
            return;
        };
        let tx = self.tx.clone();
        let source_key = source.content_key();
        tracing::debug!("Loading image for overlay {overlay_id}");
        runtime.spawn_blocking(move || {
            let result = decode(&source);
            // Receiver is gone only when the loader was dropped
            let _ = tx.send(LoadResult {
                overlay_id,
                source_key,
                result,
            });
        });
        self.in_flight += 1;
    }

    /// Next finished decode, if any. Never blocks.
    pub fn try_recv(&mut self) -> Option<LoadResult> {
        match self.rx.try_recv() {
            Ok(result) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                Some(result)
            }
            Err(_) => None,
        }
    }

    /// Requests that have not reported back yet
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

impl Drop for ImageLoader {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

/// Decode a picture source into a bitmap that fits the texture envelope
pub fn decode(source: &ImageSource) -> Result<RgbaImage, LoadError> {
    let image = match source {
        ImageSource::Embedded { bytes } => image::load_from_memory(bytes.as_slice())?,
        ImageSource::File { path } => {
            let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
                path: path.clone(),
                source,
            })?;
            image::load_from_memory(&bytes)?
        }
        ImageSource::Shape { .. } => return Err(LoadError::NotDecodable),
    };
    Ok(fit_to_envelope(image.to_rgba8()))
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use shared::{Rgb, ShapeKind};

    use super::*;
    use crate::fixtures;

    fn wait(loader: &mut ImageLoader) -> LoadResult {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(r) = loader.try_recv() {
                return r;
            }
            assert!(Instant::now() < deadline, "load timed out");
            std::thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn test_decode_embedded_png() {
        let src = ImageSource::Embedded { bytes: fixtures::png_bytes(4, 2, [255, 0, 0, 255]).into() };
        let img = decode(&src).unwrap();
        assert_eq!(img.dimensions(), (4, 2));
        assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_decode_errors() {
        let garbage = ImageSource::Embedded { bytes: vec![1, 2, 3].into() };
        assert!(matches!(decode(&garbage), Err(LoadError::Decode(_))));
        let missing = ImageSource::File { path: "/no/such/picture.png".into() };
        assert!(matches!(decode(&missing), Err(LoadError::Io { .. })));
        let shape = ImageSource::Shape { shape: ShapeKind::Star, color: Rgb::BLACK };
        assert!(matches!(decode(&shape), Err(LoadError::NotDecodable)));
    }

    #[test]
    fn test_background_load_reports_key() {
        let mut loader = ImageLoader::new().unwrap();
        let src = ImageSource::Embedded { bytes: fixtures::png_bytes(2, 2, [0, 0, 255, 255]).into() };
        let key = src.content_key();
        loader.request("overlay-1".into(), src);
        assert_eq!(loader.in_flight(), 1);
        let r = wait(&mut loader);
        assert_eq!(r.overlay_id, "overlay-1");
        assert_eq!(r.source_key, key);
        assert!(r.result.is_ok());
        assert_eq!(loader.in_flight(), 0);
    }
}
