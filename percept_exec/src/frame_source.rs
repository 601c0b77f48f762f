//! # Frame sources
//!
//! Camera images reach perception either live, from the acquisition process over the network, or
//! from a directory of recorded images for replay.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{convert::TryFrom, path::PathBuf};

use chrono::Utc;
use log::{info, warn};
use serde::Deserialize;

use comms_if::{
    eqpt::cam::{CamFrame, CamImage},
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, RecvError, SocketOptions}
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// File extensions treated as images when replaying a directory.
const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A source of camera images.
pub trait FrameSource {
    /// Get the next frame, blocking until one is available.
    fn next_frame(&mut self) -> Result<CamImage, FrameSourceError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Live frames from the acquisition process.
pub struct StreamSource {
    socket: MonitoredSocket
}

/// Recorded frames replayed from a directory, in file name order.
pub struct ImageDirSource {
    paths: Vec<PathBuf>,
    next: usize,
    looped: bool
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Where frames are read from.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum FrameSourceParams {
    /// Subscribe to the camera endpoint in `net.toml`.
    Stream,

    /// Replay the images in `dir`, starting over at the end if `looped` is set.
    ImageDir {
        dir: PathBuf,

        #[serde(default)]
        looped: bool
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FrameSourceError {
    #[error("Could not open the camera socket: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not receive a frame: {0}")]
    RecvError(RecvError),

    #[error("Could not read the image directory {0:?}: {1}")]
    DirReadError(PathBuf, std::io::Error),

    #[error("No images found in {0:?}")]
    NoFrames(PathBuf),

    #[error("Could not load image {0:?}: {1}")]
    ImageLoadError(PathBuf, image::ImageError),

    #[error("End of the image sequence")]
    EndOfSequence
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for FrameSourceParams {
    fn default() -> Self {
        FrameSourceParams::Stream
    }
}

impl FrameSourceParams {
    /// Open the source described by these parameters.
    pub fn open(
        &self,
        ctx: &zmq::Context,
        net_params: &NetParams
    ) -> Result<Box<dyn FrameSource>, FrameSourceError> {
        match self {
            FrameSourceParams::Stream => {
                info!("Subscribing to camera frames on {}", net_params.camera_endpoint);
                Ok(Box::new(StreamSource::new(ctx, &net_params.camera_endpoint)?))
            },
            FrameSourceParams::ImageDir { dir, looped } => {
                let source = ImageDirSource::new(dir.clone(), *looped)?;
                info!("Replaying {} images from {:?}", source.len(), dir);
                Ok(Box::new(source))
            }
        }
    }
}

impl StreamSource {
    /// Connect to the acquisition process. Does not wait for it to come up.
    pub fn new(ctx: &zmq::Context, endpoint: &str) -> Result<Self, FrameSourceError> {
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            conflate: true,
            linger: 1,
            ..Default::default()
        };

        let socket = MonitoredSocket::new(ctx, zmq::SUB, socket_options, endpoint)
            .map_err(FrameSourceError::SocketError)?;

        Ok(Self { socket })
    }
}

impl FrameSource for StreamSource {
    /// Wait for the next frame that decodes. Frames which can't be decoded are dropped.
    fn next_frame(&mut self) -> Result<CamImage, FrameSourceError> {
        loop {
            let frame: CamFrame = match self.socket.recv_json(0) {
                Ok(Some(f)) => f,
                Ok(None) => continue,
                Err(RecvError::SocketError(e)) =>
                    return Err(FrameSourceError::RecvError(RecvError::SocketError(e))),
                Err(e) => {
                    warn!("Dropping malformed camera message: {}", e);
                    continue;
                }
            };

            match CamImage::try_from(&frame) {
                Ok(i) => return Ok(i),
                Err(e) => warn!("Dropping undecodable camera frame: {}", e)
            }
        }
    }
}

impl ImageDirSource {
    /// List the images in `dir`.
    pub fn new(dir: PathBuf, looped: bool) -> Result<Self, FrameSourceError> {
        let entries = std::fs::read_dir(&dir)
            .map_err(|e| FrameSourceError::DirReadError(dir.clone(), e))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| FrameSourceError::DirReadError(dir.clone(), e))?
                .path();

            let is_image = path.extension()
                .and_then(|e| e.to_str())
                .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
                .unwrap_or(false);

            if path.is_file() && is_image {
                paths.push(path);
            }
        }

        if paths.is_empty() {
            return Err(FrameSourceError::NoFrames(dir))
        }

        paths.sort();

        Ok(Self {
            paths,
            next: 0,
            looped
        })
    }

    /// Number of images in the sequence.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl FrameSource for ImageDirSource {
    fn next_frame(&mut self) -> Result<CamImage, FrameSourceError> {
        if self.next >= self.paths.len() {
            if !self.looped {
                return Err(FrameSourceError::EndOfSequence)
            }
            self.next = 0;
        }

        let path = &self.paths[self.next];
        self.next += 1;

        let image = image::open(path)
            .map_err(|e| FrameSourceError::ImageLoadError(path.clone(), e))?;

        Ok(CamImage {
            timestamp: Utc::now(),
            image
        })
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use image::{GrayImage, Luma};

    /// Create an empty directory under the system temp dir.
    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("percept_frame_source_{}_{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_frames(dir: &PathBuf, shades: &[(&str, u8)]) {
        for (name, shade) in shades {
            GrayImage::from_pixel(4, 4, Luma([*shade]))
                .save(dir.join(name))
                .unwrap();
        }
    }

    fn shade(img: &CamImage) -> u8 {
        img.image.to_luma8().get_pixel(0, 0)[0]
    }

    #[test]
    fn test_replay_in_order() {
        let dir = temp_dir("order");
        write_frames(&dir, &[("b.png", 20), ("a.png", 10), ("c.png", 30)]);
        std::fs::write(dir.join("notes.txt"), "not an image").unwrap();

        let mut source = ImageDirSource::new(dir.clone(), false).unwrap();
        assert_eq!(source.len(), 3);

        assert_eq!(shade(&source.next_frame().unwrap()), 10);
        assert_eq!(shade(&source.next_frame().unwrap()), 20);
        assert_eq!(shade(&source.next_frame().unwrap()), 30);
        assert!(matches!(source.next_frame(), Err(FrameSourceError::EndOfSequence)));

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_replay_looped() {
        let dir = temp_dir("looped");
        write_frames(&dir, &[("0.png", 1), ("1.png", 2)]);

        let mut source = ImageDirSource::new(dir.clone(), true).unwrap();
        let shades: Vec<u8> = (0..5)
            .map(|_| shade(&source.next_frame().unwrap()))
            .collect();

        assert_eq!(shades, vec![1, 2, 1, 2, 1]);

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_empty_dir() {
        let dir = temp_dir("empty");

        assert!(matches!(
            ImageDirSource::new(dir.clone(), false),
            Err(FrameSourceError::NoFrames(_))
        ));

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_params() {
        #[derive(Deserialize)]
        struct Wrapper {
            frame_source: FrameSourceParams
        }

        let w: Wrapper = toml::from_str(r#"
            [frame_source]
            type = "ImageDir"
            dir = "recordings/lap_1"
        "#).unwrap();

        assert_eq!(w.frame_source, FrameSourceParams::ImageDir {
            dir: PathBuf::from("recordings/lap_1"),
            looped: false
        });

        let w: Wrapper = toml::from_str("frame_source = { type = \"Stream\" }").unwrap();
        assert_eq!(w.frame_source, FrameSourceParams::Stream);
    }
}
