// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image loading for the background and product slots.
//!
//! Decoding runs on background threads. Each request is tagged with a
//! sequence number and its completion comes back as a [`DecodeCompleted`]
//! message; the editor applies only the newest request per slot, so a slow
//! decode that was superseded is dropped instead of overwriting newer work.

use super::serialization::decode_data_url;
use crate::error::{EditorError, Result};
use crate::models::template::EmbeddedImage;
use image::RgbaImage;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

/// The two image slots of a composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageSlot {
    Background,
    Product,
}

/// Where an image comes from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    File(PathBuf),
    Bytes(Arc<Vec<u8>>),
    Embedded(EmbeddedImage),
}

/// A decoded bitmap together with the encoded bytes it came from, kept so
/// the image can be embedded in templates without re-encoding.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub bitmap: Arc<RgbaImage>,
    pub encoded: Arc<Vec<u8>>,
}

/// Completion of one decode request.
#[derive(Debug)]
pub struct DecodeCompleted {
    pub slot: ImageSlot,
    pub seq: u64,
    pub result: Result<DecodedImage>,
}

/// Decode an encoded image (PNG, JPEG, WebP, ...) to RGBA.
pub fn decode_bytes(bytes: &[u8]) -> Result<RgbaImage> {
    let img = image::load_from_memory(bytes)?;
    Ok(img.to_rgba8())
}

/// Read and decode an image from any source. Blocking.
pub fn load_source(source: &ImageSource) -> Result<DecodedImage> {
    let encoded = match source {
        ImageSource::File(path) => Arc::new(std::fs::read(path)?),
        ImageSource::Bytes(bytes) => Arc::clone(bytes),
        ImageSource::Embedded(data) => Arc::new(decode_data_url(data)?),
    };
    let bitmap = decode_bytes(&encoded)?;
    Ok(DecodedImage {
        bitmap: Arc::new(bitmap),
        encoded,
    })
}

/// Spawns decode jobs and collects their completions.
pub struct ImageLoader {
    sender: Sender<DecodeCompleted>,
    receiver: Receiver<DecodeCompleted>,
    next_seq: u64,
}

impl Default for ImageLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageLoader {
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self {
            sender,
            receiver,
            next_seq: 0,
        }
    }

    /// Allocate the next sequence number without starting a job.
    pub fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// Start decoding `source` into `slot`. Returns the request's sequence number.
    pub fn request(&mut self, slot: ImageSlot, source: ImageSource) -> u64 {
        let seq = self.next_seq();
        let sender = self.sender.clone();

        // Spawn background thread for loading
        std::thread::spawn(move || {
            let result = load_source(&source);
            match &result {
                Ok(img) => log::info!(
                    "Decoded {:?} image #{seq} ({}x{})",
                    slot,
                    img.bitmap.width(),
                    img.bitmap.height()
                ),
                Err(e) => log::error!("Failed to decode {:?} image #{seq}: {}", slot, e),
            }
            // Receiver gone means the editor shut down
            let _ = sender.send(DecodeCompleted { slot, seq, result });
        });

        seq
    }

    /// A finished decode, if any, without blocking.
    pub fn try_next(&self) -> Option<DecodeCompleted> {
        self.receiver.try_recv().ok()
    }

    /// Wait up to `timeout` for the next finished decode.
    pub fn wait_next(&self, timeout: Duration) -> Result<DecodeCompleted> {
        self.receiver.recv_timeout(timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => EditorError::decode("timed out waiting for image decode"),
            RecvTimeoutError::Disconnected => EditorError::decode("image loader disconnected"),
        })
    }
}
