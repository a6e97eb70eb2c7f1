/// Input adapters for emosaic: image decoding, palette manifests, resizing.

pub mod image;
pub mod manifest;
pub mod resize;
