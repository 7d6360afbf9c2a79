//! Asset pipeline for the Vista viewer: Wavefront OBJ parsing, interleaved
//! vertex buffers, texture decoding and a background loader that resolves
//! whole batches at once.

mod error;
mod interleave;
mod loader;
mod obj;
mod texture;

pub use error::AssetError;
pub use interleave::{InterleavedMesh, Vertex};
pub use loader::{AssetLoader, AssetSource, FsSource, LoadBatch, MemorySource};
pub use obj::{ObjData, load_obj_positions, parse_obj};
pub use texture::{DecodedTexture, decode_texture};
