//! Overworld streaming: deterministic chunk generation, a sparse mutation layer, and the
//! load/unload bookkeeping that keeps a finite window of chunks around a reference position.

mod chunk;
mod delta;
mod streamer;

pub use chunk::{
    CHUNK_AREA, CHUNK_SIZE, Chunk, ChunkCoord, MAX_CHUNK, MIN_CHUNK, ResourceInstance,
    ResourceKind, generate_chunk,
};
pub use delta::{ChunkSnapshot, Mutation, MutationDelta, MutationEntry};
pub use streamer::{ChunkState, ChunkStreamer, StreamStats, StreamUpdate};
