//! Model files (`.mod` character models, `.scm` stage models)
//!
//! A model is a header, an object table at 0x40, per-object mesh tables and
//! a skeleton block. Mesh vertex arrays are stored as separate dense arrays
//! and the index data is an implicit triangle strip.

pub mod reader;
pub mod skeleton;
pub mod strip;
mod types;
pub mod vertex;

pub use reader::{MeshRecord, ModelReader, read_model, read_model_file, read_model_with_options};
pub use skeleton::{Bone, Skeleton};
pub use strip::strip_to_triangles;
pub use types::{
    BoundingSphere, MESH_RECORD_SIZE, Mesh, MeshChannelOffsets, MeshOffsets, Model, ModelHeader,
    ModelKind, OBJECT_RECORD_SIZE, OBJECT_TABLE_OFFSET, Object, VertexChannels, VertexData,
};
