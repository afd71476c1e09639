//! Schema Graph
//!
//! Classification, extraction and navigation of the persistent domain schema.

pub mod classify;
pub mod descriptor;
pub mod extract;
pub mod graph;
pub mod path;
pub mod registry;

pub use classify::{TypeClassifier, SCALAR_TYPES};
pub use descriptor::{CollectionDescriptor, Container, FieldDescriptor, FieldName, Kind, TypeName};
pub use extract::SchemaExtractor;
pub use graph::{EdgeKind, SchemaEdge, SchemaGraph};
pub use path::{last_segment, PathResolver, PATH_SEPARATOR};
pub use registry::{FieldMap, SchemaRegistry, SchemaRegistryBuilder, SchemaRole};
