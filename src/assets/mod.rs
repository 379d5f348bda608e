pub mod accessor;
pub mod asset;
pub mod buffer_view;
pub mod document;
pub mod io;
pub mod loader;
pub mod settings;

pub use accessor::{Accessor, AccessorData, AccessorShape, AccessorTable, ComponentKind};
pub use asset::Asset;
pub use buffer_view::{BufferView, BufferViewTable, resolve_slice};
pub use document::Document;
pub use io::{FileFetcher, ImageHandle, ImageSource, ImageStore, MemoryFetcher, ResourceFetcher};
pub use loader::GltfLoader;
pub use settings::{CameraDefaults, LoaderSettings};
