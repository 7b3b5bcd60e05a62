//! Client boundary to the external document-processing service.
//!
//! The service is a black box behind two operations: upload a document and
//! get back an opaque `doc_id`, then ask questions against that id. This
//! crate defines the [`DocumentService`] trait, its reqwest-based HTTP
//! implementation, the wire types, and the error normalizer that turns
//! heterogeneous failures into one display string.

pub mod error;
pub mod http;
pub mod normalize;
pub mod service;
pub mod wire;

pub use error::ServiceError;
pub use http::HttpDocumentService;
pub use normalize::normalize;
pub use service::{Answer, DocumentService, UploadReceipt};
