use crate::source::SourceError;

/// Kind of metadata fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchKind {
    Buckets,
    TagKeys,
    TagValues,
}

impl FetchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchKind::Buckets => "buckets",
            FetchKind::TagKeys => "tag_keys",
            FetchKind::TagValues => "tag_values",
        }
    }
}

/// A metadata fetch issued by a transition.
///
/// Each request carries the generations that were current when it was
/// issued; the response is applied only if they still match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    Buckets {
        load_generation: u64,
    },
    TagKeys {
        bucket: String,
        bucket_generation: u64,
        tag_index: usize,
        keys_generation: u64,
    },
    TagValues {
        bucket: String,
        tag_key: String,
        bucket_generation: u64,
        tag_index: usize,
        values_generation: u64,
    },
}

impl FetchRequest {
    pub fn kind(&self) -> FetchKind {
        match self {
            FetchRequest::Buckets { .. } => FetchKind::Buckets,
            FetchRequest::TagKeys { .. } => FetchKind::TagKeys,
            FetchRequest::TagValues { .. } => FetchKind::TagValues,
        }
    }

    /// Card that owns the request, if any
    pub fn tag_index(&self) -> Option<usize> {
        match self {
            FetchRequest::Buckets { .. } => None,
            FetchRequest::TagKeys { tag_index, .. } | FetchRequest::TagValues { tag_index, .. } => {
                Some(*tag_index)
            }
        }
    }
}

/// Completion of a [`FetchRequest`]
#[derive(Debug)]
pub struct FetchResponse {
    pub request: FetchRequest,
    pub result: Result<Vec<String>, SourceError>,
}

impl FetchResponse {
    pub fn new(request: FetchRequest, result: Result<Vec<String>, SourceError>) -> Self {
        Self { request, result }
    }
}

/// What happened to a response handed to the builder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// The owning card or selection changed after the request was issued
    Discarded,
}
