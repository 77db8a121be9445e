mod handler;
mod model;

pub use handler::search;
pub use model::{
    DEFAULT_THRESHOLD, DEFAULT_TOP_K, MAX_TOP_K, SearchQuery, SearchRequest, SearchResponse,
    synthesize_results,
};
