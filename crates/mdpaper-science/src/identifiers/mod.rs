pub mod arxiv;
pub mod doi;
pub mod paper_id;

pub use arxiv::ArxivId;
pub use doi::Doi;
pub use paper_id::PaperId;
