pub mod plots;
pub mod recommendation;
pub mod scoring;
pub mod session;
