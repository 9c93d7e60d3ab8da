//! CV processing: PDF text extraction, LLM segmentation and job fit scoring.
//! Every CV passes through a request-scoped anonymizer before the LLM sees it.

pub mod extract;
pub mod fit;
pub mod handlers;
pub mod prompts;
