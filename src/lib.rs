//! Property listing intake: the add-property form model, its validation and
//! dimension/price derivations, the submission pipeline, and the lead-capture
//! forms sent through an email relay.

pub mod config;
pub mod error;
pub mod form;
pub mod models;
pub mod relay;
pub mod stores;
pub mod submit;
