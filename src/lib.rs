#![doc = "docuglot: batch document and text translation pipeline."]

//! This crate contains the translation core: staging of uploaded content,
//! the provider client abstraction (DeepL implementation included), the
//! per-item translator and the batch orchestrator that aggregates per-item
//! outcomes without letting one failure abort the rest.
//!
//! # Usage
//! Build a [`config::CoreConfig`], wire a [`contract::TranslationProvider`]
//! (real [`deepl::DeepLProvider`] or a mock), and drive batches through
//! [`batch::BatchTranslator`].

pub mod batch;
pub mod config;
pub mod contract;
pub mod deepl;
pub mod load_config;
pub mod output;
pub mod staging;
pub mod translate;
