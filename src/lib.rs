//! templator - typed Tera template registries
//!
//! templator loads [Tera](https://keats.github.io/tera/) templates by logical
//! name, checks them against the Rust type they will be rendered with, and
//! caches the compiled result so concurrent callers share one copy.
//!
//! # Architecture Overview
//!
//! A [`Registry<T>`](registry::Registry) sits in front of a
//! [`FileSystem`](fs::FileSystem). The first request for a name reads
//! `base_path/name.ext`, optionally validates its field references against
//! the [`Shape`](shape::Shape) of `T`, compiles it and caches the resulting
//! [`Handler<T>`](handler::Handler). Rendering takes a
//! [`CancelContext`](cancel::CancelContext) that is checked before every
//! write, so a canceled or expired request stops producing output.
//!
//! # Core Modules
//!
//! ## Templates
//! - [`registry`] - Compiled-template cache with per-name resolution locks
//! - [`handler`] - Compiled templates and cancellation-aware rendering
//! - [`functions`] - Custom filters and functions for templates
//!
//! ## Validation
//! - [`shape`] - Structural descriptions of Rust types
//! - [`validation`] - Field reference extraction and checking
//!
//! ## Supporting Modules
//! - [`cancel`] - Cancellation contexts with deadlines
//! - [`config`] - Registry configuration (`templator.toml`)
//! - [`constants`] - Defaults and reserved names
//! - [`core`] - Error types and user-facing error reports
//! - [`fs`] - Filesystem abstraction with on-disk and in-memory backends
//! - [`cli`] - The `templator` command-line interface
//!
//! # Example
//!
//! ```rust
//! use serde::Serialize;
//! use templator::cancel::CancelContext;
//! use templator::fs::MemoryFs;
//! use templator::impl_shaped;
//! use templator::registry::Registry;
//!
//! #[derive(Serialize)]
//! struct Page {
//!     #[serde(rename = "Title")]
//!     title: String,
//!     #[serde(rename = "Content")]
//!     content: String,
//! }
//! impl_shaped!(Page { title as "Title": String, content as "Content": String });
//!
//! let fs = MemoryFs::new()
//!     .with_file("templates/home.html", "<h1>{{ Title }}</h1><p>{{ Content }}</p>")
//!     .with_file("templates/broken.html", "{{ Subtitle }}");
//!
//! let registry = Registry::<Page>::builder(fs).field_validation().build()?;
//!
//! let page = Page { title: "Welcome".into(), content: "Hello, World!".into() };
//! let html = registry.get("home")?.render_to_string(Some(&CancelContext::background()), &page)?;
//! assert_eq!(html, "<h1>Welcome</h1><p>Hello, World!</p>");
//!
//! // `Subtitle` is not a field of `Page`
//! assert!(registry.get("broken").is_err());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cancel;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod fs;
pub mod functions;
pub mod handler;
pub mod registry;
pub mod shape;
pub mod validation;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use cancel::{CancelContext, Canceler, ContextError};
pub use config::RegistryConfig;
pub use core::{Error, ExecutionError};
pub use handler::Handler;
pub use registry::{Registry, RegistryBuilder};
pub use shape::{Shape, Shaped};
