// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Screen-space post-processing for molecular viewers.
//!
//! The passes turn a rendered color + depth frame into the final image:
//! a background behind the scene, screen-space shadows, depth of field,
//! and an SMAA edge mask for antialiasing. Each pass is a pure per-pixel
//! function executed in parallel over CPU texture buffers, with its
//! parameters laid out as GPU-ready uniform structs.
//!
//! # Key entry points
//!
//! - [`renderer::postprocess::PostProcessStack`] - sequences the passes
//! - [`options::Options`] - runtime configuration with TOML presets
//! - [`renderer::postprocess::PassVariants`] - setup-time branch selection
//! - [`util::screen_space`] - depth decoding and view-space reconstruction
//!
//! # Architecture
//!
//! Options are resolved once into [`renderer::postprocess::PassVariants`].
//! Each frame the stack draws the background, hands the color buffer to a
//! [`renderer::postprocess::SceneRenderer`], then runs shadows → depth of
//! field → edge detection, each stage writing a freshly allocated target.

pub mod camera;
pub mod error;
pub mod lighting;
pub mod options;
pub mod renderer;
pub mod texture;
pub mod util;

pub use error::PostFxError;
