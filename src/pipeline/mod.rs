//! Pipeline stages for photo restoration.
//!
//! Each submodule implements exactly one transformation step. Keeping
//! stages separate makes each independently testable and lets us swap an
//! implementation (e.g. a different generative endpoint) without touching
//! the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ encode ──▶ model ──▶ watermark ──▶ export
//! (path/URL) (base64)  (one API   (text        (JPEG/PNG
//!                       call)      overlay)     re-encode)
//! ```
//!
//! 1. [`input`]     — read the user's path or URL into bytes, sniff the format
//! 2. [`encode`]    — base64-wrap the bytes for the inline-data request body
//! 3. [`model`]     — the single outbound API call; the only stage with
//!    network I/O, and at most one call is ever in flight
//! 4. [`watermark`] — draw the fixed overlay; CPU-bound, runs in
//!    `spawn_blocking`
//! 5. [`export`]    — re-encode for download at the configured quality

pub mod encode;
pub mod export;
pub mod input;
pub mod model;
pub mod watermark;
