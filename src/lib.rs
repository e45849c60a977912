//! Sinecord: formula-driven music synthesis.
//!
//! Players write formulas in `x`; each instrument samples its formula once
//! per period and the result picks the note. The pipeline is
//! [`expr`] (compile to bytecode) → [`event`] (merge onsets) →
//! [`audio`] (render through an [`instrument::NoteDevice`]), with
//! [`synth::Synthesizer`] owning the live-edited state.

pub mod audio;
pub mod config;
pub mod event;
pub mod expr;
pub mod instrument;
pub mod synth;
