//! A chess move chooser built on a width- and time-bounded best-first search
//! over a per-square control evaluation.
//!
//! Board representation, legal-move generation, terminal-state detection and
//! attack bitboards come from `shakmaty`; this crate layers candidate scoring,
//! a bounded position-score cache and the beam search on top. The single entry
//! point is [`BeamSearcher::choose_move`].

pub mod config;
pub mod constants;
pub mod game;

pub use game::search::{BeamSearcher, Candidate, SearchConfig};
