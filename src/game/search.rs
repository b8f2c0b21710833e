// src/game/search.rs

pub mod score_cache;

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use shakmaty::{Chess, Color, Move, Position, Role};
use tracing::{debug, trace};

use crate::config::ConfigError;
use crate::constants::{
    DEFAULT_CENTER_FILE_WEIGHTS, DEFAULT_CENTER_RANK_WEIGHTS, DEFAULT_CONTROL_VALUES,
    DEFAULT_DEPTH_PLY_DIVISOR, DEFAULT_KING_RING_CONTROL_WEIGHT, DEFAULT_LOW_CLOCK_MS,
    DEFAULT_MATERIAL_VALUES, DEFAULT_PAWN_RANK_MOD, DEFAULT_SCORE_CACHE_CAPACITY,
    DEFAULT_SEARCH_WIDTH, DEFAULT_TIME_FRACTION, DEFAULT_TURNS_AHEAD,
    DEFAULT_WIDTH_MATERIAL_DIVISOR, DISQUALIFIED_PROMOTION_SCORE, MATE_SCORE,
};
use crate::game::{canonical_key, evaluation, is_draw, ply_count};
use score_cache::ScoreCache;

/// Every tunable of the engine: search shape, clock policy and the evaluation
/// weight tables. The tuned variants differ only in these numbers.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    pub turns_ahead: u32,
    pub depth_ply_divisor: u32,
    pub search_width: usize,
    pub width_material_divisor: i32,
    pub time_fraction: u32,
    pub low_clock_ms: u64,
    pub score_cache_capacity: usize,
    pub material_values: [i32; 6],
    pub control_values: [i32; 6],
    pub center_file_weights: [i32; 8],
    pub center_rank_weights: [i32; 8],
    pub pawn_rank_mod: i32,
    pub king_ring_control_weight: i32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            turns_ahead: DEFAULT_TURNS_AHEAD,
            depth_ply_divisor: DEFAULT_DEPTH_PLY_DIVISOR,
            search_width: DEFAULT_SEARCH_WIDTH,
            width_material_divisor: DEFAULT_WIDTH_MATERIAL_DIVISOR,
            time_fraction: DEFAULT_TIME_FRACTION,
            low_clock_ms: DEFAULT_LOW_CLOCK_MS,
            score_cache_capacity: DEFAULT_SCORE_CACHE_CAPACITY,
            material_values: DEFAULT_MATERIAL_VALUES,
            control_values: DEFAULT_CONTROL_VALUES,
            center_file_weights: DEFAULT_CENTER_FILE_WEIGHTS,
            center_rank_weights: DEFAULT_CENTER_RANK_WEIGHTS,
            pawn_rank_mod: DEFAULT_PAWN_RANK_MOD,
            king_ring_control_weight: DEFAULT_KING_RING_CONTROL_WEIGHT,
        }
    }
}

impl SearchConfig {
    pub fn default_with_randomization(rng: &mut impl rand::Rng) -> Self {
        let mut config = Self::default();
        let default_config = Self::default(); // for reference values

        config.turns_ahead = rng.gen_range(2..=4);
        config.search_width = rng.gen_range(2..=4);

        // Helper function for numeric randomization
        let mut vary_numeric = |value: i32| -> i32 {
            let factor = rng.gen_range(-0.5..=0.5);
            (value as f64 * (1.0 + factor)).round() as i32
        };

        // Randomize the weight tables with +/- 50% variance
        for i in 0..config.material_values.len() {
            config.material_values[i] = vary_numeric(default_config.material_values[i]);
            config.control_values[i] = vary_numeric(default_config.control_values[i]);
        }
        for i in 0..config.center_file_weights.len() {
            config.center_file_weights[i] = vary_numeric(default_config.center_file_weights[i]);
            config.center_rank_weights[i] = vary_numeric(default_config.center_rank_weights[i]);
        }
        config.pawn_rank_mod = vary_numeric(default_config.pawn_rank_mod);
        config.king_ring_control_weight =
            vary_numeric(default_config.king_ring_control_weight);

        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.depth_ply_divisor == 0 {
            return Err(ConfigError::Invalid(
                "depth_ply_divisor must be nonzero".to_string(),
            ));
        }
        if self.width_material_divisor == 0 {
            return Err(ConfigError::Invalid(
                "width_material_divisor must be nonzero".to_string(),
            ));
        }
        if self.time_fraction == 0 {
            return Err(ConfigError::Invalid(
                "time_fraction must be nonzero".to_string(),
            ));
        }
        if self.score_cache_capacity == 0 {
            return Err(ConfigError::Invalid(
                "score_cache_capacity must be nonzero".to_string(),
            ));
        }
        Ok(())
    }

    /// Derives the budget for one move from the remaining clock: a fixed
    /// fraction, collapsing to zero once the clock runs low so the search
    /// falls back to shallow scoring only.
    pub fn turn_budget(&self, remaining: Duration) -> Duration {
        if remaining < Duration::from_millis(self.low_clock_ms) {
            return Duration::ZERO;
        }
        remaining / self.time_fraction
    }
}

/// A root move and its best-known value from the absolute (White-positive)
/// perspective. `checked` marks values backed up by a deeper search rather
/// than the one-ply estimate.
#[derive(Clone, Debug)]
pub struct Candidate {
    pub mv: Option<Move>,
    pub value: i32,
    pub checked: bool,
}

impl Candidate {
    /// The no-move sentinel: strictly worse than any real candidate, and
    /// pre-marked checked so expansion never selects it.
    fn sentinel(white_to_move: bool) -> Self {
        Self {
            mv: None,
            value: if white_to_move { i32::MIN } else { i32::MAX },
            checked: true,
        }
    }
}

/// Best-first beam search over shallow-scored candidates.
///
/// At every node all legal moves receive a one-ply estimate, then only the
/// currently best-valued candidates are deepened, at most the beam width of
/// them and only while the wall-clock budget lasts; the rest keep their
/// estimate.
pub struct BeamSearcher {
    config: SearchConfig,
    cache: ScoreCache,
    deadline: Option<Instant>,
}

impl BeamSearcher {
    pub fn new(config: SearchConfig) -> Self {
        let cache = ScoreCache::new(config.score_cache_capacity);
        Self {
            config,
            cache,
            deadline: None,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Decides a move for the side to move under the given wall-clock budget.
    ///
    /// Anytime-safe: a zero budget still returns the best shallow-scored
    /// move. `None` only when the position has no legal moves at all.
    pub fn choose_move(&mut self, pos: &Chess, time_budget: Duration) -> (Option<Move>, i32) {
        let started = Instant::now();
        self.deadline = Some(started + time_budget);
        let turns_ahead = self.effective_depth(pos);
        let width = self.effective_width(pos);
        let (chosen, score) = self.move_sort(pos, turns_ahead, width);
        debug!(
            chosen = ?chosen,
            score,
            turns_ahead,
            width,
            elapsed_ms = started.elapsed().as_millis() as u64,
            cached_positions = self.cache.len(),
            "move decision"
        );
        (chosen, score)
    }

    /// Search deepens slowly as the game goes on.
    fn effective_depth(&self, pos: &Chess) -> u32 {
        self.config.turns_ahead + ply_count(pos) / self.config.depth_ply_divisor
    }

    /// The beam follows the signed material balance: a material lead earns a
    /// wider beam, a deficit narrows it.
    fn effective_width(&self, pos: &Chess) -> usize {
        let lead =
            evaluation::material_score(pos.board(), &self.config) / self.config.width_material_divisor;
        (self.config.search_width as i32 + lead).max(0) as usize
    }

    fn out_of_time(&self) -> bool {
        match self.deadline {
            Some(deadline) => Instant::now() >= deadline,
            None => false,
        }
    }

    fn move_sort(&mut self, pos: &Chess, turns_ahead: u32, width: usize) -> (Option<Move>, i32) {
        let white_to_move = pos.turn() == Color::White;
        let legal = pos.legal_moves();
        if legal.is_empty() {
            // Terminal position: the evaluator's shortcut yields the right
            // mate or draw score for the recursion to back up.
            return (None, evaluation::evaluate(pos, &self.config));
        }

        let mut candidates = Vec::with_capacity(legal.len() + 1);
        candidates.push(Candidate::sentinel(white_to_move));
        for &m in &legal {
            let value = self.shallow_score(pos, m, white_to_move);
            candidates.push(Candidate {
                mv: Some(m),
                value,
                checked: false,
            });
        }

        if turns_ahead > 0 {
            for _ in 0..width {
                // Polled between expansions only; a started recursion always
                // runs to completion.
                if self.out_of_time() {
                    break;
                }
                let Some(index) = best_index(&candidates, white_to_move, true) else {
                    break;
                };
                let Some(m) = candidates[index].mv else {
                    break;
                };
                trace!(mv = ?m, value = candidates[index].value, "expanding candidate");
                let mut next = pos.clone();
                next.play_unchecked(m);
                let (_, value) = self.move_sort(&next, turns_ahead - 1, width);
                candidates[index].value = value;
                candidates[index].checked = true;
            }
        }

        match best_index(&candidates, white_to_move, false) {
            Some(index) => (candidates[index].mv, candidates[index].value),
            None => (None, Candidate::sentinel(white_to_move).value),
        }
    }

    /// One-ply estimate for a single legal move: terminal shortcut, promotion
    /// guard, or the evaluator through the cache.
    fn shallow_score(&mut self, pos: &Chess, m: Move, white_to_move: bool) -> i32 {
        let mut next = pos.clone();
        next.play_unchecked(m);

        if next.is_checkmate() {
            // The side left to move is the mated side.
            return if next.turn() == Color::White {
                -MATE_SCORE
            } else {
                MATE_SCORE
            };
        }
        if is_draw(&next) {
            return 0;
        }
        if is_underpromotion(&m) {
            // Last resort only: below every real line, above the sentinel.
            return if white_to_move {
                -DISQUALIFIED_PROMOTION_SCORE
            } else {
                DISQUALIFIED_PROMOTION_SCORE
            };
        }

        let config = &self.config;
        self.cache
            .get_or_compute(canonical_key(&next), || evaluation::evaluate(&next, config))
    }
}

/// Index of the extreme-valued candidate for the side to move. Strict
/// comparisons make the earliest enumeration index win every tie.
fn best_index(candidates: &[Candidate], white_to_move: bool, unchecked_only: bool) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        if unchecked_only && candidate.checked {
            continue;
        }
        let better = match best {
            None => true,
            Some(current) => {
                if white_to_move {
                    candidate.value > candidates[current].value
                } else {
                    candidate.value < candidates[current].value
                }
            }
        };
        if better {
            best = Some(index);
        }
    }
    best
}

fn is_underpromotion(m: &Move) -> bool {
    matches!(m.promotion(), Some(role) if role != Role::Queen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::{fen::Fen, CastlingMode, Square};

    fn position(fen: &str) -> Chess {
        let fen: Fen = fen.parse().unwrap();
        fen.into_position(CastlingMode::Standard).unwrap()
    }

    fn generous_budget() -> Duration {
        Duration::from_secs(30)
    }

    #[test]
    fn finds_mate_in_one() {
        let mut searcher = BeamSearcher::new(SearchConfig::default());
        let pos = position("6k1/5ppp/8/8/8/8/8/R3K3 w - - 0 1");
        let (chosen, score) = searcher.choose_move(&pos, generous_budget());
        let m = chosen.expect("a legal move exists");
        assert_eq!(m.to(), Square::A8);
        let mut next = pos.clone();
        next.play_unchecked(m);
        assert!(next.is_checkmate());
        assert_eq!(score, MATE_SCORE);
    }

    #[test]
    fn zero_budget_still_returns_a_legal_move() {
        let mut searcher = BeamSearcher::new(SearchConfig::default());
        let pos = position("6k1/5ppp/8/8/8/8/8/R3K3 w - - 0 1");
        let (chosen, _) = searcher.choose_move(&pos, Duration::ZERO);
        let m = chosen.expect("shallow scoring must still pick a move");
        assert!(pos.legal_moves().contains(&m));
        // The mate is visible at one ply, so even the shallow pass finds it.
        let mut next = pos.clone();
        next.play_unchecked(m);
        assert!(next.is_checkmate());
    }

    #[test]
    fn search_is_deterministic() {
        let pos = position("r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/3P1N2/PPP2PPP/RNBQK2R b KQkq - 0 4");
        let mut first = BeamSearcher::new(SearchConfig::default());
        let mut second = BeamSearcher::new(SearchConfig::default());
        assert_eq!(
            first.choose_move(&pos, generous_budget()),
            second.choose_move(&pos, generous_budget())
        );
    }

    #[test]
    fn repeated_decisions_agree_once_the_cache_is_warm() {
        let mut searcher = BeamSearcher::new(SearchConfig::default());
        let pos = position("r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/3P1N2/PPP2PPP/RNBQK2R b KQkq - 0 4");
        let cold = searcher.choose_move(&pos, generous_budget());
        assert!(!searcher.cache.is_empty());
        let warm = searcher.choose_move(&pos, generous_budget());
        assert_eq!(cold, warm);
    }

    #[test]
    fn promotion_prefers_the_queen() {
        let mut searcher = BeamSearcher::new(SearchConfig::default());
        let pos = position("8/P6k/8/8/8/8/8/K7 w - - 0 1");
        let (chosen, _) = searcher.choose_move(&pos, generous_budget());
        let m = chosen.expect("a legal move exists");
        assert_eq!(m.promotion(), Some(Role::Queen));
    }

    #[test]
    fn terminal_position_returns_no_move_with_the_mate_score() {
        let mut searcher = BeamSearcher::new(SearchConfig::default());
        let pos = position("R5k1/5ppp/8/8/8/8/8/4K3 b - - 1 1");
        let (chosen, score) = searcher.choose_move(&pos, generous_budget());
        assert_eq!(chosen, None);
        assert_eq!(score, MATE_SCORE);
    }

    #[test]
    fn disqualified_candidates_still_beat_the_sentinel() {
        let underpromotion = Move::Normal {
            role: Role::Pawn,
            from: Square::A7,
            to: Square::A8,
            capture: None,
            promotion: Some(Role::Knight),
        };
        let candidates = vec![
            Candidate::sentinel(true),
            Candidate {
                mv: Some(underpromotion),
                value: -DISQUALIFIED_PROMOTION_SCORE,
                checked: false,
            },
        ];
        let index = best_index(&candidates, true, false).expect("candidates exist");
        assert_eq!(index, 1);
        assert!(candidates[index].mv.is_some());
    }

    #[test]
    fn ties_resolve_to_the_earliest_candidate() {
        let mv = |to| Move::Normal {
            role: Role::Rook,
            from: Square::A1,
            to,
            capture: None,
            promotion: None,
        };
        let candidates = vec![
            Candidate::sentinel(true),
            Candidate {
                mv: Some(mv(Square::A3)),
                value: 10,
                checked: false,
            },
            Candidate {
                mv: Some(mv(Square::A4)),
                value: 10,
                checked: false,
            },
        ];
        assert_eq!(best_index(&candidates, true, false), Some(1));
        // Minimizing flips the comparison but not the tie-break.
        assert_eq!(best_index(&candidates, false, true), Some(1));
    }

    #[test]
    fn beam_width_follows_the_material_balance() {
        let searcher = BeamSearcher::new(SearchConfig::default());
        assert_eq!(searcher.effective_width(&Chess::default()), 3);
        // White is a queen up: 270 / 250 widens the beam by one.
        let white_up = position("4k3/8/8/8/8/8/8/4K2Q w - - 0 1");
        assert_eq!(searcher.effective_width(&white_up), 4);
        // Black is two queens up: the beam narrows instead.
        let black_up = position("3qk2q/8/8/8/8/8/8/4K3 w - - 0 1");
        assert_eq!(searcher.effective_width(&black_up), 1);
    }

    #[test]
    fn depth_grows_with_the_move_counter() {
        let searcher = BeamSearcher::new(SearchConfig::default());
        assert_eq!(searcher.effective_depth(&Chess::default()), 3);
        let late_game = position("4k3/8/8/8/8/8/8/R3K3 w - - 0 40");
        assert_eq!(searcher.effective_depth(&late_game), 5);
    }

    #[test]
    fn turn_budget_is_a_clock_fraction_with_a_panic_floor() {
        let config = SearchConfig::default();
        assert_eq!(
            config.turn_budget(Duration::from_secs(100)),
            Duration::from_secs(2)
        );
        assert_eq!(
            config.turn_budget(Duration::from_millis(1999)),
            Duration::ZERO
        );
    }

    #[test]
    fn randomized_config_keeps_the_search_shape_in_range() {
        let mut rng = rand::thread_rng();
        let config = SearchConfig::default_with_randomization(&mut rng);
        assert!((2..=4).contains(&config.turns_ahead));
        assert!((2..=4).contains(&config.search_width));
        assert!(config.validate().is_ok());
    }
}
