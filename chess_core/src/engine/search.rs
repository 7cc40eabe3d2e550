use crate::engine::config::EngineConfig;
use crate::engine::eval::PstEvaluator;
use crate::engine::ordering::order_moves;
use crate::engine::tt::{TTFlag, TranspositionTable};
use crate::engine::{Evaluator, SearchLimit, SearchProgress, SearchResult, Searcher};
use crate::error::EngineError;
use crate::logic::position::{Color, Move, Position};
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Unbounded initial alpha/beta. Larger than any reachable score.
pub const INFINITY: i32 = 1_000_000;

/// Score of a node with no legal moves, White's point of view. A mate found
/// with more depth remaining is closer to the root and scores further from 0.
pub fn terminal_score(in_check: bool, side_to_move: Color, depth: u8, mate_score: i32) -> i32 {
    if !in_check {
        return 0; // Stalemate
    }
    let mate = mate_score + i32::from(depth);
    match side_to_move {
        Color::White => -mate,
        Color::Black => mate,
    }
}

/// Why a search unwinds before finishing the current depth.
#[derive(Debug)]
enum Abort {
    Deadline,
    Cancelled,
    Fault(EngineError),
}

type Step = Result<i32, Abort>;

pub struct AlphaBetaEngine {
    config: Arc<EngineConfig>,
    evaluator: PstEvaluator,
    tt: TranspositionTable,
    nodes_visited: u64,
    deadline: Option<Instant>,
}

impl AlphaBetaEngine {
    pub fn new(config: Arc<EngineConfig>) -> Self {
        Self {
            evaluator: PstEvaluator::new(),
            tt: TranspositionTable::new(config.tt_capacity),
            config,
            nodes_visited: 0,
            deadline: None,
        }
    }

    pub fn update_config(&mut self, config: Arc<EngineConfig>) {
        if config.tt_capacity != self.config.tt_capacity {
            self.tt = TranspositionTable::new(config.tt_capacity);
        }
        self.config = config;
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub const fn tt(&self) -> &TranspositionTable {
        &self.tt
    }

    pub fn clear_tt(&mut self) {
        self.tt.clear();
    }

    /// Runs a search without progress reporting.
    pub fn best_move<P: Position>(
        &mut self,
        position: &mut P,
        limit: SearchLimit,
    ) -> Result<SearchResult, EngineError> {
        self.search(position, limit, &mut |_| ControlFlow::Continue(()))
    }

    #[allow(clippy::manual_is_multiple_of)]
    fn check_time(&self) -> bool {
        if let Some(deadline) = self.deadline {
            let interval = self.config.time_check_interval.max(1);
            if self.nodes_visited % interval == 0 && Instant::now() >= deadline {
                return true;
            }
        }
        false
    }

    fn apply<P: Position>(position: &mut P, mv: &Move) -> Result<(), Abort> {
        position.apply(mv).map_err(|err| {
            log::error!("internal fault: generated move {mv} rejected by position: {err}");
            Abort::Fault(err)
        })
    }

    fn minimax_root<P: Position>(
        &mut self,
        position: &mut P,
        depth: u8,
        pv_hint: Option<Move>,
        moves_evaluated: &mut u32,
        on_progress: &mut dyn FnMut(SearchProgress) -> ControlFlow<()>,
    ) -> Result<(Move, i32), Abort> {
        let maximizing = position.side_to_move().is_maximizing();
        let mut moves = position.legal_moves();
        order_moves(&mut moves, position, pv_hint.as_ref());

        let mut best: Option<(Move, i32)> = None;

        for mv in moves {
            Self::apply(position, &mv)?;
            let value = self.minimax(position, depth - 1, -INFINITY, INFINITY, !maximizing);
            position.revert();
            let value = value?;

            let improves = best.map_or(true, |(_, best_value)| {
                if maximizing {
                    value > best_value
                } else {
                    value < best_value
                }
            });
            if improves {
                best = Some((mv, value));
            }

            *moves_evaluated += 1;
            let progress = SearchProgress {
                depth,
                moves_evaluated: *moves_evaluated,
                nodes_visited: self.nodes_visited,
            };
            if on_progress(progress).is_break() {
                return Err(Abort::Cancelled);
            }
        }

        best.ok_or(Abort::Fault(EngineError::NoLegalMoves))
    }

    fn minimax<P: Position>(
        &mut self,
        position: &mut P,
        depth: u8,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
    ) -> Step {
        debug_assert_eq!(maximizing, position.side_to_move().is_maximizing());
        self.nodes_visited += 1;

        if self.check_time() {
            return Err(Abort::Deadline);
        }

        // TT Probe
        let key = self
            .config
            .use_transposition_table
            .then(|| position.serialize());
        if let Some(key) = &key {
            if let Some(score) = self.tt.lookup(key, depth, alpha, beta) {
                return Ok(score);
            }
        }

        if depth == 0 {
            return self.leaf(position, alpha, beta, maximizing);
        }

        // Null Move Pruning
        // Black passes; if White still cannot beat alpha, Black is doing fine.
        if self.config.null_move_pruning && !maximizing && depth > 1 && !position.is_in_check() {
            if position.apply_null() {
                let reduced = depth.saturating_sub(1 + self.config.null_move_reduction);
                let score = self.minimax(position, reduced, alpha, alpha.saturating_add(1), true);
                position.revert();
                let score = score?;
                if score <= alpha {
                    return Ok(score);
                }
            }
        }

        let mut moves = position.legal_moves();
        if moves.is_empty() {
            return Ok(terminal_score(
                position.is_in_check(),
                position.side_to_move(),
                depth,
                self.config.mate_score,
            ));
        }
        let hash_move = key.as_deref().and_then(|k| self.tt.get_move(k));
        order_moves(&mut moves, position, hash_move.as_ref());

        let alpha_orig = alpha;
        let beta_orig = beta;
        let mut best_score = if maximizing { -INFINITY } else { INFINITY };
        let mut best_move = None;

        for (moves_searched, mv) in moves.iter().enumerate() {
            Self::apply(position, mv)?;
            let first = moves_searched == 0;
            let score = self.search_child(position, depth - 1, alpha, beta, maximizing, first);
            position.revert();
            let score = score?;

            if maximizing {
                if score > best_score {
                    best_score = score;
                    best_move = Some(*mv);
                }
                alpha = alpha.max(best_score);
            } else {
                if score < best_score {
                    best_score = score;
                    best_move = Some(*mv);
                }
                beta = beta.min(best_score);
            }

            if beta <= alpha {
                break;
            }
        }

        if let Some(key) = key {
            let flag = if best_score <= alpha_orig {
                TTFlag::UpperBound
            } else if best_score >= beta_orig {
                TTFlag::LowerBound
            } else {
                TTFlag::Exact
            };
            self.tt.store(key, best_score, depth, flag, best_move);
        }

        Ok(best_score)
    }

    /// PVS: the first move gets the full window, later moves a minimal probe
    /// that is widened only when it lands strictly inside `(alpha, beta)`.
    fn search_child<P: Position>(
        &mut self,
        position: &mut P,
        depth: u8,
        alpha: i32,
        beta: i32,
        maximizing: bool,
        first: bool,
    ) -> Step {
        if first || !self.config.principal_variation_search {
            return self.minimax(position, depth, alpha, beta, !maximizing);
        }

        let (probe_alpha, probe_beta) = if maximizing {
            (alpha, alpha.saturating_add(1))
        } else {
            (beta.saturating_sub(1), beta)
        };
        let probe = self.minimax(position, depth, probe_alpha, probe_beta, !maximizing)?;
        if probe > alpha && probe < beta {
            self.minimax(position, depth, alpha, beta, !maximizing)
        } else {
            Ok(probe)
        }
    }

    fn leaf<P: Position>(
        &mut self,
        position: &mut P,
        alpha: i32,
        beta: i32,
        maximizing: bool,
    ) -> Step {
        if self.config.quiescence {
            self.quiescence(position, alpha, beta, maximizing)
        } else {
            Ok(self.evaluator.evaluate(position))
        }
    }

    /// Capture-only extension. Fail-hard: the result always lies within the
    /// `[alpha, beta]` passed in.
    fn quiescence<P: Position>(
        &mut self,
        position: &mut P,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
    ) -> Step {
        self.nodes_visited += 1;

        let stand_pat = self.evaluator.evaluate(position);
        if maximizing {
            if stand_pat >= beta {
                return Ok(beta);
            }
            if stand_pat > alpha {
                alpha = stand_pat;
            }
        } else {
            if stand_pat <= alpha {
                return Ok(alpha);
            }
            if stand_pat < beta {
                beta = stand_pat;
            }
        }

        let mut captures: Vec<Move> = position
            .legal_moves()
            .into_iter()
            .filter(|mv| mv.is_capture)
            .collect();
        order_moves(&mut captures, position, None);

        for mv in &captures {
            Self::apply(position, mv)?;
            let score = self.quiescence(position, alpha, beta, !maximizing);
            position.revert();
            let score = score?;

            if maximizing {
                if score >= beta {
                    return Ok(beta);
                }
                if score > alpha {
                    alpha = score;
                }
            } else {
                if score <= alpha {
                    return Ok(alpha);
                }
                if score < beta {
                    beta = score;
                }
            }
        }

        Ok(if maximizing { alpha } else { beta })
    }
}

impl Searcher for AlphaBetaEngine {
    fn search<P: Position>(
        &mut self,
        position: &mut P,
        limit: SearchLimit,
        on_progress: &mut dyn FnMut(SearchProgress) -> ControlFlow<()>,
    ) -> Result<SearchResult, EngineError> {
        let start = Instant::now();
        self.nodes_visited = 0;
        self.deadline = None;

        let (max_depth, deadline) = match limit {
            SearchLimit::Depth(d) => (d.max(1), None),
            SearchLimit::Time(ms) => (
                self.config.max_depth.max(1),
                Some(start + Duration::from_millis(ms)),
            ),
        };

        let elapsed_ms = || u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        if position.legal_moves().is_empty() {
            log::info!("no legal moves for {}", position.side_to_move());
            return Ok(SearchResult {
                best_move: None,
                score: terminal_score(
                    position.is_in_check(),
                    position.side_to_move(),
                    0,
                    self.config.mate_score,
                ),
                depth: 0,
                nodes_visited: 0,
                time_ms: elapsed_ms(),
            });
        }

        let mut best: Option<(Move, i32)> = None;
        let mut completed_depth = 0;
        let mut moves_evaluated = 0;

        for depth in 1..=max_depth {
            // The first depth always completes.
            if depth > 1 {
                if deadline.is_some_and(|d| Instant::now() >= d) {
                    break;
                }
                self.deadline = deadline;
            }

            let pv_hint = best.map(|(mv, _)| mv);
            match self.minimax_root(position, depth, pv_hint, &mut moves_evaluated, on_progress) {
                Ok((mv, score)) => {
                    log::debug!(
                        "depth {depth}: best {mv} score {score} nodes {}",
                        self.nodes_visited
                    );
                    best = Some((mv, score));
                    completed_depth = depth;
                }
                Err(Abort::Deadline) => {
                    log::debug!("depth {depth} abandoned at deadline");
                    break;
                }
                Err(Abort::Cancelled) => {
                    self.deadline = None;
                    return Err(EngineError::Cancelled);
                }
                Err(Abort::Fault(err)) => {
                    self.deadline = None;
                    return Err(err);
                }
            }
        }
        self.deadline = None;

        let Some((mv, score)) = best else {
            return Err(EngineError::NoLegalMoves);
        };
        let time_ms = elapsed_ms();
        log::info!(
            "search finished: depth {completed_depth}, best {mv}, score {score}, nodes {}, {} ms",
            self.nodes_visited,
            time_ms
        );

        Ok(SearchResult {
            best_move: Some(mv),
            score,
            depth: completed_depth,
            nodes_visited: self.nodes_visited,
            time_ms,
        })
    }
}
