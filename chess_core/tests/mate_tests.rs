#[cfg(test)]
mod tests {
    use chess_core::engine::config::EngineConfig;
    use chess_core::engine::search::AlphaBetaEngine;
    use chess_core::engine::{SearchLimit, Searcher};
    use chess_core::logic::board::ChessBoard;
    use chess_core::logic::position::Position;
    use std::ops::ControlFlow;
    use std::sync::Arc;

    // Back-rank mates: the rook lands on the eighth (or first) rank.
    const WHITE_MATES: &str = "6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1";
    const BLACK_MATES: &str = "r5k1/8/8/8/8/8/5PPP/6K1 b - - 0 1";

    fn search(fen: &str, limit: SearchLimit) -> (String, i32) {
        let config = EngineConfig::default();
        let mut engine = AlphaBetaEngine::new(Arc::new(config));
        let mut board = ChessBoard::from_fen(fen).unwrap();
        let result = engine
            .search(&mut board, limit, &mut |_| ControlFlow::Continue(()))
            .unwrap();
        let best = result.best_move.expect("a legal position yields a move");
        (best.to_string(), result.score)
    }

    #[test]
    fn test_white_mate_in_one() {
        let (best, score) = search(WHITE_MATES, SearchLimit::Depth(2));
        assert_eq!(best, "a1a8");
        assert_eq!(score, 100_001);
    }

    #[test]
    fn test_black_mate_in_one() {
        let (best, score) = search(BLACK_MATES, SearchLimit::Depth(2));
        assert_eq!(best, "a8a1");
        assert_eq!(score, -100_001);
    }

    #[test]
    fn test_mate_found_deeper_scores_higher() {
        // More depth left when the mate is seen, so the score grows with depth.
        let (best, score) = search(WHITE_MATES, SearchLimit::Depth(3));
        assert_eq!(best, "a1a8");
        assert_eq!(score, 100_002);
    }

    #[test]
    fn test_mate_found_under_time_limit() {
        let (best, score) = search(WHITE_MATES, SearchLimit::Time(500));
        assert_eq!(best, "a1a8");
        assert!(score > 100_000);
    }

    #[test]
    fn test_mated_side_reports_mate() {
        let config = EngineConfig::default();
        let mut engine = AlphaBetaEngine::new(Arc::new(config));
        let mut board = ChessBoard::from_fen(WHITE_MATES).unwrap();
        let mv = board
            .legal_moves()
            .into_iter()
            .find(|m| m.to_string() == "a1a8")
            .unwrap();
        board.apply(&mv).unwrap();

        assert!(board.is_checkmate());
        let result = engine
            .search(&mut board, SearchLimit::Depth(2), &mut |_| ControlFlow::Continue(()))
            .unwrap();
        assert!(result.best_move.is_none());
    }
}
