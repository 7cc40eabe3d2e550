#[cfg(test)]
mod tests {
    use chess_core::engine::config::{BusyPolicy, EngineConfig};
    use chess_core::engine::SearchLimit;
    use chess_core::error::EngineError;
    use chess_core::logic::board::{ChessBoard, START_FEN};
    use chess_core::logic::position::Color;
    use chess_core::worker::{Output, SearchRequest, SearchWorker};
    use std::thread;
    use std::time::{Duration, Instant};

    const FOOLS_MATE: &str = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3";

    fn request(fen: &str, side_to_move: Color, limit: SearchLimit) -> SearchRequest {
        SearchRequest {
            fen: fen.to_string(),
            side_to_move,
            limit,
            config: None,
        }
    }

    fn wait_idle(worker: &SearchWorker) {
        let start = Instant::now();
        while worker.in_flight() > 0 {
            assert!(start.elapsed() < Duration::from_secs(30), "worker never went idle");
            thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_progress_precedes_result() {
        let worker = SearchWorker::spawn::<ChessBoard>(EngineConfig::default());
        let handle = worker.submit(request(START_FEN, Color::White, SearchLimit::Depth(2)));
        let outputs: Vec<Output> = handle.events().iter().collect();

        let (last, progress) = outputs.split_last().unwrap();
        assert!(matches!(last, Output::Done(Ok(r)) if r.best_move.is_some()));
        assert_eq!(progress.len(), 40);
        assert!(progress.iter().all(|o| matches!(o, Output::Progress(_))));
        worker.shutdown();
    }

    #[test]
    fn test_state_mismatch_is_rejected() {
        let worker = SearchWorker::spawn::<ChessBoard>(EngineConfig::default());
        let result = worker
            .submit(request(START_FEN, Color::Black, SearchLimit::Depth(2)))
            .wait();
        assert_eq!(
            result,
            Err(EngineError::StateMismatch {
                expected: Color::Black,
                actual: Color::White,
            })
        );
        worker.shutdown();
    }

    #[test]
    fn test_no_legal_moves_is_an_error() {
        let worker = SearchWorker::spawn::<ChessBoard>(EngineConfig::default());
        let result = worker
            .submit(request(FOOLS_MATE, Color::White, SearchLimit::Depth(2)))
            .wait();
        assert_eq!(result, Err(EngineError::NoLegalMoves));
        worker.shutdown();
    }

    #[test]
    fn test_queue_policy_serves_in_order() {
        let worker = SearchWorker::spawn::<ChessBoard>(EngineConfig::default());
        let handles: Vec<_> = (1..=3)
            .map(|depth| worker.submit(request(START_FEN, Color::White, SearchLimit::Depth(depth))))
            .collect();

        for (depth, handle) in (1..=3).zip(handles) {
            let result = handle.wait().unwrap();
            assert_eq!(result.depth, depth);
        }
        assert_eq!(worker.in_flight(), 0);
        worker.shutdown();
    }

    #[test]
    fn test_reject_policy_returns_busy() {
        let config = EngineConfig {
            busy_policy: BusyPolicy::Reject,
            ..EngineConfig::default()
        };
        let worker = SearchWorker::spawn::<ChessBoard>(config);

        let long = worker.submit(request(START_FEN, Color::White, SearchLimit::Time(60_000)));
        let second = worker.submit(request(START_FEN, Color::White, SearchLimit::Depth(1)));
        assert_eq!(second.wait(), Err(EngineError::Busy));

        // Dropping the handle cancels the long search.
        drop(long);
        wait_idle(&worker);

        let third = worker.submit(request(START_FEN, Color::White, SearchLimit::Depth(1)));
        assert!(third.wait().is_ok());
        worker.shutdown();
    }

    #[test]
    fn test_dropped_handle_cancels_search() {
        let worker = SearchWorker::spawn::<ChessBoard>(EngineConfig::default());
        let start = Instant::now();

        drop(worker.submit(request(START_FEN, Color::White, SearchLimit::Time(60_000))));
        let next = worker.submit(request(START_FEN, Color::White, SearchLimit::Depth(1)));

        assert!(next.wait().is_ok());
        assert!(start.elapsed() < Duration::from_secs(30));
        worker.shutdown();
    }

    #[test]
    fn test_progress_callback_sees_every_report() {
        let worker = SearchWorker::spawn::<ChessBoard>(EngineConfig::default());
        let mut reports = Vec::new();
        let result = worker
            .submit(request(START_FEN, Color::White, SearchLimit::Depth(1)))
            .wait_with_progress(|p| reports.push(p))
            .unwrap();

        assert_eq!(reports.len(), 20);
        assert_eq!(reports.last().map(|p| p.nodes_visited), Some(result.nodes_visited));
        worker.shutdown();
    }
}
