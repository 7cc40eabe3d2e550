use crate::engine::config::{BusyPolicy, EngineConfig};
use crate::engine::search::AlphaBetaEngine;
use crate::engine::{SearchLimit, SearchProgress, SearchResult, Searcher};
use crate::error::EngineError;
use crate::logic::position::{Color, Position};
use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub fen: String,
    pub side_to_move: Color,
    pub limit: SearchLimit,
    /// Replaces the engine settings before this search. The busy policy is
    /// fixed when the worker is spawned.
    #[serde(default)]
    pub config: Option<EngineConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Output {
    Progress(SearchProgress),
    Done(Result<SearchResult, EngineError>),
}

struct Job {
    request: SearchRequest,
    reply: Sender<Output>,
}

/// Result stream of one submission. Dropping it cancels the search at the
/// next top-level move.
#[derive(Debug)]
pub struct SearchHandle {
    events: Receiver<Output>,
}

impl SearchHandle {
    fn finished(result: Result<SearchResult, EngineError>) -> Self {
        let (tx, rx) = unbounded();
        let _ = tx.send(Output::Done(result));
        Self { events: rx }
    }

    pub const fn events(&self) -> &Receiver<Output> {
        &self.events
    }

    /// Blocks until the search finishes, discarding progress.
    pub fn wait(self) -> Result<SearchResult, EngineError> {
        self.wait_with_progress(|_| {})
    }

    pub fn wait_with_progress(
        self,
        mut on_progress: impl FnMut(SearchProgress),
    ) -> Result<SearchResult, EngineError> {
        for output in &self.events {
            match output {
                Output::Progress(progress) => on_progress(progress),
                Output::Done(result) => return result,
            }
        }
        Err(EngineError::WorkerDisconnected)
    }
}

/// Validates a request against its position and searches it on the calling
/// thread.
pub fn run_request<P: Position, S: Searcher>(
    engine: &mut S,
    request: &SearchRequest,
    on_progress: &mut dyn FnMut(SearchProgress) -> ControlFlow<()>,
) -> Result<SearchResult, EngineError> {
    let mut position = P::from_serialized(&request.fen)?;

    let actual = position.side_to_move();
    if actual != request.side_to_move {
        log::warn!(
            "rejecting request: {} submitted but position has {actual} to move",
            request.side_to_move
        );
        return Err(EngineError::StateMismatch {
            expected: request.side_to_move,
            actual,
        });
    }

    let result = engine.search(&mut position, request.limit, on_progress)?;
    if result.best_move.is_none() {
        return Err(EngineError::NoLegalMoves);
    }
    Ok(result)
}

/// Owns one engine on a dedicated thread. Submissions are served one at a
/// time, so the transposition table is never shared between searches in
/// flight.
pub struct SearchWorker {
    jobs: Option<Sender<Job>>,
    thread: Option<JoinHandle<()>>,
    in_flight: Arc<AtomicUsize>,
    policy: BusyPolicy,
}

impl SearchWorker {
    pub fn spawn<P: Position + 'static>(config: EngineConfig) -> Self {
        let policy = config.busy_policy;
        let (jobs, job_receiver) = unbounded::<Job>();
        let in_flight = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&in_flight);

        let thread = thread::spawn(move || {
            let mut engine = AlphaBetaEngine::new(Arc::new(config));

            // Runs until every sender is gone
            for Job { request, reply } in &job_receiver {
                if let Some(config) = &request.config {
                    engine.update_config(Arc::new(config.clone()));
                }
                let result = run_request::<P, _>(&mut engine, &request, &mut |progress| {
                    if reply.send(Output::Progress(progress)).is_ok() {
                        ControlFlow::Continue(())
                    } else {
                        ControlFlow::Break(())
                    }
                });
                if let Err(err) = &result {
                    log::debug!("request for {} ended with: {err}", request.fen);
                }

                counter.fetch_sub(1, Ordering::SeqCst);
                let _ = reply.send(Output::Done(result));
            }
            log::debug!("search worker shutting down");
        });

        Self {
            jobs: Some(jobs),
            thread: Some(thread),
            in_flight,
            policy,
        }
    }

    pub fn submit(&self, request: SearchRequest) -> SearchHandle {
        match self.policy {
            BusyPolicy::Reject => {
                if self
                    .in_flight
                    .compare_exchange(0, 1, Ordering::SeqCst, Ordering::SeqCst)
                    .is_err()
                {
                    log::warn!("rejecting request for {}: search in flight", request.fen);
                    return SearchHandle::finished(Err(EngineError::Busy));
                }
            }
            BusyPolicy::Queue => {
                self.in_flight.fetch_add(1, Ordering::SeqCst);
            }
        }

        let (reply, events) = unbounded();
        let sent = self
            .jobs
            .as_ref()
            .is_some_and(|jobs| jobs.send(Job { request, reply }).is_ok());
        if !sent {
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            return SearchHandle::finished(Err(EngineError::WorkerDisconnected));
        }

        SearchHandle { events }
    }

    /// Submissions accepted but not yet answered.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Lets queued submissions finish, then joins the worker thread.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.jobs.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("search worker panicked");
            }
        }
    }
}

impl Drop for SearchWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::board::{ChessBoard, START_FEN};

    fn request(fen: &str, side_to_move: Color, depth: u8) -> SearchRequest {
        SearchRequest {
            fen: fen.to_string(),
            side_to_move,
            limit: SearchLimit::Depth(depth),
            config: None,
        }
    }

    #[test]
    fn test_run_request_rejects_wrong_side() {
        let mut engine = AlphaBetaEngine::new(Arc::new(EngineConfig::default()));
        let result = run_request::<ChessBoard, _>(
            &mut engine,
            &request(START_FEN, Color::Black, 2),
            &mut |_| ControlFlow::Continue(()),
        );
        assert_eq!(
            result,
            Err(EngineError::StateMismatch {
                expected: Color::Black,
                actual: Color::White
            })
        );
    }

    #[test]
    fn test_run_request_invalid_fen() {
        let mut engine = AlphaBetaEngine::new(Arc::new(EngineConfig::default()));
        let result = run_request::<ChessBoard, _>(
            &mut engine,
            &request("not a position", Color::White, 2),
            &mut |_| ControlFlow::Continue(()),
        );
        assert!(matches!(result, Err(EngineError::InvalidPosition(_))));
    }

    #[test]
    fn test_run_request_returns_move() {
        let mut engine = AlphaBetaEngine::new(Arc::new(EngineConfig::default()));
        let result = run_request::<ChessBoard, _>(
            &mut engine,
            &request(START_FEN, Color::White, 2),
            &mut |_| ControlFlow::Continue(()),
        )
        .unwrap();
        assert!(result.best_move.is_some());
        assert_eq!(result.depth, 2);
    }

    #[test]
    fn test_handle_reports_done_once() {
        let worker = SearchWorker::spawn::<ChessBoard>(EngineConfig::default());
        let handle = worker.submit(request(START_FEN, Color::White, 1));
        let outputs: Vec<Output> = handle.events().iter().collect();

        let done = outputs
            .iter()
            .filter(|o| matches!(o, Output::Done(_)))
            .count();
        assert_eq!(done, 1);
        assert!(matches!(outputs.last(), Some(Output::Done(Ok(_)))));
        assert_eq!(worker.in_flight(), 0);
        worker.shutdown();
    }

    #[test]
    fn test_request_config_is_applied() {
        let config = EngineConfig {
            quiescence: false,
            ..EngineConfig::exact()
        };
        let mut direct = AlphaBetaEngine::new(Arc::new(config.clone()));
        let mut board = ChessBoard::new();
        let expected = direct.best_move(&mut board, SearchLimit::Depth(3)).unwrap();

        let worker = SearchWorker::spawn::<ChessBoard>(EngineConfig::default());
        let result = worker
            .submit(SearchRequest {
                config: Some(config),
                ..request(START_FEN, Color::White, 3)
            })
            .wait()
            .unwrap();
        assert_eq!(result.score, expected.score);
        assert_eq!(result.nodes_visited, expected.nodes_visited);
        worker.shutdown();
    }
}
