use crate::engine::eval_constants::{get_piece_value, VAL_PAWN};
use crate::logic::position::{Move, Position};
use std::cmp::Reverse;

/// MVV-LVA: victim value minus a hundredth of the attacker value, scaled by
/// 10 so it stays integral. Non-captures score 0.
pub fn mvv_lva<P: Position + ?Sized>(mv: &Move, position: &P) -> i32 {
    if !mv.is_capture {
        return 0;
    }
    // En passant leaves the target square empty; the victim is a pawn.
    let victim = position
        .piece_at(mv.to)
        .map_or(VAL_PAWN, |p| get_piece_value(p.kind));
    let attacker = position
        .piece_at(mv.from)
        .map_or(0, |p| get_piece_value(p.kind));
    victim * 10 - attacker / 10
}

/// Sorts by MVV-LVA descending (stable, so generation order breaks ties),
/// then moves `pv_hint` to the front if it is in the list.
pub fn order_moves<P: Position + ?Sized>(moves: &mut [Move], position: &P, pv_hint: Option<&Move>) {
    moves.sort_by_key(|mv| Reverse(mvv_lva(mv, position)));

    if let Some(hint) = pv_hint {
        if let Some(idx) = moves.iter().position(|mv| mv == hint) {
            if let Some(head) = moves.get_mut(..=idx) {
                head.rotate_right(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::board::ChessBoard;

    fn find(moves: &[Move], uci: &str) -> Move {
        *moves.iter().find(|m| m.to_string() == uci).unwrap()
    }

    #[test]
    fn test_mvv_lva_scores() {
        // White pawn e4 and queen d1 can both take the black knight on d5.
        let board = ChessBoard::from_fen("4k3/3p4/8/3n4/4P3/8/8/3QK3 w - - 0 1").unwrap();
        let moves = board.legal_moves();
        let pawn_takes_knight = find(&moves, "e4d5");
        let queen_takes_knight = find(&moves, "d1d5");
        let quiet = find(&moves, "e1f2");

        assert_eq!(mvv_lva(&pawn_takes_knight, &board), 3000 - 10);
        assert_eq!(mvv_lva(&queen_takes_knight, &board), 3000 - 90);
        assert_eq!(mvv_lva(&quiet, &board), 0);
    }

    #[test]
    fn test_captures_first_least_valuable_attacker_first() {
        let board = ChessBoard::from_fen("4k3/3p4/8/3n4/4P3/8/8/3QK3 w - - 0 1").unwrap();
        let mut moves = board.legal_moves();
        order_moves(&mut moves, &board, None);
        assert_eq!(moves[0].to_string(), "e4d5");
        assert_eq!(moves[1].to_string(), "d1d5");
        assert!(moves[2..].iter().all(|m| !m.is_capture));
    }

    #[test]
    fn test_stable_order_for_quiet_moves() {
        let board = ChessBoard::new();
        let generated = board.legal_moves();
        let mut ordered = generated.clone();
        order_moves(&mut ordered, &board, None);
        assert_eq!(ordered, generated);
    }

    #[test]
    fn test_pv_hint_moves_to_front() {
        let board = ChessBoard::new();
        let generated = board.legal_moves();
        let hint = generated[7];
        let mut ordered = generated.clone();
        order_moves(&mut ordered, &board, Some(&hint));

        assert_eq!(ordered[0], hint);
        // Everything else keeps its relative order.
        let rest: Vec<_> = generated.iter().filter(|m| **m != hint).copied().collect();
        assert_eq!(&ordered[1..], rest.as_slice());
    }

    #[test]
    fn test_pv_hint_absent_is_ignored() {
        let board = ChessBoard::new();
        let generated = board.legal_moves();
        let bogus = Move {
            from: "a1".parse().unwrap(),
            to: "a8".parse().unwrap(),
            promotion: None,
            is_capture: true,
        };
        let mut ordered = generated.clone();
        order_moves(&mut ordered, &board, Some(&bogus));
        assert_eq!(ordered, generated);
    }
}
