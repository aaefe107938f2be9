pub mod api;
pub mod board;
pub mod errors;
pub mod game;
pub mod movegen;
pub mod policy;
pub mod protocol;
pub mod session;

#[cfg(test)]
mod tests {
    use super::*;
    use board::{square_from_name, Color, Piece, Position};
    use errors::EngineError;
    use game::GameState;
    use movegen::MoveGenerator;

    fn sq(name: &str) -> u8 {
        square_from_name(name).unwrap()
    }

    fn play(position: Position, moves: &[(&str, &str)]) -> Position {
        moves.iter().fold(position, |position, (from, to)| {
            game::apply(&position, sq(from), sq(to), None).unwrap().0
        })
    }

    #[test]
    fn scenario_open_with_the_king_pawn() {
        let position = play(Position::new(), &[("e2", "e4")]);
        assert_eq!(position.side_to_move, Color::Black);
        assert_eq!(position.piece_at(sq("e4")), Some((Piece::Pawn, Color::White)));
        assert_eq!(position.en_passant_square, Some(sq("e3")));
        assert_eq!(
            position.to_fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
    }

    #[test]
    fn scenario_fools_mate() {
        let position = play(
            Position::new(),
            &[("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")],
        );
        let status = game::status(&position);
        assert_eq!(status.state(), GameState::Checkmate);
        assert_eq!(status.side_to_move, Color::White);
        assert!(MoveGenerator::new().legal_moves(&position, None).is_empty());
        assert_eq!(
            game::apply(&position, sq("e1"), sq("f2"), None),
            Err(EngineError::GameOver)
        );
    }

    #[test]
    fn en_passant_is_legal_for_exactly_one_move() {
        // After the black double push, exd6 is available...
        let position = play(
            Position::new(),
            &[("e2", "e4"), ("a7", "a6"), ("e4", "e5"), ("d7", "d5")],
        );
        assert_eq!(position.en_passant_square, Some(sq("d6")));
        let generator = MoveGenerator::new();
        assert!(generator
            .legal_moves(&position, Some(sq("e5")))
            .iter()
            .any(|mv| mv.is_en_passant && mv.to == sq("d6")));

        // ...the capture removes the pawn from d5, not from d6...
        let captured = play(position.clone(), &[("e5", "d6")]);
        assert_eq!(captured.piece_at(sq("d5")), None);
        assert_eq!(captured.piece_at(sq("d6")), Some((Piece::Pawn, Color::White)));

        // ...and waiting one move forfeits it.
        let waited = play(position, &[("h2", "h3"), ("h7", "h6")]);
        assert!(!generator
            .legal_moves(&waited, Some(sq("e5")))
            .iter()
            .any(|mv| mv.is_en_passant));
    }

    #[test]
    fn every_legal_move_keeps_the_own_king_safe() {
        let generator = MoveGenerator::new();
        let fens = [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "4k3/8/8/8/8/8/4q3/4K2R w K - 0 1",
            "4r2k/8/8/8/8/4N3/8/4K3 w - - 0 1",
            "r3k2r/pppq1ppp/2n2n2/3pp3/3PP3/2N2N2/PPPQ1PPP/R3K2R w KQkq - 6 8",
        ];
        for fen in fens {
            let position = Position::from_fen(fen).unwrap();
            for mv in generator.legal_moves(&position, None) {
                assert!(
                    !generator.in_check(&position.make(&mv), position.side_to_move),
                    "{} in '{}' leaves the king in check",
                    mv.notation(),
                    fen
                );
            }
        }
    }

    #[test]
    fn round_trip_holds_along_a_whole_game() {
        let mut position = Position::new();
        let moves = [
            ("e2", "e4"),
            ("c7", "c5"),
            ("g1", "f3"),
            ("d7", "d6"),
            ("d2", "d4"),
            ("c5", "d4"),
            ("f3", "d4"),
            ("g8", "f6"),
            ("b1", "c3"),
            ("a7", "a6"),
        ];
        for (from, to) in moves {
            position = game::apply(&position, sq(from), sq(to), None).unwrap().0;
            assert_eq!(Position::from_fen(&position.to_fen()).unwrap(), position);
        }
    }

    #[test]
    fn perft_from_the_initial_position() {
        let board = Position::new();
        let generator = MoveGenerator::new();
        assert_eq!(perft(&board, &generator, 1), 20);
        assert_eq!(perft(&board, &generator, 2), 400);
        assert_eq!(perft(&board, &generator, 3), 8902);
    }

    #[test]
    fn perft_exercises_castling_and_promotion() {
        // Kiwipete, the standard castling/en-passant/promotion stress test.
        let board = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        let generator = MoveGenerator::new();
        assert_eq!(perft(&board, &generator, 1), 48);
        assert_eq!(perft(&board, &generator, 2), 2039);
    }

    fn perft(position: &Position, generator: &MoveGenerator, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }
        let moves = generator.legal_moves(position, None);
        if depth == 1 {
            return moves.len() as u64;
        }
        moves
            .iter()
            .map(|mv| perft(&position.make(mv), generator, depth - 1))
            .sum()
    }
}
