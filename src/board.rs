use std::fmt;

use crate::errors::EngineError;
use crate::movegen::Move;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Piece {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl Piece {
    pub fn index(self) -> usize {
        match self {
            Piece::Pawn => 0,
            Piece::Knight => 1,
            Piece::Bishop => 2,
            Piece::Rook => 3,
            Piece::Queen => 4,
            Piece::King => 5,
        }
    }

    pub fn from_index(index: usize) -> Option<Piece> {
        match index {
            0 => Some(Piece::Pawn),
            1 => Some(Piece::Knight),
            2 => Some(Piece::Bishop),
            3 => Some(Piece::Rook),
            4 => Some(Piece::Queen),
            5 => Some(Piece::King),
            _ => None,
        }
    }

    /// FEN letter, uppercase for White and lowercase for Black.
    pub fn to_char(self, color: Color) -> char {
        let c = match self {
            Piece::Pawn => 'p',
            Piece::Knight => 'n',
            Piece::Bishop => 'b',
            Piece::Rook => 'r',
            Piece::Queen => 'q',
            Piece::King => 'k',
        };
        match color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    pub fn from_char(c: char) -> Option<(Piece, Color)> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let piece = match c.to_ascii_lowercase() {
            'p' => Piece::Pawn,
            'n' => Piece::Knight,
            'b' => Piece::Bishop,
            'r' => Piece::Rook,
            'q' => Piece::Queen,
            'k' => Piece::King,
            _ => return None,
        };
        Some((piece, color))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

// Castling rights bits, KQkq order.
pub const WHITE_KINGSIDE: u8 = 0b0001;
pub const WHITE_QUEENSIDE: u8 = 0b0010;
pub const BLACK_KINGSIDE: u8 = 0b0100;
pub const BLACK_QUEENSIDE: u8 = 0b1000;

/// Parse a square name like "e4" into a 0..64 index (a1 = 0, h8 = 63).
pub fn square_from_name(name: &str) -> Option<u8> {
    let mut chars = name.chars();
    let file = chars.next()?;
    let rank = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    if !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
        return None;
    }
    Some((rank as u8 - b'1') * 8 + (file as u8 - b'a'))
}

/// Square name for a 0..64 index.
pub fn square_name(square: u8) -> String {
    let file = (b'a' + square % 8) as char;
    let rank = (b'1' + square / 8) as char;
    format!("{}{}", file, rank)
}

/// Complete game state: piece placement plus the metadata needed to resume a
/// game. Positions are values; the applier produces a new one rather than
/// mutating in place, so callers never see a position change mid-computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub white_pieces: [u64; 6], // Pawn, Knight, Bishop, Rook, Queen, King
    pub black_pieces: [u64; 6],
    pub side_to_move: Color,
    pub castling_rights: u8, // KQkq bits
    pub en_passant_square: Option<u8>,
    pub halfmove_clock: u16,
    pub fullmove_number: u16,
}

impl Position {
    /// Standard initial position.
    pub fn new() -> Self {
        Self {
            white_pieces: [
                0x000000000000FF00, // Pawns
                0x0000000000000042, // Knights
                0x0000000000000024, // Bishops
                0x0000000000000081, // Rooks
                0x0000000000000008, // Queen
                0x0000000000000010, // King
            ],
            black_pieces: [
                0x00FF000000000000,
                0x4200000000000000,
                0x2400000000000000,
                0x8100000000000000,
                0x0800000000000000,
                0x1000000000000000,
            ],
            side_to_move: Color::White,
            castling_rights: WHITE_KINGSIDE | WHITE_QUEENSIDE | BLACK_KINGSIDE | BLACK_QUEENSIDE,
            en_passant_square: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, EngineError> {
        let malformed = |msg: &str| EngineError::MalformedPosition(format!("{}: '{}'", msg, fen));

        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(malformed("expected 6 space-separated fields"));
        }

        let mut white_pieces = [0u64; 6];
        let mut black_pieces = [0u64; 6];

        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(malformed("expected 8 ranks"));
        }
        for (i, rank_text) in ranks.iter().enumerate() {
            let rank = 7 - i as u8; // FEN lists rank 8 first
            let mut file = 0u8;
            for c in rank_text.chars() {
                if let Some(run) = c.to_digit(10) {
                    if run == 0 || run > 8 {
                        return Err(malformed("invalid empty-square run"));
                    }
                    file += run as u8;
                } else if let Some((piece, color)) = Piece::from_char(c) {
                    if file >= 8 {
                        return Err(malformed("rank overflows 8 files"));
                    }
                    let mask = 1u64 << (rank * 8 + file);
                    match color {
                        Color::White => white_pieces[piece.index()] |= mask,
                        Color::Black => black_pieces[piece.index()] |= mask,
                    }
                    file += 1;
                } else {
                    return Err(malformed("invalid piece letter"));
                }
            }
            if file != 8 {
                return Err(malformed("rank does not describe 8 files"));
            }
        }

        let side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            _ => return Err(malformed("invalid side-to-move token")),
        };

        let mut castling_rights = 0u8;
        if fields[2] != "-" {
            for c in fields[2].chars() {
                let bit = match c {
                    'K' => WHITE_KINGSIDE,
                    'Q' => WHITE_QUEENSIDE,
                    'k' => BLACK_KINGSIDE,
                    'q' => BLACK_QUEENSIDE,
                    _ => return Err(malformed("invalid castling token")),
                };
                if castling_rights & bit != 0 {
                    return Err(malformed("duplicate castling token"));
                }
                castling_rights |= bit;
            }
        }

        let en_passant_square = if fields[3] == "-" {
            None
        } else {
            Some(square_from_name(fields[3]).ok_or_else(|| malformed("invalid en-passant square"))?)
        };

        let halfmove_clock = fields[4]
            .parse::<u16>()
            .map_err(|_| malformed("invalid halfmove clock"))?;
        let fullmove_number = fields[5]
            .parse::<u16>()
            .map_err(|_| malformed("invalid fullmove number"))?;

        Ok(Self {
            white_pieces,
            black_pieces,
            side_to_move,
            castling_rights,
            en_passant_square,
            halfmove_clock,
            fullmove_number,
        })
    }

    pub fn to_fen(&self) -> String {
        let mut fen = String::new();
        for rank in (0..8).rev() {
            let mut empty = 0u8;
            for file in 0..8 {
                let square = rank * 8 + file;
                match self.piece_at(square) {
                    Some((piece, color)) => {
                        if empty > 0 {
                            fen.push(char::from(b'0' + empty));
                            empty = 0;
                        }
                        fen.push(piece.to_char(color));
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push(char::from(b'0' + empty));
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        });

        fen.push(' ');
        if self.castling_rights == 0 {
            fen.push('-');
        } else {
            for (bit, c) in [
                (WHITE_KINGSIDE, 'K'),
                (WHITE_QUEENSIDE, 'Q'),
                (BLACK_KINGSIDE, 'k'),
                (BLACK_QUEENSIDE, 'q'),
            ] {
                if self.castling_rights & bit != 0 {
                    fen.push(c);
                }
            }
        }

        fen.push(' ');
        match self.en_passant_square {
            Some(square) => fen.push_str(&square_name(square)),
            None => fen.push('-'),
        }

        fen.push_str(&format!(" {} {}", self.halfmove_clock, self.fullmove_number));
        fen
    }

    pub fn pieces(&self, color: Color) -> &[u64; 6] {
        match color {
            Color::White => &self.white_pieces,
            Color::Black => &self.black_pieces,
        }
    }

    fn pieces_mut(&mut self, color: Color) -> &mut [u64; 6] {
        match color {
            Color::White => &mut self.white_pieces,
            Color::Black => &mut self.black_pieces,
        }
    }

    pub fn occupied_by(&self, color: Color) -> u64 {
        self.pieces(color).iter().fold(0, |acc, &bb| acc | bb)
    }

    pub fn occupied(&self) -> u64 {
        self.occupied_by(Color::White) | self.occupied_by(Color::Black)
    }

    pub fn piece_at(&self, square: u8) -> Option<(Piece, Color)> {
        let mask = 1u64 << square;
        for color in [Color::White, Color::Black] {
            for (i, &bb) in self.pieces(color).iter().enumerate() {
                if bb & mask != 0 {
                    return Piece::from_index(i).map(|piece| (piece, color));
                }
            }
        }
        None
    }

    pub fn king_square(&self, color: Color) -> Option<u8> {
        let kings = self.pieces(color)[Piece::King.index()];
        if kings == 0 {
            None
        } else {
            Some(kings.trailing_zeros() as u8)
        }
    }

    /// Apply a move and return the resulting position, without any legality
    /// check. The move generator uses this for its king-safety filter; the
    /// applier calls it only after establishing legality.
    pub fn make(&self, mv: &Move) -> Position {
        let mut next = self.clone();
        let us = self.side_to_move;
        let from_mask = 1u64 << mv.from;
        let to_mask = 1u64 << mv.to;

        // Lift the moving piece.
        next.pieces_mut(us)[mv.piece.index()] &= !from_mask;

        // Remove the captured piece. The en-passant victim sits on a
        // different square than the destination.
        if let Some(captured) = mv.captured {
            let victim_square = if mv.is_en_passant {
                match us {
                    Color::White => mv.to - 8,
                    Color::Black => mv.to + 8,
                }
            } else {
                mv.to
            };
            next.pieces_mut(us.opposite())[captured.index()] &= !(1u64 << victim_square);
        }

        // Drop the piece, substituting the promotion choice if any.
        let landing = mv.promotion.unwrap_or(mv.piece);
        next.pieces_mut(us)[landing.index()] |= to_mask;

        // The rook follows the king when castling.
        if mv.is_castling {
            let (rook_from, rook_to) = match (us, mv.to > mv.from) {
                (Color::White, true) => (7u8, 5u8), // h1 -> f1
                (Color::White, false) => (0, 3),    // a1 -> d1
                (Color::Black, true) => (63, 61),   // h8 -> f8
                (Color::Black, false) => (56, 59),  // a8 -> d8
            };
            let rooks = &mut next.pieces_mut(us)[Piece::Rook.index()];
            *rooks &= !(1u64 << rook_from);
            *rooks |= 1u64 << rook_to;
        }

        // Castling rights never come back: a king move drops both of its
        // side's rights, and any move touching a rook home square (the rook
        // leaving it, or an enemy capture landing on it) drops that right.
        if mv.piece == Piece::King {
            next.castling_rights &= match us {
                Color::White => !(WHITE_KINGSIDE | WHITE_QUEENSIDE),
                Color::Black => !(BLACK_KINGSIDE | BLACK_QUEENSIDE),
            };
        }
        for (home, bit) in [
            (0u8, WHITE_QUEENSIDE),
            (7, WHITE_KINGSIDE),
            (56, BLACK_QUEENSIDE),
            (63, BLACK_KINGSIDE),
        ] {
            if mv.from == home || mv.to == home {
                next.castling_rights &= !bit;
            }
        }

        // A double pawn push opens an en-passant window for exactly one ply.
        next.en_passant_square =
            if mv.piece == Piece::Pawn && (mv.to as i8 - mv.from as i8).abs() == 16 {
                Some(match us {
                    Color::White => mv.from + 8,
                    Color::Black => mv.from - 8,
                })
            } else {
                None
            };

        if mv.piece == Piece::Pawn || mv.captured.is_some() {
            next.halfmove_clock = 0;
        } else {
            next.halfmove_clock += 1;
        }
        if us == Color::Black {
            next.fullmove_number += 1;
        }

        next.side_to_move = us.opposite();
        next
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for rank in (0..8).rev() {
            for file in 0..8 {
                let square = rank * 8 + file;
                match self.piece_at(square) {
                    Some((piece, color)) => write!(f, "{}", piece.to_char(color))?,
                    None => write!(f, ".")?,
                }
                if file < 7 {
                    write!(f, " ")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movegen::Move;

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    fn sq(name: &str) -> u8 {
        square_from_name(name).unwrap()
    }

    #[test]
    fn initial_position_serializes_to_start_fen() {
        assert_eq!(Position::new().to_fen(), START_FEN);
    }

    #[test]
    fn fen_round_trip() {
        let fens = [
            START_FEN,
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
            "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 12 34",
            "8/8/8/8/8/4k3/8/4K3 b - - 99 120",
            "rnbq1bnr/ppppkppp/8/4p3/8/5N2/PPPPPPPP/RNBQKB1R w KQ - 2 3",
        ];
        for fen in fens {
            let position = Position::from_fen(fen).unwrap();
            assert_eq!(position.to_fen(), fen);
            assert_eq!(Position::from_fen(&position.to_fen()).unwrap(), position);
        }
    }

    #[test]
    fn malformed_fens_are_rejected() {
        let bad = [
            "",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -", // missing fields
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP w KQkq - 0 1",      // 7 ranks
            "rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", // bad run
            "rnbqkbnr/ppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", // short rank
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNX w KQkq - 0 1", // bad letter
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1", // bad side
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KXkq - 0 1", // bad castling
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq e9 0 1", // bad ep square
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - x 1", // bad clock
        ];
        for fen in bad {
            assert!(
                matches!(Position::from_fen(fen), Err(EngineError::MalformedPosition(_))),
                "accepted malformed fen '{}'",
                fen
            );
        }
    }

    #[test]
    fn piece_at_reads_the_board() {
        let position = Position::new();
        assert_eq!(position.piece_at(sq("e1")), Some((Piece::King, Color::White)));
        assert_eq!(position.piece_at(sq("d8")), Some((Piece::Queen, Color::Black)));
        assert_eq!(position.piece_at(sq("e4")), None);
    }

    #[test]
    fn square_names_round_trip() {
        for square in 0..64u8 {
            assert_eq!(square_from_name(&square_name(square)), Some(square));
        }
        assert_eq!(square_from_name("i1"), None);
        assert_eq!(square_from_name("a9"), None);
        assert_eq!(square_from_name("e"), None);
        assert_eq!(square_from_name("e44"), None);
    }

    #[test]
    fn make_is_copy_on_write() {
        let position = Position::new();
        let mv = Move::quiet(sq("e2"), sq("e4"), Piece::Pawn);
        let next = position.make(&mv);
        assert_eq!(position, Position::new());
        assert_eq!(next.side_to_move, Color::Black);
        assert_eq!(next.piece_at(sq("e4")), Some((Piece::Pawn, Color::White)));
        assert_eq!(next.piece_at(sq("e2")), None);
        assert_eq!(next.en_passant_square, Some(sq("e3")));
    }

    #[test]
    fn king_move_revokes_both_rights() {
        let position = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let next = position.make(&Move::quiet(sq("e1"), sq("e2"), Piece::King));
        assert_eq!(next.castling_rights, BLACK_KINGSIDE | BLACK_QUEENSIDE);
    }

    #[test]
    fn rook_move_revokes_one_right() {
        let position = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let next = position.make(&Move::quiet(sq("a1"), sq("a4"), Piece::Rook));
        assert_eq!(
            next.castling_rights,
            WHITE_KINGSIDE | BLACK_KINGSIDE | BLACK_QUEENSIDE
        );
    }

    #[test]
    fn rook_captured_on_home_square_revokes_the_right() {
        let position = Position::from_fen("r3k2r/8/8/8/8/8/6n1/R3K2R b KQkq - 0 1").unwrap();
        let mut mv = Move::quiet(sq("g2"), sq("h1"), Piece::Knight);
        mv.captured = Some(Piece::Rook);
        let next = position.make(&mv);
        assert_eq!(next.castling_rights & WHITE_KINGSIDE, 0);
        assert_ne!(next.castling_rights & WHITE_QUEENSIDE, 0);
    }

    #[test]
    fn castling_moves_the_rook() {
        let position = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let next = position.make(&Move::castling(sq("e1"), sq("g1")));
        assert_eq!(next.piece_at(sq("g1")), Some((Piece::King, Color::White)));
        assert_eq!(next.piece_at(sq("f1")), Some((Piece::Rook, Color::White)));
        assert_eq!(next.piece_at(sq("h1")), None);
        assert_eq!(next.castling_rights & (WHITE_KINGSIDE | WHITE_QUEENSIDE), 0);
    }

    #[test]
    fn en_passant_capture_removes_the_victim_pawn() {
        let position =
            Position::from_fen("rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 3")
                .unwrap();
        let next = position.make(&Move::en_passant(sq("d4"), sq("e3")));
        assert_eq!(next.piece_at(sq("e3")), Some((Piece::Pawn, Color::Black)));
        assert_eq!(next.piece_at(sq("e4")), None);
        assert_eq!(next.en_passant_square, None);
    }

    #[test]
    fn promotion_replaces_the_pawn() {
        let position = Position::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let next = position.make(&Move::promotion(sq("a7"), sq("a8"), None, Piece::Queen));
        assert_eq!(next.piece_at(sq("a8")), Some((Piece::Queen, Color::White)));
        assert_eq!(next.white_pieces[Piece::Pawn.index()], 0);
    }

    #[test]
    fn clocks_track_pawn_moves_and_captures() {
        let position = Position::from_fen("4k3/8/8/8/8/8/4P3/4K2R w K - 7 20").unwrap();
        let quiet = position.make(&Move::quiet(sq("h1"), sq("h4"), Piece::Rook));
        assert_eq!(quiet.halfmove_clock, 8);
        assert_eq!(quiet.fullmove_number, 20);
        let pawn = position.make(&Move::quiet(sq("e2"), sq("e3"), Piece::Pawn));
        assert_eq!(pawn.halfmove_clock, 0);

        let black = Position::from_fen("4k3/8/8/8/8/8/4P3/4K2R b - - 3 20").unwrap();
        let next = black.make(&Move::quiet(sq("e8"), sq("d8"), Piece::King));
        assert_eq!(next.fullmove_number, 21);
    }
}
