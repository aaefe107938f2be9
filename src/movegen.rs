use crate::board::{
    square_name, Color, Piece, Position, BLACK_KINGSIDE, BLACK_QUEENSIDE, WHITE_KINGSIDE,
    WHITE_QUEENSIDE,
};

/// A move relative to the position it was generated from. Pawn moves reaching
/// the last rank are emitted once per promotion choice, so `promotion` is
/// always `Some` for those and `None` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub from: u8,
    pub to: u8,
    pub piece: Piece,
    pub captured: Option<Piece>,
    pub promotion: Option<Piece>,
    pub is_en_passant: bool,
    pub is_castling: bool,
}

impl Move {
    pub fn quiet(from: u8, to: u8, piece: Piece) -> Self {
        Self {
            from,
            to,
            piece,
            captured: None,
            promotion: None,
            is_en_passant: false,
            is_castling: false,
        }
    }

    pub fn capture(from: u8, to: u8, piece: Piece, captured: Piece) -> Self {
        Self {
            captured: Some(captured),
            ..Self::quiet(from, to, piece)
        }
    }

    pub fn en_passant(from: u8, to: u8) -> Self {
        Self {
            captured: Some(Piece::Pawn),
            is_en_passant: true,
            ..Self::quiet(from, to, Piece::Pawn)
        }
    }

    pub fn castling(from: u8, to: u8) -> Self {
        Self {
            is_castling: true,
            ..Self::quiet(from, to, Piece::King)
        }
    }

    pub fn promotion(from: u8, to: u8, captured: Option<Piece>, promotion: Piece) -> Self {
        Self {
            captured,
            promotion: Some(promotion),
            ..Self::quiet(from, to, Piece::Pawn)
        }
    }

    /// Coordinate notation, e.g. "e2e4" or "e7e8q".
    pub fn notation(&self) -> String {
        let mut text = format!("{}{}", square_name(self.from), square_name(self.to));
        if let Some(promotion) = self.promotion {
            text.push(promotion.to_char(Color::Black));
        }
        text
    }
}

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];
const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];
const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const ROOK_DIRECTIONS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

fn offset(square: u8, dr: i8, df: i8) -> Option<u8> {
    let rank = (square / 8) as i8 + dr;
    let file = (square % 8) as i8 + df;
    if (0..8).contains(&rank) && (0..8).contains(&file) {
        Some((rank * 8 + file) as u8)
    } else {
        None
    }
}

pub struct MoveGenerator;

impl MoveGenerator {
    pub fn new() -> Self {
        Self
    }

    /// All legal moves for the side to move, optionally restricted to a
    /// single origin square. No ordering guarantee.
    pub fn legal_moves(&self, position: &Position, origin: Option<u8>) -> Vec<Move> {
        let us = position.side_to_move;
        self.pseudo_legal_moves(position, origin)
            .into_iter()
            .filter(|mv| !self.in_check(&position.make(mv), us))
            .collect()
    }

    fn pseudo_legal_moves(&self, position: &Position, origin: Option<u8>) -> Vec<Move> {
        let mut moves = Vec::new();
        let us = position.side_to_move;
        let own = position.occupied_by(us);
        let theirs = position.occupied_by(us.opposite());
        let occupied = own | theirs;
        let keep = |from: u8| origin.map_or(true, |o| o == from);

        let pieces = position.pieces(us);

        let mut pawns = pieces[Piece::Pawn.index()];
        while pawns != 0 {
            let from = pawns.trailing_zeros() as u8;
            pawns &= pawns - 1;
            if keep(from) {
                self.pawn_moves(position, from, occupied, theirs, &mut moves);
            }
        }

        let mut knights = pieces[Piece::Knight.index()];
        while knights != 0 {
            let from = knights.trailing_zeros() as u8;
            knights &= knights - 1;
            if keep(from) {
                self.offset_moves(position, from, Piece::Knight, &KNIGHT_OFFSETS, own, &mut moves);
            }
        }

        for (piece, directions) in [
            (Piece::Bishop, &BISHOP_DIRECTIONS[..]),
            (Piece::Rook, &ROOK_DIRECTIONS[..]),
        ] {
            let mut sliders = pieces[piece.index()];
            while sliders != 0 {
                let from = sliders.trailing_zeros() as u8;
                sliders &= sliders - 1;
                if keep(from) {
                    self.slider_moves(position, from, piece, directions, own, theirs, &mut moves);
                }
            }
        }

        let mut queens = pieces[Piece::Queen.index()];
        while queens != 0 {
            let from = queens.trailing_zeros() as u8;
            queens &= queens - 1;
            if keep(from) {
                self.slider_moves(position, from, Piece::Queen, &BISHOP_DIRECTIONS, own, theirs, &mut moves);
                self.slider_moves(position, from, Piece::Queen, &ROOK_DIRECTIONS, own, theirs, &mut moves);
            }
        }

        if let Some(from) = position.king_square(us) {
            if keep(from) {
                self.offset_moves(position, from, Piece::King, &KING_OFFSETS, own, &mut moves);
                self.castling_moves(position, from, occupied, &mut moves);
            }
        }

        moves
    }

    fn pawn_moves(
        &self,
        position: &Position,
        from: u8,
        occupied: u64,
        theirs: u64,
        moves: &mut Vec<Move>,
    ) {
        let us = position.side_to_move;
        let (forward, start_rank) = match us {
            Color::White => (1i8, 1u8),
            Color::Black => (-1, 6),
        };

        if let Some(to) = offset(from, forward, 0) {
            if occupied & (1u64 << to) == 0 {
                self.push_pawn_move(us, from, to, None, moves);

                if from / 8 == start_rank {
                    // The single-push square was empty; the double push only
                    // needs its own destination clear.
                    if let Some(to2) = offset(from, 2 * forward, 0) {
                        if occupied & (1u64 << to2) == 0 {
                            moves.push(Move::quiet(from, to2, Piece::Pawn));
                        }
                    }
                }
            }
        }

        for df in [-1i8, 1] {
            if let Some(to) = offset(from, forward, df) {
                let mask = 1u64 << to;
                if theirs & mask != 0 {
                    let captured = position.piece_at(to).map(|(p, _)| p);
                    self.push_pawn_move(us, from, to, captured, moves);
                } else if position.en_passant_square == Some(to) {
                    moves.push(Move::en_passant(from, to));
                }
            }
        }
    }

    fn push_pawn_move(
        &self,
        us: Color,
        from: u8,
        to: u8,
        captured: Option<Piece>,
        moves: &mut Vec<Move>,
    ) {
        let last_rank = match us {
            Color::White => 7,
            Color::Black => 0,
        };
        if to / 8 == last_rank {
            for promotion in [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight] {
                moves.push(Move::promotion(from, to, captured, promotion));
            }
        } else {
            let mut mv = Move::quiet(from, to, Piece::Pawn);
            mv.captured = captured;
            moves.push(mv);
        }
    }

    fn offset_moves(
        &self,
        position: &Position,
        from: u8,
        piece: Piece,
        offsets: &[(i8, i8)],
        own: u64,
        moves: &mut Vec<Move>,
    ) {
        for &(dr, df) in offsets {
            if let Some(to) = offset(from, dr, df) {
                let mask = 1u64 << to;
                if own & mask != 0 {
                    continue;
                }
                match position.piece_at(to) {
                    Some((captured, _)) => moves.push(Move::capture(from, to, piece, captured)),
                    None => moves.push(Move::quiet(from, to, piece)),
                }
            }
        }
    }

    fn slider_moves(
        &self,
        position: &Position,
        from: u8,
        piece: Piece,
        directions: &[(i8, i8)],
        own: u64,
        theirs: u64,
        moves: &mut Vec<Move>,
    ) {
        for &(dr, df) in directions {
            let mut square = from;
            while let Some(to) = offset(square, dr, df) {
                let mask = 1u64 << to;
                if own & mask != 0 {
                    break;
                }
                if theirs & mask != 0 {
                    if let Some((captured, _)) = position.piece_at(to) {
                        moves.push(Move::capture(from, to, piece, captured));
                    }
                    break;
                }
                moves.push(Move::quiet(from, to, piece));
                square = to;
            }
        }
    }

    fn castling_moves(&self, position: &Position, from: u8, occupied: u64, moves: &mut Vec<Move>) {
        let us = position.side_to_move;
        let them = us.opposite();
        let rooks = position.pieces(us)[Piece::Rook.index()];

        // (right, king home, rook home, squares that must be empty,
        //  squares the king occupies or crosses, destination)
        let lines: [(u8, u8, u8, &[u8], &[u8], u8); 2] = match us {
            Color::White => [
                (WHITE_KINGSIDE, 4, 7, &[5, 6], &[4, 5, 6], 6),
                (WHITE_QUEENSIDE, 4, 0, &[1, 2, 3], &[4, 3, 2], 2),
            ],
            Color::Black => [
                (BLACK_KINGSIDE, 60, 63, &[61, 62], &[60, 61, 62], 62),
                (BLACK_QUEENSIDE, 60, 56, &[57, 58, 59], &[60, 59, 58], 58),
            ],
        };

        for (right, king_home, rook_home, empty, safe, to) in lines {
            if position.castling_rights & right == 0 || from != king_home {
                continue;
            }
            if rooks & (1u64 << rook_home) == 0 {
                continue;
            }
            if empty.iter().any(|&s| occupied & (1u64 << s) != 0) {
                continue;
            }
            if safe.iter().any(|&s| self.is_square_attacked(position, s, them)) {
                continue;
            }
            moves.push(Move::castling(from, to));
        }
    }

    /// Whether `by` attacks `square`. Shared by castling legality, the
    /// king-safety filter and status reporting.
    pub fn is_square_attacked(&self, position: &Position, square: u8, by: Color) -> bool {
        let attackers = position.pieces(by);

        // A pawn of `by` attacks this square from one rank behind it (from
        // the attacker's point of view), one file to either side.
        let pawn_rank_delta = match by {
            Color::White => -1i8,
            Color::Black => 1,
        };
        for df in [-1i8, 1] {
            if let Some(origin) = offset(square, pawn_rank_delta, df) {
                if attackers[Piece::Pawn.index()] & (1u64 << origin) != 0 {
                    return true;
                }
            }
        }

        for &(dr, df) in &KNIGHT_OFFSETS {
            if let Some(origin) = offset(square, dr, df) {
                if attackers[Piece::Knight.index()] & (1u64 << origin) != 0 {
                    return true;
                }
            }
        }

        for &(dr, df) in &KING_OFFSETS {
            if let Some(origin) = offset(square, dr, df) {
                if attackers[Piece::King.index()] & (1u64 << origin) != 0 {
                    return true;
                }
            }
        }

        let occupied = position.occupied();
        for (directions, sliders) in [
            (
                &BISHOP_DIRECTIONS,
                attackers[Piece::Bishop.index()] | attackers[Piece::Queen.index()],
            ),
            (
                &ROOK_DIRECTIONS,
                attackers[Piece::Rook.index()] | attackers[Piece::Queen.index()],
            ),
        ] {
            for &(dr, df) in directions {
                let mut current = square;
                while let Some(next) = offset(current, dr, df) {
                    let mask = 1u64 << next;
                    if sliders & mask != 0 {
                        return true;
                    }
                    if occupied & mask != 0 {
                        break;
                    }
                    current = next;
                }
            }
        }

        false
    }

    pub fn in_check(&self, position: &Position, color: Color) -> bool {
        match position.king_square(color) {
            Some(square) => self.is_square_attacked(position, square, color.opposite()),
            None => false,
        }
    }
}

impl Default for MoveGenerator {
    fn default() -> Self {
        Self::new()
    }
}
