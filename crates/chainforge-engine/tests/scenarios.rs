//! Engine behaviour through the public API: the placement and capture
//! walkthroughs, plus randomised games that check the termination,
//! elimination, winner and turn properties after every move.

use chainforge_engine::{Board, GameOutcome, GameRoom, Position, resolve_chain};
use chainforge_protocol::{BoardConfig, ConnectionId, ExplosionKind, GameStatus, PlayerId, RoomId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const P: PlayerId = PlayerId(10);
const Q: PlayerId = PlayerId(20);

#[test]
fn two_by_two_corners_fill_at_two() {
    let mut board = Board::new(BoardConfig::new(2, 2));
    for pos in board.positions().collect::<Vec<_>>() {
        assert_eq!(board.cell(pos).unwrap().capacity(), 2);
    }

    let origin = Position::new(0, 0);
    assert_eq!(board.place_token(origin, P).unwrap().token_count(), 1);
    let cell = *board.place_token(origin, P).unwrap();
    assert_eq!(cell.token_count(), 2);
    assert!(cell.is_explodable());
    assert_eq!(board.explosion_candidates(), vec![origin]);
}

#[test]
fn explosion_clears_source_and_overwrites_neighbours() {
    let mut board = Board::new(BoardConfig::new(2, 2));
    board.place_token(Position::new(1, 0), Q).unwrap();
    board.place_token(Position::new(0, 0), P).unwrap();
    board.place_token(Position::new(0, 0), P).unwrap();

    let events = board.explode(Position::new(0, 0), P).unwrap();
    assert_eq!(events[0].kind, ExplosionKind::Explosion);

    let source = board.cell(Position::new(0, 0)).unwrap();
    assert_eq!((source.token_count(), source.owner()), (0, None));

    let below = board.cell(Position::new(1, 0)).unwrap();
    assert_eq!((below.token_count(), below.owner()), (2, Some(P)));
    let right = board.cell(Position::new(0, 1)).unwrap();
    assert_eq!((right.token_count(), right.owner()), (1, Some(P)));
}

#[test]
fn chain_reaction_wipes_out_the_captured_player() {
    let mut board = Board::new(BoardConfig::new(2, 2));
    board.place_token(Position::new(1, 0), Q).unwrap();
    board.place_token(Position::new(0, 0), P).unwrap();
    board.place_token(Position::new(0, 0), P).unwrap();

    let events = resolve_chain(&mut board);

    let bursts = events.iter().filter(|e| e.kind == ExplosionKind::Explosion).count();
    assert_eq!(bursts, 2);
    assert!(board.cells_owned_by(Q).is_empty());
}

#[test]
fn opening_deal_is_reproducible_for_a_seed() {
    let deal = |seed| {
        let mut room = GameRoom::new(RoomId::new("R").unwrap(), BoardConfig::new(4, 4));
        room.add_player(ConnectionId::new(1), "a", false);
        room.add_player(ConnectionId::new(2), "b", false);
        room.start_game_with(&mut StdRng::seed_from_u64(seed)).unwrap();
        let counts: Vec<u32> = room
            .board()
            .positions()
            .map(|pos| room.board().cell(pos).unwrap().token_count())
            .collect();
        counts
    };
    assert_eq!(deal(3), deal(3));
}

/// Plays a whole game with random legal moves, checking invariants after
/// every turn. Returns how the game ended, if it did.
fn random_game(seed: u64, players: u64, rows: usize, cols: usize) -> Option<GameOutcome> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut room = GameRoom::new(RoomId::new(format!("R{seed}")).unwrap(), BoardConfig::new(rows, cols));
    for i in 0..players {
        room.add_player(ConnectionId::new(i), format!("p{i}"), false);
    }
    room.add_player(ConnectionId::new(99), "watcher", true);
    room.start_game_with(&mut rng).unwrap();

    for _ in 0..1_000 {
        let current = room.current_player().unwrap();
        assert!(current.is_active(), "seed {seed}: turn on inactive player");
        let me = current.id();

        let legal: Vec<Position> = room
            .board()
            .positions()
            .filter(|&pos| {
                let cell = room.board().cell(pos).unwrap();
                cell.owner().is_none_or(|o| o == me) && cell.token_count() < cell.capacity()
            })
            .collect();
        if legal.is_empty() {
            return None;
        }
        let pick = legal[rng.random_range(0..legal.len())];

        let report = room.play_turn(me, pick.row as i64, pick.col as i64).unwrap();

        let bursts = report
            .explosions
            .iter()
            .filter(|e| e.kind == ExplosionKind::Explosion)
            .count();
        assert!(bursts <= rows * cols, "seed {seed}: {bursts} explosions in one run");

        for id in &report.eliminated {
            assert!(room.board().cells_owned_by(*id).is_empty());
        }
        for player in room.players().iter().filter(|p| !p.is_spectator()) {
            let owns = !room.board().cells_owned_by(player.id()).is_empty();
            assert_eq!(player.is_active(), owns, "seed {seed}: elimination out of sync");
        }

        match report.outcome {
            Some(outcome) => {
                assert_eq!(room.state(), GameStatus::Finished);
                let active: Vec<PlayerId> = room.active_players().map(|p| p.id()).collect();
                match outcome {
                    GameOutcome::Winner(id) => assert_eq!(active, vec![id]),
                    GameOutcome::Draw => assert!(active.is_empty()),
                }
                assert_eq!(room.winner(), outcome.winner());
                return Some(outcome);
            }
            None => {
                assert_eq!(room.state(), GameStatus::Playing);
                assert!(room.active_count() >= 2);
            }
        }
    }
    None
}

#[test]
fn random_games_keep_invariants() {
    let mut finished = 0;
    for seed in 0..60 {
        let players = 2 + seed % 3;
        if random_game(seed, players, 4, 5).is_some() {
            finished += 1;
        }
    }
    assert!(finished > 0, "no random game ever finished");
}

#[test]
fn finished_game_rejects_further_moves() {
    let outcome = (0..200).find_map(|seed| {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut room = GameRoom::new(RoomId::new("F").unwrap(), BoardConfig::new(2, 3));
        room.add_player(ConnectionId::new(1), "a", false);
        room.add_player(ConnectionId::new(2), "b", false);
        room.start_game_with(&mut rng).unwrap();
        for _ in 0..200 {
            let me = room.current_player()?.id();
            let legal: Vec<Position> = room
                .board()
                .positions()
                .filter(|&pos| {
                    let cell = room.board().cell(pos).unwrap();
                    cell.owner().is_none_or(|o| o == me) && cell.token_count() < cell.capacity()
                })
                .collect();
            if legal.is_empty() {
                return None;
            }
            let pick = legal[rng.random_range(0..legal.len())];
            if room.play_turn(me, pick.row as i64, pick.col as i64).ok()?.outcome.is_some() {
                return Some(room);
            }
        }
        None
    });

    let mut room = outcome.expect("some small game should finish");
    let anyone = room.players()[0].id();
    assert!(room.play_turn(anyone, 0, 0).is_err());
    assert!(room.start_game().is_err());
}
