//! Property checks over shapes, positions and clear sequences.

use proptest::prelude::*;

use tetris_engine::config::EngineConfig;
use tetris_engine::game::{line_clear_score, Command, Game, SpawnResult, LINES_PER_LEVEL};
use tetris_engine::piece::{SequencePieceProvider, Shape};

fn game_with(shape: Shape, row: i16, col: i16) -> Game {
    let provider = Box::new(SequencePieceProvider::new(vec![Shape::O]));
    let mut game = Game::with_provider(EngineConfig::default(), provider).unwrap();
    assert_eq!(game.spawn_at(shape, row, col), SpawnResult::Spawned);
    game
}

proptest! {
    #[test]
    fn rotation_cycle_is_closed(shape in 0usize..7, row in 4i16..16, col in 3i16..7) {
        let shape = Shape::ALL[shape];
        let mut game = game_with(shape, row, col);
        let before = game.active_piece().unwrap().cells();

        for _ in 0..shape.state_count() {
            prop_assert!(game.rotate());
        }

        let piece = game.active_piece().unwrap();
        prop_assert_eq!(piece.rotation, 0);
        prop_assert_eq!(piece.cells(), before);
    }

    #[test]
    fn horizontal_moves_are_reversible(
        shape in 0usize..7,
        row in 4i16..16,
        col in 2i16..8,
        right in any::<bool>(),
    ) {
        let shape = Shape::ALL[shape];
        let provider = Box::new(SequencePieceProvider::new(vec![Shape::O]));
        let mut game = Game::with_provider(EngineConfig::default(), provider).unwrap();
        prop_assume!(game.spawn_at(shape, row, col) == SpawnResult::Spawned);
        let before = game.active_piece().unwrap().cells();
        let (there, back) = if right { (1, -1) } else { (-1, 1) };

        if game.move_piece(0, there) {
            prop_assert!(game.move_piece(0, back));
            prop_assert_eq!(game.active_piece().unwrap().cells(), before);
        } else {
            prop_assert_eq!(game.active_piece().unwrap().cells(), before);
        }
    }

    #[test]
    fn first_drop_on_empty_grid_adds_four_cells(shape in 0usize..7, shifts in -4i16..5) {
        let mut game = game_with(Shape::ALL[shape], 0, 5);
        let command = if shifts < 0 { Command::MoveLeft } else { Command::MoveRight };
        for _ in 0..shifts.abs() {
            game.command(command);
        }

        let outcome = game.command(Command::HardDrop);

        prop_assert!(outcome.locked);
        prop_assert_eq!(outcome.lines_cleared, 0);
        prop_assert_eq!(game.grid().occupied_count(), 4);
    }

    #[test]
    fn score_and_level_follow_clear_history(clears in prop::collection::vec(1u32..=4, 0..40)) {
        let mut game = game_with(Shape::T, 5, 4);
        let mut expected_score = 0;
        let mut expected_lines = 0;

        for lines in clears {
            game.award_lines(lines);
            expected_score += line_clear_score(lines);
            expected_lines += lines;

            prop_assert_eq!(game.score(), expected_score);
            prop_assert_eq!(game.lines_cleared(), expected_lines);
            prop_assert_eq!(game.level(), 1 + expected_lines / LINES_PER_LEVEL);
        }
    }
}
