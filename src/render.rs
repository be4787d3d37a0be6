use std::collections::HashSet;
use std::io::{self, Write};

use colored::Colorize;

use crate::geometry::{Bounds, Position};
use crate::snake::SnakeBody;

fn clear_screen(out: &mut impl Write) -> io::Result<()> {
    write!(out, "{}[2J{}[1;1H", 27 as char, 27 as char)
}

/// Draws the board: walls, snake, food and the score line. Every cell is
/// two columns wide so the grid looks roughly square in a terminal.
pub fn draw_board(
    out: &mut impl Write,
    bounds: &Bounds,
    snake: &SnakeBody,
    food: Option<Position>,
    score: u32,
) -> io::Result<()> {
    let body: HashSet<Position> = snake.iter().copied().collect();
    clear_screen(out)?;
    for y in 0..bounds.height() {
        for x in 0..bounds.width() {
            let pos = Position::new(x, y);
            if bounds.is_border(pos) {
                write!(out, "{}", "██".blue())?;
            } else if pos == snake.head() {
                write!(out, "{}", "Ӫ ".yellow())?;
            } else if body.contains(&pos) {
                write!(out, "{}", "⏺ ".green())?;
            } else if food == Some(pos) {
                write!(out, "{}", "♦ ".red())?;
            } else {
                write!(out, "  ")?;
            }
        }
        writeln!(out)?;
    }
    writeln!(out, "Points: {}", score.to_string().yellow())?;
    out.flush()
}

pub fn draw_menu(out: &mut impl Write) -> io::Result<()> {
    clear_screen(out)?;
    writeln!(out, "{}", "SNAKE".green().bold())?;
    writeln!(out)?;
    writeln!(out, "arrows, 8/4/5/6 or u/l/d/r  move")?;
    writeln!(out, "+ / -                       faster / slower")?;
    writeln!(out, "q                           quit")?;
    writeln!(out)?;
    writeln!(out, "press any key to start")?;
    out.flush()
}

pub fn draw_game_over(out: &mut impl Write, score: u32, can_restart: bool) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "GAME OVER!".red().bold())?;
    writeln!(out, "Final Score: {}", score.to_string().yellow())?;
    if can_restart {
        writeln!(out, "n to play again, q to quit")?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_has_one_line_per_row() {
        colored::control::set_override(false);
        let bounds = Bounds::new(6, 4);
        let snake = SnakeBody::new(Position::new(2, 1));
        let mut out = Vec::new();

        draw_board(&mut out, &bounds, &snake, Some(Position::new(4, 2)), 30).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[1].contains('Ӫ'));
        assert!(lines[2].contains('♦'));
        assert!(lines[4].contains("Points: 30"));
    }

    #[test]
    fn test_game_over_banner() {
        colored::control::set_override(false);
        let mut out = Vec::new();

        draw_game_over(&mut out, 20, false).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("GAME OVER!"));
        assert!(text.contains("Final Score: 20"));
        assert!(!text.contains("play again"));
    }
}
