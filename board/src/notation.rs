//! Plain-text grid notation used by fixtures, logs and the command line.
//!
//! One line per row, tokens separated by whitespace:
//!
//! | token | cell |
//! |---|---|
//! | `.` | empty |
//! | `#` | wall |
//! | `3` | gem of color 3 |
//! | `3i2` | gem of color 3 under ice with durability 2 |
//! | `H` / `V` | horizontal / vertical line clearer |
//! | `B` | area bomb |

use std::fmt;

use gem_cascade_core::{Cell, GemColor, Orientation};
use thiserror::Error;

/// Errors produced while reading a textual grid.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum NotationError {
    /// The text contained no rows.
    #[error("grid contains no rows")]
    Empty,
    /// A row's length differs from the first row's.
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        /// Zero-based row index.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },
    /// A token does not describe any cell.
    #[error("unknown token `{token}` at row {row}, column {column}")]
    UnknownToken {
        /// Zero-based row index.
        row: usize,
        /// Zero-based column index.
        column: usize,
        /// Offending token.
        token: String,
    },
}

/// Parses a textual grid into rows of cells.
pub fn parse_grid(text: &str) -> Result<Vec<Vec<Cell>>, NotationError> {
    let mut rows = Vec::new();

    for (row, line) in text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
    {
        let cells = line
            .split_whitespace()
            .enumerate()
            .map(|(column, token)| {
                parse_cell(token).ok_or_else(|| NotationError::UnknownToken {
                    row,
                    column,
                    token: token.to_owned(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(cells);
    }

    check_rectangular(&rows)?;
    Ok(rows)
}

/// Verifies that the rows form a non-empty rectangle.
pub(crate) fn check_rectangular(rows: &[Vec<Cell>]) -> Result<(), NotationError> {
    let Some(first) = rows.first() else {
        return Err(NotationError::Empty);
    };
    if first.is_empty() {
        return Err(NotationError::Empty);
    }
    for (row, cells) in rows.iter().enumerate() {
        if cells.len() != first.len() {
            return Err(NotationError::RaggedRow {
                row,
                expected: first.len(),
                found: cells.len(),
            });
        }
    }
    Ok(())
}

fn parse_cell(token: &str) -> Option<Cell> {
    match token {
        "." => return Some(Cell::Empty),
        "#" => return Some(Cell::Wall),
        "H" => return Some(Cell::LineClearer(Orientation::Horizontal)),
        "V" => return Some(Cell::LineClearer(Orientation::Vertical)),
        "B" => return Some(Cell::AreaBomb),
        _ => {}
    }

    match token.split_once('i') {
        Some((color, durability)) => {
            let color = color.parse::<u8>().ok()?;
            let durability = durability.parse::<u8>().ok().filter(|value| *value > 0)?;
            Some(Cell::IceGem {
                color: GemColor::new(color),
                durability,
            })
        }
        None => token.parse::<u8>().ok().map(|color| Cell::Gem(GemColor::new(color))),
    }
}

/// Adapter that renders a cell as its notation token.
pub(crate) struct Token(pub(crate) Cell);

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Cell::Empty => f.write_str("."),
            Cell::Wall => f.write_str("#"),
            Cell::Gem(color) => write!(f, "{color}"),
            Cell::IceGem { color, durability } => write!(f, "{color}i{durability}"),
            Cell::LineClearer(Orientation::Horizontal) => f.write_str("H"),
            Cell::LineClearer(Orientation::Vertical) => f.write_str("V"),
            Cell::AreaBomb => f.write_str("B"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_token_kind() {
        let rows = parse_grid("0 1i2 #\n. H V\nB 4 3i1\n").expect("valid grid");
        assert_eq!(
            rows,
            vec![
                vec![
                    Cell::Gem(GemColor::new(0)),
                    Cell::IceGem {
                        color: GemColor::new(1),
                        durability: 2
                    },
                    Cell::Wall,
                ],
                vec![
                    Cell::Empty,
                    Cell::LineClearer(Orientation::Horizontal),
                    Cell::LineClearer(Orientation::Vertical),
                ],
                vec![
                    Cell::AreaBomb,
                    Cell::Gem(GemColor::new(4)),
                    Cell::IceGem {
                        color: GemColor::new(3),
                        durability: 1
                    },
                ],
            ]
        );
    }

    #[test]
    fn rejects_ragged_rows_and_unknown_tokens() {
        assert_eq!(
            parse_grid("0 1 2\n3 4"),
            Err(NotationError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2
            })
        );
        assert_eq!(
            parse_grid("0 x 2"),
            Err(NotationError::UnknownToken {
                row: 0,
                column: 1,
                token: "x".to_owned()
            })
        );
        assert!(matches!(
            parse_grid("0 2i0 1"),
            Err(NotationError::UnknownToken { column: 1, .. })
        ));
        assert_eq!(parse_grid("  \n\n"), Err(NotationError::Empty));
    }

    #[test]
    fn tokens_render_in_notation() {
        let rendered: Vec<String> = [
            Cell::Empty,
            Cell::Wall,
            Cell::Gem(GemColor::new(7)),
            Cell::IceGem {
                color: GemColor::new(2),
                durability: 3,
            },
            Cell::LineClearer(Orientation::Vertical),
            Cell::AreaBomb,
        ]
        .into_iter()
        .map(|cell| Token(cell).to_string())
        .collect();
        assert_eq!(rendered, vec![".", "#", "7", "2i3", "V", "B"]);
    }
}
