use crate::board::Board;
use std::fmt;
use std::fs;
use std::io;

/// Error type for level parsing operations.
#[derive(Debug)]
pub enum LevelError {
    /// IO error when reading from file
    Io(io::Error),
    /// Invalid level content
    InvalidLevel(String),
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::Io(err) => write!(f, "IO error: {}", err),
            LevelError::InvalidLevel(msg) => write!(f, "Invalid level: {}", msg),
        }
    }
}

impl From<io::Error> for LevelError {
    fn from(err: io::Error) -> Self {
        LevelError::Io(err)
    }
}

impl From<String> for LevelError {
    fn from(err: String) -> Self {
        LevelError::InvalidLevel(err)
    }
}

/// A collection of levels in XSB format: boards separated by comment lines
/// (starting with `;`) or blank lines.
#[derive(Debug)]
pub struct Levels {
    levels: Vec<Board>,
}

impl Levels {
    /// Parse XSB-formatted levels from a string, validating each board.
    pub fn from_text(contents: &str) -> Result<Self, LevelError> {
        let mut levels = Vec::new();
        let mut current_level = String::new();

        for line in contents.lines() {
            // Comment lines separate levels
            if line.trim_start().starts_with(';') {
                if !current_level.is_empty() {
                    levels.push(Board::from_text(current_level.trim_end())?);
                    current_level.clear();
                }
                continue;
            }

            if line.trim().is_empty() {
                if !current_level.is_empty() {
                    levels.push(Board::from_text(current_level.trim_end())?);
                    current_level.clear();
                }
                continue;
            }

            current_level.push_str(line);
            current_level.push('\n');
        }

        if !current_level.is_empty() {
            levels.push(Board::from_text(current_level.trim_end())?);
        }

        Ok(Levels { levels })
    }

    /// Parse XSB-formatted levels from a text file.
    pub fn from_file(path: &str) -> Result<Self, LevelError> {
        let contents = fs::read_to_string(path)?;
        Self::from_text(&contents)
    }

    /// Get the nth level (0-indexed).
    pub fn get(&self, index: usize) -> Option<&Board> {
        self.levels.get(index)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_basic() {
        let level1 = "#####\n\
                      #@$.#\n\
                      #####";

        let level2 = "######\n\
                      #    #\n\
                      # #@ #\n\
                      # $* #\n\
                      # .* #\n\
                      #    #\n\
                      ######";

        // Leading spaces are significant, so no line-continuation literal here
        let level3 =
            "  ####\n###  ####\n#     $ #\n# #  #$ #\n# . .#@ #\n#########";

        let xsb_content = format!(
            "; 1\n\n{}\n\n; 2\n\n{}\n\n; 3\n\n{}\n",
            level1, level2, level3
        );

        let levels = Levels::from_text(&xsb_content).unwrap();
        assert_eq!(levels.len(), 3);

        assert_eq!(levels.get(0).unwrap().box_count(), 1);
        assert_eq!(levels.get(1).unwrap().box_count(), 3);
        assert_eq!(levels.get(2).unwrap().box_count(), 2);
        assert_eq!(levels.get(3), None);
    }

    #[test]
    fn test_from_text_invalid_level() {
        let xsb_content = "; 1\n\n####\n# .#\n#@@$  #\n####\n";
        let result = Levels::from_text(xsb_content);
        assert!(matches!(result, Err(LevelError::InvalidLevel(_))));
    }

    #[test]
    fn test_from_file_no_file() {
        let result = Levels::from_file("nonexistent_file.xsb");
        assert!(matches!(result, Err(LevelError::Io(_))));
    }
}
