//! Game-specific error types.
//!
//! Gameplay failure (a failed stacking attempt) is a normal terminal state
//! of the drop state machine, not an error.  These types cover genuine
//! defects: malformed catalog data and out-of-range tuning constants.
//! Systems degrade gracefully rather than panicking where practical.

// This module provides infrastructure types for validation at startup and in
// tests. Items are public API; dead_code lint is suppressed to avoid forcing
// premature wiring.
#![allow(dead_code)]
use std::fmt;

/// Top-level error enum for the love-escape game.
#[derive(Debug)]
pub enum GameError {
    /// A chapter layout table did not match its declared shape, e.g. a
    /// pyramid tier count inconsistent with the block list.
    LayoutMismatch {
        /// Human-readable description of the table that failed validation.
        context: &'static str,
        /// Expected entry count.
        expected: usize,
        /// Actual entry count provided.
        got: usize,
    },

    /// A block layout declared no interactive block, or more than one.
    InteractiveBlockCount {
        /// Number of blocks flagged interactive.
        got: usize,
    },

    /// A tuning constant is outside its safe operating range.
    /// Returned by validation helpers; not triggered at runtime by default.
    UnsafeConstant {
        /// Name of the constant (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the safe range.
        safe_range: &'static str,
    },
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::LayoutMismatch {
                context,
                expected,
                got,
            } => write!(
                f,
                "layout table '{}' mismatch: expected {} entries, got {}",
                context, expected, got
            ),
            GameError::InteractiveBlockCount { got } => write!(
                f,
                "block layout must flag exactly 1 interactive block, got {}",
                got
            ),
            GameError::UnsafeConstant {
                name,
                value,
                safe_range,
            } => write!(
                f,
                "constant '{}' = {} is outside safe range {}",
                name, value, safe_range
            ),
        }
    }
}

impl std::error::Error for GameError {}

/// Convenience alias: a `Result` using `GameError` as the error type.
pub type GameResult<T> = Result<T, GameError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error if a restitution coefficient is outside [0, 1].
///
/// Values above 1.0 inject energy on every bounce and the collapse never
/// settles.
pub fn validate_restitution(name: &'static str, value: f32) -> GameResult<()> {
    if !(0.0..=1.0).contains(&value) {
        Err(GameError::UnsafeConstant {
            name,
            value,
            safe_range: "[0.0, 1.0]",
        })
    } else {
        Ok(())
    }
}

/// Returns an error if a multiplicative damping factor is outside (0, 1].
pub fn validate_damping(name: &'static str, value: f32) -> GameResult<()> {
    if value <= 0.0 || value > 1.0 {
        Err(GameError::UnsafeConstant {
            name,
            value,
            safe_range: "(0.0, 1.0]",
        })
    } else {
        Ok(())
    }
}

/// Returns an error if a timer duration is not strictly positive.
pub fn validate_duration(name: &'static str, value: f32) -> GameResult<()> {
    if value <= 0.0 {
        Err(GameError::UnsafeConstant {
            name,
            value,
            safe_range: "(0.0, ∞)",
        })
    } else {
        Ok(())
    }
}
