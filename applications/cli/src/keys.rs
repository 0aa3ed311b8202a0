//! Keyboard shortcuts
//!
//! Input is line-based: each character of a line is one shortcut, except a
//! line that is entirely a number, which selects that (1-based) track.

use strawberry_playback::{UserIntent, Visibility};

/// Volume change per `+`/`-` press
pub const VOLUME_STEP: f32 = 0.1;

/// Action requested from the keyboard
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyAction {
    Intent(UserIntent),
    /// Relative volume change, resolved against the current level
    VolumeStep(f32),
    Visibility(Visibility),
    RefreshCatalog,
    Status,
    Help,
    Quit,
}

/// Parse one line of input into actions
pub fn parse_line(line: &str) -> Vec<KeyAction> {
    let trimmed = line.trim_end_matches(['\r', '\n']);

    if trimmed.trim().is_empty() {
        return if trimmed.contains(' ') {
            vec![KeyAction::Intent(UserIntent::TogglePlayPause)]
        } else {
            vec![KeyAction::Status]
        };
    }

    if let Ok(number) = trimmed.trim().parse::<usize>() {
        return match number.checked_sub(1) {
            Some(index) => vec![KeyAction::Intent(UserIntent::SelectTrack { index })],
            None => Vec::new(),
        };
    }

    trimmed.chars().filter_map(parse_key).collect()
}

/// Map one key to its action
pub fn parse_key(key: char) -> Option<KeyAction> {
    let action = match key {
        ' ' => KeyAction::Intent(UserIntent::TogglePlayPause),
        'n' | 'N' => KeyAction::Intent(UserIntent::Next),
        'p' | 'P' => KeyAction::Intent(UserIntent::Previous),
        'm' | 'M' => KeyAction::Intent(UserIntent::ToggleMute),
        's' | 'S' => KeyAction::Intent(UserIntent::ToggleShuffle),
        'r' | 'R' => KeyAction::Intent(UserIntent::ToggleRepeat),
        '+' | '=' => KeyAction::VolumeStep(VOLUME_STEP),
        '-' | '_' => KeyAction::VolumeStep(-VOLUME_STEP),
        'f' | 'F' => KeyAction::Visibility(Visibility::Visible),
        'b' | 'B' => KeyAction::Visibility(Visibility::Hidden),
        'g' | 'G' => KeyAction::RefreshCatalog,
        'i' | 'I' => KeyAction::Status,
        '?' | 'h' | 'H' => KeyAction::Help,
        'q' | 'Q' => KeyAction::Quit,
        _ => return None,
    };
    Some(action)
}

pub const HELP: &str = "\
Keys (press Enter after each line):
  <space>  play / pause       n / p    next / previous
  m        mute               s        shuffle
  r        repeat mode        + / -    volume up / down
  <number> play track         f / b    foreground / background
  g        reload catalog     i        status
  ?        help               q        quit";
