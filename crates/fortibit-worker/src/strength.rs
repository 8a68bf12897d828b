// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Password strength scoring on a 0-4 scale.
//!
//! Length sets the base score; character variety raises it; repetition,
//! keyboard/alphabet runs and well-known passwords lower it.

const COMMON_PASSWORDS: &[&str] = &[
    "123456", "123456789", "12345678", "12345", "1234567", "1234567890", "password",
    "password1", "qwerty", "qwerty123", "abc123", "111111", "123123", "000000",
    "iloveyou", "admin", "welcome", "letmein", "monkey", "dragon", "football",
    "baseball", "sunshine", "princess", "master", "shadow", "superman", "trustno1",
    "passw0rd", "starwars", "login", "hello", "freedom", "whatever", "zaq12wsx",
];

const SEQUENCES: &[&str] = &[
    "abcdefghijklmnopqrstuvwxyz",
    "0123456789",
    "qwertyuiop",
    "asdfghjkl",
    "zxcvbnm",
];

/// Score `password` from 0 (trivially guessable) to 4 (strong).
pub fn score(password: &str) -> u8 {
    let len = password.chars().count();
    if len == 0 {
        return 0;
    }
    let lower = password.to_lowercase();
    if COMMON_PASSWORDS.contains(&lower.as_str()) {
        return 0;
    }

    let mut points: i32 = match len {
        0..=5 => 0,
        6..=9 => 1,
        10..=13 => 2,
        14..=17 => 3,
        _ => 4,
    };

    let classes = char_classes(password);
    if classes >= 3 {
        points += 1;
    }
    if classes == 1 {
        points -= 1;
    }

    if has_low_variety(password) {
        points -= 2;
    }
    if has_run(&lower, 4) {
        points -= 1;
    }
    if COMMON_PASSWORDS
        .iter()
        .any(|common| common.len() >= 5 && lower.contains(common))
    {
        points -= 1;
    }

    points.clamp(0, 4) as u8
}

fn char_classes(password: &str) -> usize {
    let mut seen = [false; 4];
    for c in password.chars() {
        let class = if c.is_lowercase() {
            0
        } else if c.is_uppercase() {
            1
        } else if c.is_ascii_digit() {
            2
        } else {
            3
        };
        seen[class] = true;
    }
    seen.iter().filter(|s| **s).count()
}

/// Fewer than a third of the characters are distinct.
fn has_low_variety(password: &str) -> bool {
    let mut chars: Vec<char> = password.chars().collect();
    let len = chars.len();
    chars.sort_unstable();
    chars.dedup();
    chars.len() * 3 < len
}

/// A forward or reverse run of at least `min` characters from a known sequence.
fn has_run(lower: &str, min: usize) -> bool {
    let chars: Vec<char> = lower.chars().collect();
    if chars.len() < min {
        return false;
    }
    chars.windows(min).any(|window| {
        let forward: String = window.iter().collect();
        let reverse: String = window.iter().rev().collect();
        SEQUENCES
            .iter()
            .any(|seq| seq.contains(&forward) || seq.contains(&reverse))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_common_score_zero() {
        assert_eq!(score(""), 0);
        assert_eq!(score("password"), 0);
        assert_eq!(score("Qwerty123"), 0);
    }

    #[test]
    fn short_simple_passwords_are_weak() {
        assert!(score("cat") <= 1);
        assert!(score("aaaaaaaaaa") <= 1);
        assert!(score("abcd1234") <= 1);
    }

    #[test]
    fn long_varied_passwords_are_strong() {
        assert_eq!(score("v7#Lq!z9Tm@2Wx$e"), 4);
        assert!(score("correct horse battery staple") >= 3);
    }

    #[test]
    fn variety_raises_score() {
        assert!(score("Tr0ub4dor&3x") > score("troubadorxx"));
    }

    #[test]
    fn runs_are_detected_in_both_directions() {
        assert!(has_run("xx4321yy", 4));
        assert!(has_run("asdf", 4));
        assert!(!has_run("a1b2c3d4", 4));
    }
}
