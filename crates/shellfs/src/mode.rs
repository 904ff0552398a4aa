// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Permission bits.
//!
//! A [`Mode`] is three octal-style digits: owner, signed-in member, guest.
//! Each digit is a [`Permission`] over execute(1), write(2) and read(4).

use crate::user::UserId;
use serde::{Deserialize, Serialize};

/// One permission digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Permission {
    None = 0,
    Execute = 1,
    Write = 2,
    ExecuteWrite = 3,
    Read = 4,
    ExecuteRead = 5,
    ReadWrite = 6,
    ExecuteReadWrite = 7,
}

impl Permission {
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Digits above 7 clamp to [`Permission::ExecuteReadWrite`].
    #[must_use]
    pub const fn from_digit(digit: u8) -> Self {
        match digit {
            0 => Permission::None,
            1 => Permission::Execute,
            2 => Permission::Write,
            3 => Permission::ExecuteWrite,
            4 => Permission::Read,
            5 => Permission::ExecuteRead,
            6 => Permission::ReadWrite,
            _ => Permission::ExecuteReadWrite,
        }
    }

    #[must_use]
    pub const fn contains(self, required: Permission) -> bool {
        self.bits() & required.bits() == required.bits()
    }

    fn symbolic(self) -> [char; 3] {
        [
            if self.contains(Permission::Read) { 'r' } else { '-' },
            if self.contains(Permission::Write) { 'w' } else { '-' },
            if self.contains(Permission::Execute) { 'x' } else { '-' },
        ]
    }
}

/// Which digit of a mode applies to a requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Owner,
    Member,
    Guest,
}

impl Scope {
    #[must_use]
    pub fn of(owner: &UserId, user: &UserId) -> Self {
        if user == owner {
            Scope::Owner
        } else if user.is_guest() {
            Scope::Guest
        } else {
            Scope::Member
        }
    }
}

/// An access being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
    Execute,
    ReadWrite,
}

impl Operation {
    #[must_use]
    pub const fn required(self) -> Permission {
        match self {
            Operation::Read => Permission::Read,
            Operation::Write => Permission::Write,
            Operation::Execute => Permission::Execute,
            Operation::ReadWrite => Permission::ReadWrite,
        }
    }

    #[must_use]
    pub const fn short_name(self) -> &'static str {
        match self {
            Operation::Read => "r",
            Operation::Write => "w",
            Operation::Execute => "x",
            Operation::ReadWrite => "rw",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.short_name())
    }
}

/// A three-digit permission value such as `755`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", from = "u16")]
pub struct Mode {
    owner: Permission,
    member: Permission,
    guest: Permission,
}

impl Mode {
    #[must_use]
    pub const fn new(owner: Permission, member: Permission, guest: Permission) -> Self {
        Self {
            owner,
            member,
            guest,
        }
    }

    /// Interprets the last three decimal digits of `raw`, clamping each to 7.
    #[must_use]
    pub const fn from_number(raw: u32) -> Self {
        Self {
            owner: Permission::from_digit(((raw / 100) % 10) as u8),
            member: Permission::from_digit(((raw / 10) % 10) as u8),
            guest: Permission::from_digit((raw % 10) as u8),
        }
    }

    /// Normalizes user input into a mode.
    ///
    /// The last three characters are the digits; missing leading digits are
    /// 0, each digit clamps into `[0, 7]` and non-digit characters count as
    /// 0. Returns `None` when the input holds no digit at all.
    #[must_use]
    pub fn format(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if !raw.chars().any(|c| c.is_ascii_digit()) {
            return None;
        }
        let chars: Vec<char> = raw.chars().collect();
        let tail = &chars[chars.len().saturating_sub(3)..];
        let mut digits = [0u8; 3];
        for (slot, c) in digits.iter_mut().skip(3 - tail.len()).zip(tail) {
            *slot = c.to_digit(10).map_or(0, |d| d as u8);
        }
        Some(Self::new(
            Permission::from_digit(digits[0]),
            Permission::from_digit(digits[1]),
            Permission::from_digit(digits[2]),
        ))
    }

    #[must_use]
    pub const fn digit(self, scope: Scope) -> Permission {
        match scope {
            Scope::Owner => self.owner,
            Scope::Member => self.member,
            Scope::Guest => self.guest,
        }
    }

    #[must_use]
    pub const fn as_number(self) -> u16 {
        self.owner.bits() as u16 * 100 + self.member.bits() as u16 * 10 + self.guest.bits() as u16
    }

    /// `rwxr-xr-x` style rendering.
    #[must_use]
    pub fn symbolic(self) -> String {
        [self.owner, self.member, self.guest]
            .into_iter()
            .flat_map(Permission::symbolic)
            .collect()
    }
}

impl From<Mode> for u16 {
    fn from(mode: Mode) -> u16 {
        mode.as_number()
    }
}

impl From<u16> for Mode {
    fn from(raw: u16) -> Mode {
        Mode::from_number(u32::from(raw))
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:03}", self.as_number())
    }
}

/// Checks whether `user` may perform `op` on an entry owned by `owner`.
///
/// Root always passes.
#[must_use]
pub fn validate(mode: Mode, owner: &UserId, user: &UserId, op: Operation) -> bool {
    if user.is_root() {
        return true;
    }
    mode.digit(Scope::of(owner, user)).contains(op.required())
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPERATIONS: [Operation; 4] = [
        Operation::Read,
        Operation::Write,
        Operation::Execute,
        Operation::ReadWrite,
    ];

    #[test]
    fn test_digit_names_cover_all_bits() {
        for digit in 0..8u8 {
            assert_eq!(Permission::from_digit(digit).bits(), digit);
        }
        assert_eq!(Permission::from_digit(9), Permission::ExecuteReadWrite);
        assert!(Permission::ReadWrite.contains(Permission::Read));
        assert!(!Permission::ExecuteRead.contains(Permission::Write));
        assert!(Permission::None.contains(Permission::None));
    }

    #[test]
    fn test_scope_selection() {
        let alice = UserId::named("alice");
        let bob = UserId::named("bob");
        assert_eq!(Scope::of(&alice, &alice), Scope::Owner);
        assert_eq!(Scope::of(&alice, &bob), Scope::Member);
        assert_eq!(Scope::of(&alice, &UserId::guest()), Scope::Guest);
        // A guest-owned entry is the guest's own.
        assert_eq!(Scope::of(&UserId::guest(), &UserId::guest()), Scope::Owner);
    }

    #[test]
    fn test_owner_depends_only_on_hundreds_digit() {
        let alice = UserId::named("alice");
        for owner_digit in 0..8u32 {
            for rest in [0u32, 7, 42, 77] {
                let mode = Mode::from_number(owner_digit * 100 + rest);
                let baseline = Mode::from_number(owner_digit * 100);
                for op in OPERATIONS {
                    assert_eq!(
                        validate(mode, &alice, &alice, op),
                        validate(baseline, &alice, &alice, op),
                        "mode {mode} op {op}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_root_always_passes() {
        let root = UserId::root();
        for raw in [0u32, 100, 700, 777] {
            for op in OPERATIONS {
                assert!(validate(Mode::from_number(raw), &UserId::named("alice"), &root, op));
            }
        }
    }

    #[test]
    fn test_member_and_guest_digits() {
        let mode = Mode::from_number(640);
        let alice = UserId::named("alice");
        let bob = UserId::named("bob");
        assert!(validate(mode, &alice, &alice, Operation::ReadWrite));
        assert!(validate(mode, &alice, &bob, Operation::Read));
        assert!(!validate(mode, &alice, &bob, Operation::Write));
        assert!(!validate(mode, &alice, &UserId::guest(), Operation::Read));
    }

    #[test]
    fn test_format_clamps_digits() {
        assert_eq!(Mode::format("755").map(Mode::as_number), Some(755));
        assert_eq!(Mode::format("985").map(Mode::as_number), Some(775));
        assert_eq!(Mode::format("7a5").map(Mode::as_number), Some(705));
        assert_eq!(Mode::format("44").map(Mode::as_number), Some(44));
        assert_eq!(Mode::format(" 1644 ").map(Mode::as_number), Some(644));
        assert_eq!(Mode::format("rwx"), None);
        assert_eq!(Mode::format(""), None);
    }

    #[test]
    fn test_rendering() {
        let mode = Mode::from_number(754);
        assert_eq!(mode.to_string(), "754");
        assert_eq!(mode.symbolic(), "rwxr-xr--");
        assert_eq!(Mode::from_number(7).to_string(), "007");
        assert_eq!(serde_json::to_string(&mode).unwrap(), "754");
        let back: Mode = serde_json::from_str("664").unwrap();
        assert_eq!(back, Mode::from_number(664));
    }
}
