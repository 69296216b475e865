//! Command key identifiers
//!
//! A `CommandKey` names one queryable aspect of a `CommandBuffer`: a pure
//! direction, a diagonal, their strict (`$`) and released (`~`) variants, or
//! a button. The declaration order is significant: range checks in the
//! matcher compare discriminants directly.

use serde::{Deserialize, Serialize};

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum CommandKey {
    B,
    D,
    F,
    U,
    DB,
    UB,
    DF,
    UF,
    nB,
    nD,
    nF,
    nU,
    nDB,
    nUB,
    nDF,
    nUF,
    Bs,
    Ds,
    Fs,
    Us,
    DBs,
    UBs,
    DFs,
    UFs,
    nBs,
    nDs,
    nFs,
    nUs,
    nDBs,
    nUBs,
    nDFs,
    nUFs,
    a,
    b,
    c,
    x,
    y,
    z,
    s,
    na,
    nb,
    nc,
    nx,
    ny,
    nz,
    ns,
}

/// Number of distinct command keys
pub const COMMAND_KEY_COUNT: usize = CommandKey::ns as usize + 1;

impl CommandKey {
    /// Every key, in declaration order
    pub const ALL: [CommandKey; COMMAND_KEY_COUNT] = [
        CommandKey::B,
        CommandKey::D,
        CommandKey::F,
        CommandKey::U,
        CommandKey::DB,
        CommandKey::UB,
        CommandKey::DF,
        CommandKey::UF,
        CommandKey::nB,
        CommandKey::nD,
        CommandKey::nF,
        CommandKey::nU,
        CommandKey::nDB,
        CommandKey::nUB,
        CommandKey::nDF,
        CommandKey::nUF,
        CommandKey::Bs,
        CommandKey::Ds,
        CommandKey::Fs,
        CommandKey::Us,
        CommandKey::DBs,
        CommandKey::UBs,
        CommandKey::DFs,
        CommandKey::UFs,
        CommandKey::nBs,
        CommandKey::nDs,
        CommandKey::nFs,
        CommandKey::nUs,
        CommandKey::nDBs,
        CommandKey::nUBs,
        CommandKey::nDFs,
        CommandKey::nUFs,
        CommandKey::a,
        CommandKey::b,
        CommandKey::c,
        CommandKey::x,
        CommandKey::y,
        CommandKey::z,
        CommandKey::s,
        CommandKey::na,
        CommandKey::nb,
        CommandKey::nc,
        CommandKey::nx,
        CommandKey::ny,
        CommandKey::nz,
        CommandKey::ns,
    ];

    /// Notation spelling (`~$DF`, `a`, ...)
    pub fn notation(self) -> &'static str {
        match self {
            CommandKey::B => "B",
            CommandKey::D => "D",
            CommandKey::F => "F",
            CommandKey::U => "U",
            CommandKey::DB => "DB",
            CommandKey::UB => "UB",
            CommandKey::DF => "DF",
            CommandKey::UF => "UF",
            CommandKey::nB => "~B",
            CommandKey::nD => "~D",
            CommandKey::nF => "~F",
            CommandKey::nU => "~U",
            CommandKey::nDB => "~DB",
            CommandKey::nUB => "~UB",
            CommandKey::nDF => "~DF",
            CommandKey::nUF => "~UF",
            CommandKey::Bs => "$B",
            CommandKey::Ds => "$D",
            CommandKey::Fs => "$F",
            CommandKey::Us => "$U",
            CommandKey::DBs => "$DB",
            CommandKey::UBs => "$UB",
            CommandKey::DFs => "$DF",
            CommandKey::UFs => "$UF",
            CommandKey::nBs => "~$B",
            CommandKey::nDs => "~$D",
            CommandKey::nFs => "~$F",
            CommandKey::nUs => "~$U",
            CommandKey::nDBs => "~$DB",
            CommandKey::nUBs => "~$UB",
            CommandKey::nDFs => "~$DF",
            CommandKey::nUFs => "~$UF",
            CommandKey::a => "a",
            CommandKey::b => "b",
            CommandKey::c => "c",
            CommandKey::x => "x",
            CommandKey::y => "y",
            CommandKey::z => "z",
            CommandKey::s => "s",
            CommandKey::na => "~a",
            CommandKey::nb => "~b",
            CommandKey::nc => "~c",
            CommandKey::nx => "~x",
            CommandKey::ny => "~y",
            CommandKey::nz => "~z",
            CommandKey::ns => "~s",
        }
    }

    /// Discriminant, usable as an array index
    pub fn index(self) -> usize {
        self as usize
    }

    /// Any button key, pressed or released
    pub fn is_button(self) -> bool {
        self >= CommandKey::a
    }

    /// A pressed button key (`a`..`s`)
    pub fn is_pressed_button(self) -> bool {
        (CommandKey::a..=CommandKey::s).contains(&self)
    }

    /// Released plain or strict direction (`~B`, `~$DF`, ...)
    pub fn is_released_direction(self) -> bool {
        (CommandKey::nB..=CommandKey::nUF).contains(&self)
            || (CommandKey::nBs..=CommandKey::nUFs).contains(&self)
    }

    /// Key with the `~` (released) interpretation toggled.
    ///
    /// Directions flip within their block of eight, buttons within their
    /// block of seven.
    pub fn toggled(self) -> CommandKey {
        use CommandKey::*;
        match self {
            B => nB,
            D => nD,
            F => nF,
            U => nU,
            DB => nDB,
            UB => nUB,
            DF => nDF,
            UF => nUF,
            nB => B,
            nD => D,
            nF => F,
            nU => U,
            nDB => DB,
            nUB => UB,
            nDF => DF,
            nUF => UF,
            Bs => nBs,
            Ds => nDs,
            Fs => nFs,
            Us => nUs,
            DBs => nDBs,
            UBs => nUBs,
            DFs => nDFs,
            UFs => nUFs,
            nBs => Bs,
            nDs => Ds,
            nFs => Fs,
            nUs => Us,
            nDBs => DBs,
            nUBs => UBs,
            nDFs => DFs,
            nUFs => UFs,
            a => na,
            b => nb,
            c => nc,
            x => nx,
            y => ny,
            z => nz,
            s => ns,
            na => a,
            nb => b,
            nc => c,
            nx => x,
            ny => y,
            nz => z,
            ns => s,
        }
    }

    /// Pick the plain, released, strict or strict-released form of a direction
    pub(crate) fn direction(base: Direction, released: bool, strict: bool) -> CommandKey {
        use CommandKey::*;
        let plain = match base {
            Direction::B => B,
            Direction::D => D,
            Direction::F => F,
            Direction::U => U,
            Direction::DB => DB,
            Direction::UB => UB,
            Direction::DF => DF,
            Direction::UF => UF,
        };
        let key = if strict { plain.strict() } else { plain };
        if released { key.toggled() } else { key }
    }

    fn strict(self) -> CommandKey {
        use CommandKey::*;
        match self {
            B => Bs,
            D => Ds,
            F => Fs,
            U => Us,
            DB => DBs,
            UB => UBs,
            DF => DFs,
            UF => UFs,
            other => other,
        }
    }

    /// Pick the pressed or released form of a button
    pub(crate) fn button(button: Button, released: bool) -> CommandKey {
        use CommandKey::*;
        let key = match button {
            Button::A => a,
            Button::B => b,
            Button::C => c,
            Button::X => x,
            Button::Y => y,
            Button::Z => z,
            Button::S => s,
        };
        if released { key.toggled() } else { key }
    }
}

/// The eight direction notations before strict/released modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    B,
    D,
    F,
    U,
    DB,
    UB,
    DF,
    UF,
}

/// The seven buttons tracked by a `CommandBuffer`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    A,
    B,
    C,
    X,
    Y,
    Z,
    S,
}

impl Button {
    pub const ALL: [Button; 7] = [
        Button::A,
        Button::B,
        Button::C,
        Button::X,
        Button::Y,
        Button::Z,
        Button::S,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub(crate) fn from_notation(ch: u8) -> Option<Button> {
        match ch {
            b'a' => Some(Button::A),
            b'b' => Some(Button::B),
            b'c' => Some(Button::C),
            b'x' => Some(Button::X),
            b'y' => Some(Button::Y),
            b'z' => Some(Button::Z),
            b's' => Some(Button::S),
            _ => None,
        }
    }
}
