//! Named command sets sharing one input buffer

use std::collections::BTreeMap;

use rollcade_shared::InputBits;
use serde::{Deserialize, Serialize};

use super::buffer::CommandBuffer;
use super::key::{Button, CommandKey};
use super::matcher::{Command, StepContext};

/// Default frames allowed to complete a command
pub const DEFAULT_COMMAND_TIME: i32 = 15;

/// Default frames a completed command stays active
pub const DEFAULT_BUFFER_TIME: i32 = 1;

/// Button substitution applied to notations as they are added.
///
/// Released buttons follow their pressed counterpart, so swapping `a` and
/// `x` also swaps `~a` and `~x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandKeyRemap {
    buttons: [Button; 7],
}

impl Default for CommandKeyRemap {
    fn default() -> Self {
        Self {
            buttons: Button::ALL,
        }
    }
}

impl CommandKeyRemap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `from` read as `to` in every notation added afterwards
    pub fn set(&mut self, from: Button, to: Button) -> &mut Self {
        self.buttons[from.index()] = to;
        self
    }

    pub fn swap(&mut self, a: Button, b: Button) -> &mut Self {
        self.buttons.swap(a.index(), b.index());
        self
    }

    pub fn apply(&self, key: CommandKey) -> CommandKey {
        if !key.is_button() {
            return key;
        }
        let released = !key.is_pressed_button();
        let pressed = if released { key.toggled() } else { key };
        let idx = pressed.index() - CommandKey::a.index();
        CommandKey::button(self.buttons[idx], released)
    }

    fn apply_command(&self, cmd: &mut Command) {
        for set in cmd.hold.iter_mut() {
            for key in set.iter_mut() {
                *key = self.apply(*key);
            }
        }
        for elem in cmd.elements.iter_mut() {
            for key in elem.keys.iter_mut() {
                *key = self.apply(*key);
            }
        }
    }
}

/// One character's commands and the buffer they read.
///
/// A name may carry several alternative notations; the name is active when
/// any of them is. Names are kept in a `BTreeMap` so the serialized form,
/// and therefore the snapshot checksum, does not depend on insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandList {
    pub buffer: CommandBuffer,
    pub names: BTreeMap<String, Vec<usize>>,
    pub commands: Vec<Command>,
    pub remap: CommandKeyRemap,
    pub default_time: i32,
    pub default_buffer_time: i32,
}

impl Default for CommandList {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND_TIME, DEFAULT_BUFFER_TIME)
    }
}

impl CommandList {
    pub fn new(default_time: i32, default_buffer_time: i32) -> Self {
        Self {
            buffer: CommandBuffer::new(),
            names: BTreeMap::new(),
            commands: Vec::new(),
            remap: CommandKeyRemap::default(),
            default_time,
            default_buffer_time,
        }
    }

    pub fn with_remap(mut self, remap: CommandKeyRemap) -> Self {
        self.remap = remap;
        self
    }

    /// Parse and register `notation` under `name` with the list defaults.
    pub fn add(&mut self, name: &str, notation: &str) -> &mut Command {
        let time = self.default_time;
        let buffer_time = self.default_buffer_time;
        self.add_with(name, notation, time, buffer_time)
    }

    /// Parse and register `notation` with explicit timing.
    pub fn add_with(&mut self, name: &str, notation: &str, time: i32, buffer_time: i32) -> &mut Command {
        let mut cmd = Command::parse(notation);
        cmd.time = time;
        cmd.buffer_time = buffer_time.max(1);
        self.remap.apply_command(&mut cmd);

        let idx = self.commands.len();
        self.names.entry(name.to_string()).or_default().push(idx);
        self.commands.push(cmd);
        &mut self.commands[idx]
    }

    /// Feed one frame of input bits into the shared buffer
    pub fn input(&mut self, bits: InputBits, facing: i32) {
        self.buffer.input_bits(bits, facing);
    }

    /// Step every command against the buffer
    pub fn step(&mut self, ctx: &mut StepContext<'_>) {
        let buffer = &self.buffer;
        for cmd in self.commands.iter_mut() {
            cmd.step(buffer, ctx);
        }
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.names.get(name).is_some_and(|indices| {
            indices
                .iter()
                .any(|&i| self.commands.get(i).is_some_and(Command::is_active))
        })
    }

    /// Names currently active, in name order
    pub fn active(&self) -> impl Iterator<Item = &str> {
        self.names
            .keys()
            .filter(|name| self.is_active(name))
            .map(String::as_str)
    }

    /// Reset every command's progress. The input buffer is kept.
    pub fn clear(&mut self) {
        for cmd in self.commands.iter_mut() {
            cmd.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
