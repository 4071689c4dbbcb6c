//! The error types the core can surface to a host.
use thiserror::Error;

use crate::opcode::Opcode;

/// An opcode was fetched that does not match any known instruction.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum OpcodeError {
    #[error("opcode {0:#06X} does not match any known instruction")]
    Illegal(Opcode),
}

/// The 16-level call stack was pushed to or popped from outside its bounds.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum StackError {
    #[error("stack is full, a CALL cannot nest any deeper")]
    Overflow,
    #[error("stack is empty, there is no subroutine to RET from")]
    Underflow,
}

/// An instruction addressed memory outside the VM's RAM.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum MemoryError {
    #[error("fetch at {pc:#06X} would read past the end of a {ram_size}-byte memory")]
    FetchOutOfBounds { pc: u16, ram_size: usize },
    #[error(
        "access at address {address:#06X} of length {len} exceeds the {ram_size}-byte memory"
    )]
    OutOfBounds {
        address: usize,
        len: usize,
        ram_size: usize,
    },
}

/// `load` was asked to place a program image that does not fit in RAM.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum LoadError {
    #[error(
        "program of {image_len} bytes at {base:#06X} does not fit in a {ram_size}-byte memory"
    )]
    ImageTooLarge {
        image_len: usize,
        base: u16,
        ram_size: usize,
    },
}

/// A host supplied a hex-keypad code outside `0x0..=0xF`.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum KeyError {
    #[error("key code {0:#X} is outside the 0x0..=0xF hex-keypad range")]
    BadKeyCode(u8),
}

/// The error a single [`crate::VirtualMachine::tick`] can fail with.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum Chip8Error {
    #[error(transparent)]
    Opcode(#[from] OpcodeError),
    #[error(transparent)]
    Stack(#[from] StackError),
    #[error(transparent)]
    Memory(#[from] MemoryError),
}
