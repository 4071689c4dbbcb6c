//! A CHIP-8 interpreter core.
//!
//! This crate implements the CHIP-8 virtual machine itself: memory and
//! register model, the fetch-decode-execute loop, the sprite-XOR display
//! engine, timer tick semantics and the hex-keypad input surface. It does
//! not open a window, play audio, or choose how a program image is found on
//! disk — those are an embedding host's job, driven through [`vm::VirtualMachine`].
pub mod definitions;
mod error;
pub mod devices;
pub mod opcode;
mod vm;

pub use error::*;
pub use vm::VirtualMachine;
