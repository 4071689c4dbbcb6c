//! The CHIP-8 virtual machine: memory, registers, and the
//! fetch-decode-execute loop built on top of [`crate::opcode`].
mod opcodes;
mod print;


use std::convert::TryFrom;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tinyvec::ArrayVec;

use crate::definitions::{cpu, display, memory};
use crate::devices::{KeyEventKind, Keyboard};
use crate::error::{Chip8Error, KeyError, LoadError, MemoryError, StackError};
use crate::opcode::{Opcode, Opcodes};

/// A single CHIP-8 virtual machine.
///
/// Construct one with [`VirtualMachine::new`] (or [`VirtualMachine::with_ram_size`]/
/// [`VirtualMachine::with_seed`] for more control), load a program with
/// [`VirtualMachine::load`], then drive it with [`VirtualMachine::tick`] and
/// [`VirtualMachine::tick_timers`] at whatever cadence the host chooses.
///
/// The VM is single-threaded and synchronous: every method here must be
/// called from one thread at a time, with no concurrent `tick`/`tick_timers`/
/// `key_event`/`load` calls racing each other.
pub struct VirtualMachine {
    /// `0x000-0x04F` holds the built-in font; a loaded program lives from
    /// `0x200` onward.
    memory: Vec<u8>,
    /// `V0..VF` data registers. `VF` doubles as the arithmetic carry / draw
    /// collision flag.
    registers: [u8; cpu::register::SIZE],
    /// The `I` index register, used to address memory for sprite reads,
    /// BCD writes, and register save/load.
    index_register: u16,
    /// The address of the next instruction to fetch.
    program_counter: u16,
    /// Return addresses pushed by `CALL`, popped by `RET`.
    stack: ArrayVec<[u16; cpu::stack::SIZE]>,
    /// Counts down at whatever rate the host calls `tick_timers`; drives
    /// timing-sensitive games.
    delay_timer: u8,
    /// Counts down the same way; non-zero means "a tone should be playing".
    sound_timer: u8,
    /// The 64x32 monochrome frame buffer. Row 0 is the top row.
    screen: [[bool; display::WIDTH]; display::HEIGHT],
    /// The current state of the 16-key hex keypad.
    keyboard: Keyboard,
    /// The source of randomness for `CXNN`. Boxed so construction can choose
    /// between a seeded, deterministic generator and an OS-entropy one
    /// behind a single field type.
    rng: Box<dyn RngCore>,
    /// Invoked exactly once per 1-to-0 transition of `sound_timer`.
    beep_callback: Box<dyn FnMut() + Send>,
}

impl VirtualMachine {
    /// Builds a VM with the default 4 KiB of RAM and an OS-entropy-seeded
    /// PRNG.
    pub fn new(beep_callback: impl FnMut() + Send + 'static) -> Self {
        Self::with_ram_size(memory::SIZE, beep_callback)
    }

    /// Builds a VM with `ram_size` bytes of RAM.
    ///
    /// # Panics
    /// Panics if `ram_size` is too small to even hold the font table
    /// (`80` bytes) — this is a programmer error at construction time, not
    /// a condition a loaded program can trigger.
    pub fn with_ram_size(ram_size: usize, beep_callback: impl FnMut() + Send + 'static) -> Self {
        Self::build(ram_size, None, beep_callback)
    }

    /// Builds a VM whose `CXNN` PRNG is seeded deterministically, for
    /// reproducible tests.
    pub fn with_seed(
        ram_size: usize,
        seed: u64,
        beep_callback: impl FnMut() + Send + 'static,
    ) -> Self {
        Self::build(ram_size, Some(seed), beep_callback)
    }

    fn build(ram_size: usize, seed: Option<u64>, beep_callback: impl FnMut() + Send + 'static) -> Self {
        assert!(
            ram_size >= display::fontset::FONTSET.len(),
            "ram_size {} is too small to hold the {}-byte font table",
            ram_size,
            display::fontset::FONTSET.len()
        );

        let rng: Box<dyn RngCore> = match seed {
            Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
            None => Box::new(StdRng::from_entropy()),
        };

        let mut vm = Self {
            memory: vec![0; ram_size],
            registers: [0; cpu::register::SIZE],
            index_register: 0,
            program_counter: cpu::PROGRAM_COUNTER,
            stack: ArrayVec::new(),
            delay_timer: 0,
            sound_timer: 0,
            screen: [[false; display::WIDTH]; display::HEIGHT],
            keyboard: Keyboard::new(),
            rng,
            beep_callback: Box::new(beep_callback),
        };
        vm.write_font();
        vm
    }

    fn write_font(&mut self) {
        let start = display::fontset::LOCATION as usize;
        let end = start + display::fontset::FONTSET.len();
        self.memory[start..end].copy_from_slice(&display::fontset::FONTSET);
    }

    /// Resets every field to its post-construction state, then rewrites the
    /// font table. Used by [`VirtualMachine::load`]; a fresh-but-unloaded VM
    /// and a just-loaded VM are otherwise indistinguishable apart from
    /// memory contents from `0x200` onward.
    fn reset(&mut self) {
        for byte in self.memory.iter_mut() {
            *byte = 0;
        }
        self.registers = [0; cpu::register::SIZE];
        self.index_register = 0;
        self.program_counter = cpu::PROGRAM_COUNTER;
        self.stack.clear();
        self.delay_timer = 0;
        self.sound_timer = 0;
        self.screen = [[false; display::WIDTH]; display::HEIGHT];
        self.keyboard.reset();
        self.write_font();
    }

    /// Resets the VM and copies `image` into memory, then runs from `address`.
    ///
    /// The image is always copied to the fixed base address `0x200`
    /// regardless of `address` — `address` only sets the initial program
    /// counter. This mirrors the original implementation this interpreter
    /// was modeled on, where `load`'s destination and its `PC` argument are
    /// independent: passing a non-default `address` is how a program can
    /// begin execution somewhere other than its own start, not how it is
    /// relocated in memory.
    pub fn load(&mut self, image: &[u8], address: u16) -> Result<(), LoadError> {
        let base = cpu::PROGRAM_COUNTER;
        let end = base as usize + image.len();
        if end > self.memory.len() {
            return Err(LoadError::ImageTooLarge {
                image_len: image.len(),
                base,
                ram_size: self.memory.len(),
            });
        }

        self.reset();
        self.memory[base as usize..end].copy_from_slice(image);
        self.program_counter = address;
        log::info!(
            "loaded {} byte program, running from {:#06X}",
            image.len(),
            address
        );
        Ok(())
    }

    /// Equivalent to `load(image, 0x200)`.
    pub fn load_default(&mut self, image: &[u8]) -> Result<(), LoadError> {
        self.load(image, cpu::PROGRAM_COUNTER)
    }

    fn fetch(&mut self) -> Result<Opcode, MemoryError> {
        let pc = self.program_counter as usize;
        if pc + 1 >= self.memory.len() {
            let err = MemoryError::FetchOutOfBounds {
                pc: self.program_counter,
                ram_size: self.memory.len(),
            };
            log::warn!("{}", err);
            return Err(err);
        }
        let opcode = u16::from_be_bytes([self.memory[pc], self.memory[pc + 1]]);
        self.program_counter = self.program_counter.wrapping_add(2);
        Ok(opcode)
    }

    /// Executes exactly one instruction: fetch, decode, execute.
    ///
    /// Before a program is loaded, memory is all zeros, so `tick` repeatedly
    /// executes the no-op `0000` and never advances past `0x200`.
    pub fn tick(&mut self) -> Result<(), Chip8Error> {
        let raw = self.fetch()?;
        let opcode = Opcodes::try_from(raw)?;
        self.execute(opcode)
    }

    /// Decrements the delay and sound timers by one each, if non-zero, and
    /// invokes the beep callback exactly on the sound timer's 1-to-0
    /// transition.
    pub fn tick_timers(&mut self) {
        if self.delay_timer > 0 {
            self.delay_timer -= 1;
        }
        if self.sound_timer > 0 {
            if self.sound_timer == 1 {
                (self.beep_callback)();
            }
            self.sound_timer -= 1;
        }
    }

    /// Records a key press or release edge for the hex keypad.
    pub fn key_event(&mut self, kind: KeyEventKind, code: u8) -> Result<(), KeyError> {
        self.keyboard.set_key(kind, code)
    }

    /// A read-only view of the 64x32 frame buffer. Row 0 is the top row,
    /// column 0 is the leftmost column.
    pub fn screen_data(&self) -> &[[bool; display::WIDTH]; display::HEIGHT] {
        &self.screen
    }

    /// The current delay timer value.
    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    /// The current sound timer value.
    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    /// The address of the next instruction to fetch.
    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    /// A copy of the current data registers `V0..VF`.
    pub fn registers(&self) -> [u8; cpu::register::SIZE] {
        self.registers
    }

    /// The current value of the `I` index register.
    pub fn index_register(&self) -> u16 {
        self.index_register
    }

    /// The number of entries currently on the call stack.
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    fn push_stack(&mut self, address: u16) -> Result<(), StackError> {
        if self.stack.len() == self.stack.capacity() {
            log::warn!("{}", StackError::Overflow);
            return Err(StackError::Overflow);
        }
        self.stack.push(address);
        Ok(())
    }

    fn pop_stack(&mut self) -> Result<u16, StackError> {
        self.stack.pop().ok_or_else(|| {
            log::warn!("{}", StackError::Underflow);
            StackError::Underflow
        })
    }

    fn check_range(&self, start: usize, len: usize) -> Result<(), MemoryError> {
        if start.saturating_add(len) > self.memory.len() {
            let err = MemoryError::OutOfBounds {
                address: start,
                len,
                ram_size: self.memory.len(),
            };
            log::warn!("{}", err);
            Err(err)
        } else {
            Ok(())
        }
    }
}
