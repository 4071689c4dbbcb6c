//! The pretty-print implementation for [`VirtualMachine`], kept in its own
//! file so `mod.rs` and `opcodes.rs` stay focused on state and execution.
use std::fmt;

use crate::definitions::cpu;

use super::VirtualMachine;

const HEX_PRINT_STEP: usize = 8;

fn print_row(f: &mut fmt::Formatter<'_>, label: &str, values: &[u16]) -> fmt::Result {
    writeln!(f, "\t{} :", label)?;
    for chunk in values.chunks(HEX_PRINT_STEP) {
        write!(f, "\t\t")?;
        for (i, value) in chunk.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{:#06X}", value)?;
        }
        writeln!(f)?;
    }
    Ok(())
}

impl fmt::Display for VirtualMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "VirtualMachine {{")?;
        writeln!(f, "\tProgram Counter :\n\t\t{:#06X}", self.program_counter)?;
        writeln!(f, "\tIndex Register :\n\t\t{:#06X}", self.index_register)?;
        writeln!(
            f,
            "\tTimers : delay={:#04X} sound={:#04X}",
            self.delay_timer, self.sound_timer
        )?;

        let registers: Vec<u16> = self.registers.iter().map(|&r| r as u16).collect();
        print_row(f, "Registers", &registers)?;

        let mut stack = [0u16; cpu::stack::SIZE];
        stack[..self.stack.len()].copy_from_slice(&self.stack);
        print_row(f, "Stack", &stack)?;

        write!(f, "}}")
    }
}
